//! Member model: the attribute/relation namespace of a record type

use super::attribute::Attribute;
use super::relation::Relation;
use serde::{Deserialize, Serialize};

/// A named member of a field-set unit or record type.
///
/// Attributes and relations share one namespace, so a later declaration of
/// either kind replaces an earlier one of the same name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Attribute(Attribute),
    Relation(Relation),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Attribute(attr) => &attr.name,
            Member::Relation(rel) => &rel.name,
        }
    }

    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Member::Attribute(attr) => Some(attr),
            Member::Relation(_) => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Member::Relation(rel) => Some(rel),
            Member::Attribute(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Member::Attribute(_) => "attribute",
            Member::Relation(_) => "relation",
        }
    }
}

impl From<Attribute> for Member {
    fn from(attr: Attribute) -> Self {
        Member::Attribute(attr)
    }
}

impl From<Relation> for Member {
    fn from(rel: Relation) -> Self {
        Member::Relation(rel)
    }
}

/// Collect attributes followed by relations as members
pub(crate) fn members_of(attributes: &[Attribute], relations: &[Relation]) -> Vec<Member> {
    attributes
        .iter()
        .cloned()
        .map(Member::from)
        .chain(relations.iter().cloned().map(Member::from))
        .collect()
}
