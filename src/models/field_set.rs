//! Field-set unit model

use super::attribute::Attribute;
use super::member::{Member, members_of};
use super::relation::Relation;
use serde::{Deserialize, Serialize};

/// Reusable, named bundle of attribute and relation definitions.
///
/// A field-set unit has no table of its own. Record types incorporate it by
/// name and receive copies of its members during composition. A unit may
/// include other units; included members come first and the unit's own
/// declarations override them.
///
/// # Example
///
/// ```rust
/// use schema_compose::models::{Attribute, FieldSet, StorageType};
///
/// let unit = FieldSet::new(
///     "UserTrait",
///     vec![
///         Attribute::id("id"),
///         Attribute::new("email", StorageType::String),
///     ],
///     vec![],
/// );
/// assert_eq!(unit.members().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSet {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Other units flattened into this one, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl FieldSet {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>, relations: Vec<Relation>) -> Self {
        Self {
            name: name.into(),
            attributes,
            relations,
            includes: Vec::new(),
            description: String::new(),
        }
    }

    pub fn including(mut self, unit: impl Into<String>) -> Self {
        self.includes.push(unit.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Own members (attributes, then relations), excluding includes
    pub fn members(&self) -> Vec<Member> {
        members_of(&self.attributes, &self.relations)
    }
}
