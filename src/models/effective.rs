//! Effective schema: the composed result for one record type

use super::attribute::Attribute;
use super::relation::Relation;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Where a member of an effective schema was declared
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "from", content = "unit", rename_all = "snake_case")]
pub enum Origin {
    /// Declared on the record type itself
    Local,
    /// Incorporated from the named field-set unit
    Unit(String),
}

/// Final merged attribute/relation set of a record type.
///
/// This is the descriptor handed to schema synchronizers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectiveSchema {
    pub id: Uuid,
    pub record_type: String,
    pub table: String,
    pub attributes: Vec<Attribute>,
    pub relations: Vec<Relation>,
    /// Declaring origin per member name
    #[serde(default)]
    pub provenance: BTreeMap<String, Origin>,
}

impl EffectiveSchema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn primary_key(&self) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.primary_key).collect()
    }

    pub fn origin(&self, member: &str) -> Option<&Origin> {
        self.provenance.get(member)
    }

    /// SHA-256 over the structural content (table, attributes, relations).
    ///
    /// Provenance is excluded: moving a declaration from a unit to the record
    /// type does not change storage.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.table.as_bytes());
        hasher.update([0u8]);
        for attr in &self.attributes {
            hasher.update(serde_json::to_string(attr).unwrap_or_default().as_bytes());
            hasher.update([0u8]);
        }
        for rel in &self.relations {
            hasher.update(serde_json::to_string(rel).unwrap_or_default().as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Combined fingerprint for a set of effective schemas, order-sensitive
pub fn catalog_fingerprint(schemas: &[EffectiveSchema]) -> String {
    let mut hasher = Sha256::new();
    for schema in schemas {
        hasher.update(schema.fingerprint().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
