//! Record type model for the SDK

use super::attribute::Attribute;
use super::member::{Member, members_of};
use super::relation::Relation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Concrete, independently persisted entity definition.
///
/// A record type maps 1:1 to a table. It incorporates field-set units by
/// name (`uses`) and may declare local attributes and relations, which take
/// precedence over anything incorporated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordType {
    pub name: String,
    /// Explicit table name; defaults to the snake_case record name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Incorporated field-set units, in declaration order
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            uses: Vec::new(),
            attributes: Vec::new(),
            relations: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn uses(mut self, unit: impl Into<String>) -> Self {
        self.uses.push(unit.into());
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

    /// Table this record type maps to
    pub fn table_name(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| default_table_name(&self.name))
    }

    /// Locally declared members (attributes, then relations)
    pub fn local_members(&self) -> Vec<Member> {
        members_of(&self.attributes, &self.relations)
    }

    pub fn id(&self) -> Uuid {
        Self::generate_id(&self.name)
    }

    /// Generate a deterministic UUID v5 for a record type from its name
    pub fn generate_id(name: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("record:{}", name).as_bytes())
    }
}

/// Derive a table name from a record type name (`BlogPost` -> `blog_post`)
pub fn default_table_name(name: &str) -> String {
    let mut table = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                table.push('_');
            }
            table.extend(c.to_lowercase());
        } else {
            table.push(c);
        }
    }
    table
}
