//! Registries of field-set units and record types
//!
//! Everything is registered explicitly, either in code or through a
//! manifest (see [`crate::manifest`]). Registration is additive and happens
//! once, before composition.

pub mod field_sets;
pub mod record_types;

pub use field_sets::FieldSetRegistry;
pub use record_types::RecordTypeRegistry;

use crate::models::{FieldSet, Member, RecordType};
use crate::validation::input::{ValidationError, validate_description, validate_identifier};
use std::collections::HashSet;
use tracing::debug;

/// Error during registration or lookup
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind} '{name}' is already defined")]
    DuplicateDefinition { kind: &'static str, name: String },
    #[error("Table '{table}' of record type '{record}' is already mapped by '{existing}'")]
    DuplicateTable {
        table: String,
        record: String,
        existing: String,
    },
    #[error("{owner} declares member '{member}' more than once")]
    DuplicateMember { owner: String, member: String },
    #[error("Unknown field-set unit: {0}")]
    UnknownUnit(String),
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),
    #[error("Invalid name: {0}")]
    InvalidName(#[from] ValidationError),
}

/// Catalog of every field-set unit and record type known to the process
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub field_sets: FieldSetRegistry,
    pub record_types: RecordTypeRegistry,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field-set unit
    pub fn define(&mut self, unit: FieldSet) -> Result<(), RegistryError> {
        self.field_sets.define(unit)
    }

    /// Register a record type
    pub fn register(&mut self, record: RecordType) -> Result<(), RegistryError> {
        self.record_types.register(record)
    }

    /// Look up a field-set unit by name
    pub fn resolve(&self, unit: &str) -> Result<&FieldSet, RegistryError> {
        self.field_sets.resolve(unit)
    }

    pub fn record_type(&self, name: &str) -> Result<&RecordType, RegistryError> {
        self.record_types.get(name)
    }

    /// Enumerate every record type in registration order
    pub fn list_record_types(&self) -> Vec<&RecordType> {
        self.record_types.list_record_types()
    }
}

/// Validate the names and member uniqueness of a declaration
pub(crate) fn check_declaration(
    owner: &str,
    members: &[Member],
    references: &[String],
    description: &str,
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for member in members {
        validate_identifier(member.name(), "member name")?;
        if let Member::Relation(rel) = member {
            validate_identifier(&rel.target, "relation target")?;
        }
        if !seen.insert(member.name()) {
            return Err(RegistryError::DuplicateMember {
                owner: owner.to_string(),
                member: member.name().to_string(),
            });
        }
    }
    for reference in references {
        validate_identifier(reference, "unit name")?;
    }
    validate_description(description)?;
    debug!("{} declares {} member(s)", owner, members.len());
    Ok(())
}
