//! Record type registry

use super::{RegistryError, check_declaration};
use crate::models::RecordType;
use crate::validation::input::validate_identifier;
use std::collections::HashMap;
use tracing::info;

/// Explicit list of every record type, in registration order
#[derive(Debug, Clone, Default)]
pub struct RecordTypeRegistry {
    records: Vec<RecordType>,
    index: HashMap<String, usize>,
    tables: HashMap<String, String>,
}

impl RecordTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type.
    ///
    /// Names and tables must be unique. Referenced units are not checked
    /// here; an unknown unit fails composition of this record only.
    pub fn register(&mut self, record: RecordType) -> Result<(), RegistryError> {
        validate_identifier(&record.name, "record type name")?;
        if self.index.contains_key(&record.name) {
            return Err(RegistryError::DuplicateDefinition {
                kind: "Record type",
                name: record.name,
            });
        }

        let table = record.table_name();
        validate_identifier(&table, "table name")?;
        if let Some(existing) = self.tables.get(&table) {
            return Err(RegistryError::DuplicateTable {
                table,
                record: record.name,
                existing: existing.clone(),
            });
        }

        check_declaration(
            &format!("Record type '{}'", record.name),
            &record.local_members(),
            &record.uses,
            &record.description,
        )?;

        info!(
            "Registered record type {} -> table {} (uses: [{}])",
            record.name,
            table,
            record.uses.join(", ")
        );
        self.tables.insert(table, record.name.clone());
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&RecordType, RegistryError> {
        self.index
            .get(name)
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| RegistryError::UnknownRecordType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Enumerate all record types so a synchronizer can iterate them
    pub fn list_record_types(&self) -> Vec<&RecordType> {
        self.records.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
