//! Export functionality
//!
//! Provides exporters for effective schemas:
//! - SQL (desired-state DDL)
//! - JSON descriptor document (the schema synchronizer wire format)

pub mod json;
pub mod sql;

use crate::validation::RelationshipValidationError;

/// Result of an export operation
#[derive(Debug)]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error(transparent)]
    Relationship(#[from] RelationshipValidationError),
    #[error("Relation '{relation}' of record type '{record}' cannot be exported: {reason}")]
    UnsupportedReference {
        record: String,
        relation: String,
        reason: String,
    },
    #[error("Column '{column}' is declared twice on table '{table}'")]
    ColumnCollision { table: String, column: String },
    #[error(
        "Join table '{table}' of relation '{relation}' on record type '{record}' clashes with another table"
    )]
    TableCollision {
        table: String,
        record: String,
        relation: String,
    },
}

// Re-export for convenience
pub use json::{JsonExporter, SchemaDocument};
pub use sql::SQLExporter;
