//! JSON exporter for effective schema descriptors.
//!
//! The document written here is what external schema synchronizers read.

use crate::export::{ExportError, ExportResult};
use crate::models::{EffectiveSchema, catalog_fingerprint};
use serde::{Deserialize, Serialize};

/// Descriptor document for a whole catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDocument {
    /// Combined fingerprint of all record types
    pub fingerprint: String,
    pub record_types: Vec<EffectiveSchema>,
}

impl SchemaDocument {
    pub fn new(schemas: &[EffectiveSchema]) -> Self {
        Self {
            fingerprint: catalog_fingerprint(schemas),
            record_types: schemas.to_vec(),
        }
    }
}

/// Exporter for JSON descriptor format
pub struct JsonExporter;

impl JsonExporter {
    pub fn export(&self, schemas: &[EffectiveSchema]) -> Result<ExportResult, ExportError> {
        let document = SchemaDocument::new(schemas);
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?;
        Ok(ExportResult {
            content,
            format: "json".to_string(),
        })
    }

    /// Export a single schema, without the document envelope
    pub fn export_schema(&self, schema: &EffectiveSchema) -> Result<ExportResult, ExportError> {
        let content = serde_json::to_string_pretty(schema)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?;
        Ok(ExportResult {
            content,
            format: "json".to_string(),
        })
    }
}
