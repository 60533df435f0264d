//! Schema synchronizer adapters
//!
//! Composed record types are handed to a schema synchronizer, which either
//! reports the pending storage changes (dry run) or applies them. Two
//! synchronizers are provided:
//!
//! - [`CommandSynchronizer`]: runs an external synchronizer command, feeding
//!   it the JSON descriptor document on stdin
//! - [`ScriptSynchronizer`]: renders desired-state DDL and writes it to a
//!   script file

pub mod command;
pub mod script;

pub use command::CommandSynchronizer;
pub use script::ScriptSynchronizer;

use crate::compose::{ComposeError, Composer, ConflictPolicy};
use crate::config::SyncConfig;
use crate::export::ExportError;
use crate::models::EffectiveSchema;
use crate::registry::Catalog;
use crate::validation::{RelationshipValidationError, RelationshipValidator};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Script written when `[sync] script` is unset
pub const DEFAULT_SCRIPT: &str = "schema-sync.sql";

/// Synchronization errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Relationship(#[from] RelationshipValidationError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Failed to run synchronizer '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Synchronizer exited with {}: {stderr}", .status.map_or_else(|| "a signal".to_string(), |c| format!("status {}", c)))]
    CommandFailed { status: Option<i32>, stderr: String },
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of an apply invocation
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SyncReport {
    /// Statements reported or written by the synchronizer
    pub statements: Vec<String>,
    /// False when there was nothing to apply
    pub applied: bool,
    /// Raw synchronizer output, or the script path
    pub output: String,
    /// Catalog fingerprint of the synchronized schemas
    pub fingerprint: String,
}

/// A persistence-layer schema synchronizer
pub trait SchemaSynchronizer {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Dry run: the statements that would bring storage in line with
    /// `schemas`
    fn pending_changes(&self, schemas: &[EffectiveSchema]) -> Result<Vec<String>, SyncError>;

    /// Commit the changes
    fn apply(&self, schemas: &[EffectiveSchema]) -> Result<SyncReport, SyncError>;
}

/// Compose every record type of a catalog and check that all relation
/// targets resolve.
///
/// This is the discovery step a synchronizer runs before diffing: it fails
/// on the first composition error, or with
/// [`RelationshipValidationError::UnresolvedRelationship`] when a relation
/// names a record type that is not defined.
pub fn prepare(
    catalog: &Catalog,
    policy: ConflictPolicy,
) -> Result<Vec<EffectiveSchema>, SyncError> {
    let schemas = Composer::new(catalog).with_policy(policy).compose_all()?;
    RelationshipValidator::new().ensure_resolved(&schemas)?;
    info!("Prepared {} record type(s) for synchronization", schemas.len());
    Ok(schemas)
}

/// Build the synchronizer described by `[sync]`: the external command
/// when one is configured, a script file otherwise
pub fn from_config(config: &SyncConfig) -> Box<dyn SchemaSynchronizer> {
    match &config.command {
        Some(command) => Box::new(
            CommandSynchronizer::new(command.clone())
                .with_args(config.args.clone())
                .with_dump_args(config.dump_args.clone())
                .with_apply_args(config.apply_args.clone())
                .with_dialect(config.dialect.clone()),
        ),
        None => Box::new(ScriptSynchronizer::new(
            config
                .script
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT)),
            config.dialect.clone(),
        )),
    }
}
