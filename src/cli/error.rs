//! CLI error type

use crate::compose::ComposeError;
use crate::config::ConfigError;
use crate::export::ExportError;
use crate::manifest::ManifestError;
use crate::sync::SyncError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}
