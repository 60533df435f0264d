//! CLI module for the schema-compose binary

#[cfg(feature = "cli")]
pub mod commands;
#[cfg(feature = "cli")]
pub mod error;
#[cfg(feature = "cli")]
pub mod output;

#[cfg(feature = "cli")]
pub use error::CliError;

#[cfg(feature = "cli")]
use crate::{
    compose::ConflictPolicy, config::Settings, manifest::ManifestLoader, registry::Catalog,
};
#[cfg(feature = "cli")]
use std::path::Path;

/// Settings and catalog shared by every command
#[cfg(feature = "cli")]
pub struct Context {
    pub settings: Settings,
    pub catalog: Catalog,
}

#[cfg(feature = "cli")]
impl Context {
    /// Read the config file (defaults when absent) and load the manifest.
    ///
    /// `manifest` and `policy` override the configured values.
    pub fn load(
        config: &Path,
        manifest: Option<&Path>,
        policy: Option<ConflictPolicy>,
    ) -> Result<Self, CliError> {
        let mut settings = Settings::load_or_default(config)?;
        if let Some(policy) = policy {
            settings.composition.conflict_policy = policy;
        }

        let loader = ManifestLoader::new(&settings.mapping);
        let catalog = match manifest {
            Some(path) => loader.load(path)?,
            None => loader.load_default()?,
        };
        Ok(Self { settings, catalog })
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.settings.composition.conflict_policy
    }
}
