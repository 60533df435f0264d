//! Script synchronizer
//!
//! Offline synchronizer: the pending changes are the desired-state DDL of
//! the composed schemas, and applying writes them to a script file. The
//! script header records the dialect and the catalog fingerprint, so an
//! unchanged catalog rendered for the same dialect leaves an existing
//! script untouched.

use super::{SchemaSynchronizer, SyncError, SyncReport};
use crate::export::SQLExporter;
use crate::models::{EffectiveSchema, catalog_fingerprint};
use std::path::{Path, PathBuf};
use tracing::info;

const DIALECT_MARKER: &str = "-- dialect: ";
const FINGERPRINT_MARKER: &str = "-- fingerprint: ";

/// Synchronizer writing a DDL script
#[derive(Debug, Clone)]
pub struct ScriptSynchronizer {
    path: PathBuf,
    dialect: String,
}

impl ScriptSynchronizer {
    pub fn new(path: impl Into<PathBuf>, dialect: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            dialect: dialect.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fingerprint recorded in an existing script, if any
    pub fn recorded_fingerprint(&self) -> Option<String> {
        self.recorded_header(FINGERPRINT_MARKER)
    }

    /// Dialect recorded in an existing script, if any
    pub fn recorded_dialect(&self) -> Option<String> {
        self.recorded_header(DIALECT_MARKER)
    }

    fn recorded_header(&self, marker: &str) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        content
            .lines()
            .take_while(|line| line.starts_with("--"))
            .find_map(|line| line.strip_prefix(marker))
            .map(|value| value.trim().to_string())
    }

    fn is_up_to_date(&self, fingerprint: &str) -> bool {
        self.recorded_dialect().as_deref() == Some(self.dialect.as_str())
            && self.recorded_fingerprint().as_deref() == Some(fingerprint)
    }

    fn render(&self, statements: &[String], fingerprint: &str) -> String {
        let mut script = format!(
            "-- schema-compose synchronization script\n{}{}\n{}{}\n\n",
            DIALECT_MARKER, self.dialect, FINGERPRINT_MARKER, fingerprint
        );
        script.push_str(&statements.join("\n\n"));
        script.push('\n');
        script
    }
}

impl SchemaSynchronizer for ScriptSynchronizer {
    fn name(&self) -> &str {
        "script"
    }

    fn pending_changes(&self, schemas: &[EffectiveSchema]) -> Result<Vec<String>, SyncError> {
        Ok(SQLExporter::statements(schemas, Some(&self.dialect))?)
    }

    fn apply(&self, schemas: &[EffectiveSchema]) -> Result<SyncReport, SyncError> {
        let statements = self.pending_changes(schemas)?;
        let fingerprint = catalog_fingerprint(schemas);

        if self.is_up_to_date(&fingerprint) {
            info!("{} is up to date", self.path.display());
            return Ok(SyncReport {
                statements,
                applied: false,
                output: self.path.display().to_string(),
                fingerprint,
            });
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| SyncError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, self.render(&statements, &fingerprint)).map_err(|source| {
            SyncError::Io {
                path: self.path.clone(),
                source,
            }
        })?;
        info!(
            "Wrote {} statement(s) to {}",
            statements.len(),
            self.path.display()
        );

        Ok(SyncReport {
            statements,
            applied: true,
            output: self.path.display().to_string(),
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Composer;
    use crate::models::{Attribute, RecordType, StorageType};
    use crate::registry::Catalog;
    use tempfile::TempDir;

    fn schemas(label_length: u32) -> Vec<EffectiveSchema> {
        let mut catalog = Catalog::new();
        catalog
            .register(
                RecordType::new("Tag")
                    .with_attribute(Attribute::id("id"))
                    .with_attribute(
                        Attribute::new("label", StorageType::String).with_length(label_length),
                    ),
            )
            .unwrap();
        Composer::new(&catalog).compose_all().unwrap()
    }

    #[test]
    fn test_apply_writes_script_once() {
        let temp = TempDir::new().unwrap();
        let sync = ScriptSynchronizer::new(temp.path().join("out/sync.sql"), "postgres");

        let report = sync.apply(&schemas(40)).unwrap();
        assert!(report.applied);
        assert_eq!(sync.recorded_fingerprint(), Some(report.fingerprint.clone()));
        let content = std::fs::read_to_string(sync.path()).unwrap();
        assert!(content.contains("\"label\" VARCHAR(40) NOT NULL"));

        let again = sync.apply(&schemas(40)).unwrap();
        assert!(!again.applied);

        let changed = sync.apply(&schemas(80)).unwrap();
        assert!(changed.applied);
        assert_ne!(changed.fingerprint, report.fingerprint);
    }

    #[test]
    fn test_dialect_change_rewrites_script() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sync.sql");

        let first = ScriptSynchronizer::new(&path, "postgres")
            .apply(&schemas(40))
            .unwrap();
        assert!(first.applied);

        let mysql = ScriptSynchronizer::new(&path, "mysql");
        let second = mysql.apply(&schemas(40)).unwrap();
        assert!(second.applied);
        assert_eq!(second.fingerprint, first.fingerprint);
        assert_eq!(mysql.recorded_dialect(), Some("mysql".to_string()));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("-- dialect: mysql"));
        assert!(content.contains("`label` VARCHAR(40) NOT NULL"));
        assert!(!content.contains("GENERATED BY DEFAULT AS IDENTITY"));

        assert!(!mysql.apply(&schemas(40)).unwrap().applied);
    }

    #[test]
    fn test_pending_changes_do_not_write() {
        let temp = TempDir::new().unwrap();
        let sync = ScriptSynchronizer::new(temp.path().join("sync.sql"), "standard");
        let statements = sync.pending_changes(&schemas(40)).unwrap();
        assert_eq!(statements.len(), 1);
        assert!(!sync.path().exists());
    }
}
