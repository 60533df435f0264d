//! Configuration types
//!
//! Settings are read once from a TOML file (`schema-compose.toml`):
//!
//! ```toml
//! [mapping]
//! dir = "config/schema"
//! manifest = "schema.yaml"
//! prefix = "App\\Entity"
//! alias = "App"
//!
//! [composition]
//! conflict_policy = "fail_fast"
//!
//! [sync]
//! command = "bin/console"
//! args = ["doctrine:schema:update"]
//! dialect = "postgres"
//! ```

use crate::compose::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "schema-compose.toml";

/// SQL dialects understood by the exporters and synchronizers
pub const SUPPORTED_DIALECTS: &[&str] = &[
    "standard",
    "postgres",
    "postgresql",
    "mysql",
    "sqlserver",
    "mssql",
];

/// Case-insensitive lookup of a supported dialect name
pub fn normalize_dialect(dialect: &str) -> Option<&'static str> {
    let lowered = dialect.trim().to_lowercase();
    SUPPORTED_DIALECTS.iter().copied().find(|d| *d == lowered)
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub mapping: MappingConfig,
    pub composition: CompositionConfig,
    pub sync: SyncConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file.
    ///
    /// Relative paths in the file resolve against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            settings.resolve_paths(base);
        }
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if let Some(command) = &self.sync.command
            && command.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "sync.command".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        match normalize_dialect(&self.sync.dialect) {
            Some(dialect) => self.sync.dialect = dialect.to_string(),
            None => {
                return Err(ConfigError::InvalidValue {
                    key: "sync.dialect".to_string(),
                    message: format!("unsupported dialect '{}'", self.sync.dialect),
                });
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.mapping.dir.is_relative() {
            self.mapping.dir = base.join(&self.mapping.dir);
        }
        if let Some(script) = &self.sync.script
            && script.is_relative()
        {
            self.sync.script = Some(base.join(script));
        }
    }

    pub fn with_mapping(mut self, mapping: MappingConfig) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.composition.conflict_policy = policy;
        self
    }

    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }
}

/// Where definitions live and how their names are qualified
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MappingConfig {
    /// Directory holding the manifest
    pub dir: PathBuf,
    /// Manifest file name, relative to `dir`
    pub manifest: PathBuf,
    /// Namespace prefix, e.g. `App\Entity`
    pub prefix: Option<String>,
    /// Short alias, e.g. `App` for `App:User`
    pub alias: Option<String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            manifest: PathBuf::from("schema.yaml"),
            prefix: None,
            alias: None,
        }
    }
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = manifest.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Full path of the root manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(&self.manifest)
    }

    /// Reduce an aliased (`App:User`) or prefixed (`App\Entity\User`) name
    /// to its short form. Other names are returned unchanged.
    pub fn normalize(&self, name: &str) -> String {
        let name = name.trim().trim_start_matches('\\');
        if let Some(alias) = &self.alias
            && let Some(rest) = name.strip_prefix(alias.as_str())
            && let Some(short) = rest.strip_prefix(':')
        {
            return short.to_string();
        }
        if let Some(prefix) = &self.prefix {
            let prefix = prefix.trim_matches('\\');
            if let Some(rest) = name.strip_prefix(prefix)
                && let Some(short) = rest.strip_prefix('\\')
            {
                return short.to_string();
            }
        }
        name.to_string()
    }

    /// Fully qualified name of a short name, using the prefix when set
    pub fn qualify(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}\\{}", prefix.trim_matches('\\'), name),
            None => name.to_string(),
        }
    }
}

/// Composer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompositionConfig {
    pub conflict_policy: ConflictPolicy,
}

/// External schema synchronizer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Synchronizer executable; unset means script mode
    pub command: Option<String>,
    /// Arguments passed before the mode arguments
    pub args: Vec<String>,
    /// Mode arguments for a dry run
    pub dump_args: Vec<String>,
    /// Mode arguments for applying changes
    pub apply_args: Vec<String>,
    /// Output file for script mode
    pub script: Option<PathBuf>,
    /// SQL dialect of generated or reported statements
    pub dialect: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            dump_args: vec!["--dump-sql".to_string()],
            apply_args: vec!["--force".to_string()],
            script: None,
            dialect: "standard".to_string(),
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dump_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dump_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_apply_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = Some(path.into());
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.sync.dump_args, vec!["--dump-sql"]);
        assert_eq!(settings.sync.apply_args, vec!["--force"]);
        assert_eq!(settings.sync.dialect, "standard");
        assert_eq!(settings.composition.conflict_policy, ConflictPolicy::LastWins);
        assert_eq!(settings.mapping.manifest_path(), PathBuf::from("./schema.yaml"));
    }

    #[test]
    fn test_parse_sections() {
        let settings = Settings::from_toml_str(
            r#"
[mapping]
prefix = "App\\Entity"
alias = "App"

[composition]
conflict_policy = "fail_fast"

[sync]
command = "bin/console"
args = ["doctrine:schema:update"]
dialect = "mysql"
"#,
        )
        .unwrap();
        assert_eq!(settings.mapping.prefix.as_deref(), Some("App\\Entity"));
        assert_eq!(settings.composition.conflict_policy, ConflictPolicy::FailFast);
        assert_eq!(settings.sync.command.as_deref(), Some("bin/console"));
        assert_eq!(settings.sync.args, vec!["doctrine:schema:update"]);
        assert_eq!(settings.sync.dump_args, vec!["--dump-sql"]);
        assert_eq!(settings.sync.dialect, "mysql");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Settings::from_toml_str("[sync]\ndialect = \"oracle\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            Settings::from_toml_str("[sync]\ncommand = \" \""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            Settings::from_toml_str("[composition]\nconflict_policy = \"first_wins\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_dialect_is_case_insensitive() {
        let settings = Settings::from_toml_str("[sync]\ndialect = \"Postgres\"").unwrap();
        assert_eq!(settings.sync.dialect, "postgres");
        assert_eq!(normalize_dialect(" MySQL "), Some("mysql"));
        assert_eq!(normalize_dialect("mariadb"), None);
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(
            &path,
            "[mapping]\ndir = \"schema\"\n\n[sync]\nscript = \"out/sync.sql\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.mapping.dir, temp.path().join("schema"));
        assert_eq!(
            settings.sync.script,
            Some(temp.path().join("out/sync.sql"))
        );
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load_or_default(temp.path().join("missing.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_normalize_and_qualify() {
        let mapping = MappingConfig::new()
            .with_prefix("App\\Entity")
            .with_alias("App");
        assert_eq!(mapping.normalize("App:User"), "User");
        assert_eq!(mapping.normalize("App\\Entity\\User"), "User");
        assert_eq!(mapping.normalize("\\App\\Entity\\User"), "User");
        assert_eq!(mapping.normalize("User"), "User");
        assert_eq!(mapping.normalize("Other:User"), "Other:User");
        assert_eq!(mapping.qualify("User"), "App\\Entity\\User");
        assert_eq!(MappingConfig::new().qualify("User"), "User");
    }
}
