//! External command synchronizer
//!
//! Spawns the configured synchronizer as
//! `<command> <args..> <dump_args..>` for a dry run and
//! `<command> <args..> <apply_args..>` to apply. The JSON descriptor
//! document is written to the child's stdin.

use super::{SchemaSynchronizer, SyncError, SyncReport};
use crate::export::JsonExporter;
use crate::models::{EffectiveSchema, catalog_fingerprint};
use crate::validation::schema::parse_statements;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Synchronizer backed by an external command
#[derive(Debug, Clone)]
pub struct CommandSynchronizer {
    program: String,
    args: Vec<String>,
    dump_args: Vec<String>,
    apply_args: Vec<String>,
    dialect: String,
}

impl CommandSynchronizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dump_args: vec!["--dump-sql".to_string()],
            apply_args: vec!["--force".to_string()],
            dialect: "standard".to_string(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_dump_args(mut self, args: Vec<String>) -> Self {
        self.dump_args = args;
        self
    }

    pub fn with_apply_args(mut self, args: Vec<String>) -> Self {
        self.apply_args = args;
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    /// Run the command with the given mode arguments, returning its stdout
    fn run(&self, mode_args: &[String], schemas: &[EffectiveSchema]) -> Result<String, SyncError> {
        let document = JsonExporter.export(schemas)?.content;

        debug!(
            "Running synchronizer: {} {} {}",
            self.program,
            self.args.join(" "),
            mode_args.join(" ")
        );
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .args(mode_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SyncError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        // stdin is fed from its own thread while stdout/stderr drain
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || {
                if let Err(e) = stdin.write_all(document.as_bytes())
                    && e.kind() != std::io::ErrorKind::BrokenPipe
                {
                    warn!("Failed to write descriptors to synchronizer: {}", e);
                }
            })
        });

        let output = child.wait_with_output().map_err(|source| SyncError::Spawn {
            command: self.program.clone(),
            source,
        })?;
        if let Some(writer) = writer
            && writer.join().is_err()
        {
            warn!("Synchronizer stdin writer panicked");
        }

        if !output.status.success() {
            return Err(SyncError::CommandFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Split synchronizer output into statements.
///
/// Output is parsed as SQL of the given dialect; when it does not parse,
/// every `;`-terminated fragment counts as one statement and trailing text
/// without a terminator (status messages) is dropped.
pub fn split_statements(output: &str, dialect: &str) -> Vec<String> {
    if let Ok(statements) = parse_statements(output, dialect) {
        return statements.iter().map(|s| format!("{};", s)).collect();
    }

    let mut fragments: Vec<&str> = output.split(';').collect();
    fragments.pop();
    fragments
        .into_iter()
        .map(|fragment| {
            fragment
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .map(|statement| format!("{};", statement))
        .collect()
}

impl SchemaSynchronizer for CommandSynchronizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn pending_changes(&self, schemas: &[EffectiveSchema]) -> Result<Vec<String>, SyncError> {
        let stdout = self.run(&self.dump_args, schemas)?;
        let statements = split_statements(&stdout, &self.dialect);
        info!("{} reported {} pending statement(s)", self.program, statements.len());
        Ok(statements)
    }

    fn apply(&self, schemas: &[EffectiveSchema]) -> Result<SyncReport, SyncError> {
        let stdout = self.run(&self.apply_args, schemas)?;
        info!("{} applied schema changes", self.program);
        Ok(SyncReport {
            statements: split_statements(&stdout, &self.dialect),
            applied: true,
            output: stdout,
            fingerprint: catalog_fingerprint(schemas),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_parsed_sql() {
        let statements = split_statements(
            "CREATE TABLE t (id INT);\nALTER TABLE t ADD COLUMN name TEXT;\n",
            "standard",
        );
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE t"));
    }

    #[test]
    fn test_split_fallback() {
        let statements = split_statements(
            "-- vendor specific\nFROBNICATE t WITH x;\nFROBNICATE u;\nDone",
            "standard",
        );
        assert_eq!(statements, vec!["FROBNICATE t WITH x;", "FROBNICATE u;"]);
    }

    #[test]
    fn test_split_status_message_only() {
        assert!(
            split_statements("Nothing to update - your database is already in sync", "standard")
                .is_empty()
        );
        assert!(split_statements("", "standard").is_empty());
    }
}
