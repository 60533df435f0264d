//! Export command implementation

use crate::cli::{CliError, Context};
use crate::config::{SUPPORTED_DIALECTS, normalize_dialect};
use crate::export::{ExportResult, JsonExporter, SQLExporter};
use crate::sync::prepare;
use std::path::Path;
use tracing::info;

/// Handle the export command
///
/// Writes to `output` when given, stdout otherwise.
pub fn handle_export(
    context: &Context,
    format: &str,
    dialect: Option<&str>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let dialect = match dialect {
        Some(dialect) => normalize_dialect(dialect).ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "Unknown dialect: {} (expected one of {})",
                dialect,
                SUPPORTED_DIALECTS.join(", ")
            ))
        })?,
        None => context.settings.sync.dialect.as_str(),
    };
    let schemas = prepare(&context.catalog, context.policy())?;

    let result: ExportResult = match format {
        "sql" => SQLExporter.export(&schemas, Some(dialect))?,
        "json" => JsonExporter.export(&schemas)?,
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown format: {}",
                format
            )));
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &result.content)
                .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string()))?;
            info!("Wrote {} export to {}", result.format, path.display());
        }
        None => print!("{}", result.content),
    }
    Ok(())
}
