//! Show command implementation

use crate::cli::{CliError, Context, output::format_schema};
use crate::compose::Composer;
use crate::export::JsonExporter;

/// Handle the show command
pub fn handle_show(context: &Context, record: &str, format: &str) -> Result<(), CliError> {
    let name = context.settings.mapping.normalize(record);
    let schema = Composer::new(&context.catalog)
        .with_policy(context.policy())
        .compose(&name)?;

    let rendered = match format {
        "json" => JsonExporter.export_schema(&schema)?.content,
        "yaml" => serde_yaml::to_string(&schema)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to render YAML: {}", e)))?,
        "table" => format_schema(&schema),
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown format: {}",
                format
            )));
        }
    };

    println!("{}", rendered.trim_end());
    Ok(())
}
