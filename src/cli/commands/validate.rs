//! Validate command implementation

use crate::cli::{CliError, Context, output::format_report};
use crate::validation::validate_catalog;

/// Handle the validate command
///
/// Prints every finding; fails when the report contains errors.
pub fn handle_validate(context: &Context) -> Result<(), CliError> {
    let report = validate_catalog(&context.catalog, context.policy());
    print!("{}", format_report(&report));

    if !report.is_valid() {
        return Err(CliError::ValidationError(format!(
            "{} error(s)",
            report.errors.len()
        )));
    }
    Ok(())
}
