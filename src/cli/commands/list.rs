//! List command implementation

use crate::cli::{CliError, Context, output::format_record_list};

/// Handle the list command
pub fn handle_list(context: &Context) -> Result<(), CliError> {
    let records = context.catalog.list_record_types();
    print!("{}", format_record_list(&records, &context.settings.mapping));
    Ok(())
}
