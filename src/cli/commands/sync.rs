//! Sync command implementation

use crate::cli::{
    CliError, Context,
    output::{format_pending, format_sync_report},
};
use crate::sync::{from_config, prepare};
use tracing::info;

/// Handle the sync command
///
/// `force` applies the changes; otherwise the pending statements are
/// printed (dry run).
pub fn handle_sync(context: &Context, force: bool) -> Result<(), CliError> {
    let schemas = prepare(&context.catalog, context.policy())?;
    let synchronizer = from_config(&context.settings.sync);
    info!("Synchronizing with {}", synchronizer.name());

    if force {
        let report = synchronizer.apply(&schemas)?;
        print!("{}", format_sync_report(&report));
    } else {
        let statements = synchronizer.pending_changes(&schemas)?;
        print!("{}", format_pending(&statements));
    }
    Ok(())
}
