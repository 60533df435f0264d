//! schema-compose command line interface.
//!
//! Loads the manifest named by `schema-compose.toml`, composes record types
//! and hands them to exporters or the configured schema synchronizer.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use schema_compose::cli::{Context, commands};
use schema_compose::compose::ConflictPolicy;
use schema_compose::config::DEFAULT_CONFIG_FILE;
use tracing_subscriber::EnvFilter;

/// Compose record types from field-set units and synchronize their schema.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Manifest file (overrides `[mapping]`)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Conflict policy: last_wins or fail_fast (overrides `[composition]`)
    #[arg(long)]
    policy: Option<ConflictPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the record types of the catalog
    List,

    /// Show the effective schema of one record type
    Show {
        /// Record type name (short, aliased or prefixed)
        record: String,

        /// Output format: json, yaml or table
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Export effective schemas as DDL or JSON descriptors
    Export {
        /// Export format: sql or json
        #[arg(short, long, default_value = "sql")]
        format: String,

        /// SQL dialect: standard, postgres, mysql or sqlserver
        #[arg(long)]
        dialect: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate units, record types and relationships
    Validate,

    /// Run the schema synchronizer
    Sync {
        /// Print pending changes without applying them
        #[arg(long, conflicts_with = "force", required_unless_present = "force")]
        dump_sql: bool,

        /// Apply pending changes
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let context = Context::load(&cli.config, cli.manifest.as_deref(), cli.policy)
        .with_context(|| format!("loading definitions ({})", cli.config.display()))?;

    match cli.command {
        Commands::List => commands::handle_list(&context)?,
        Commands::Show { record, format } => commands::handle_show(&context, &record, &format)?,
        Commands::Export {
            format,
            dialect,
            output,
        } => commands::handle_export(&context, &format, dialect.as_deref(), output.as_deref())?,
        Commands::Validate => commands::handle_validate(&context)?,
        Commands::Sync { dump_sql: _, force } => commands::handle_sync(&context, force)?,
    }
    Ok(())
}
