//! ddbsync CLI
//!
//! Command-line tool for copying DynamoDB tables into MySQL or SQLite.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use ddbsync::config::{DEFAULT_CONCURRENCY, MySqlSettings};
use ddbsync::prelude::*;
use ddbsync::{source, target};

/// Copy DynamoDB tables into MySQL or SQLite, inferring the schema.
#[derive(Parser)]
#[command(name = "ddbsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of parallel scan segments.
    #[arg(long, env = "CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Enable verbose output (logs every statement).
    #[arg(short, long, env = "VERBOSE")]
    verbose: bool,

    /// MySQL storage engine for created tables.
    #[arg(long, env = "MYSQL_ENGINE", default_value = "InnoDB")]
    engine: String,

    /// MySQL default charset for created tables and the connection.
    #[arg(long, env = "MYSQL_CHARSET", default_value = "utf8")]
    charset: String,

    /// MySQL host.
    #[arg(long, env = "MYSQL_HOST")]
    mysql_host: Option<String>,

    /// MySQL port.
    #[arg(long, env = "MYSQL_PORT")]
    mysql_port: Option<u16>,

    /// MySQL user.
    #[arg(long, env = "MYSQL_USER")]
    mysql_user: Option<String>,

    /// MySQL password.
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    mysql_password: Option<String>,

    /// MySQL database.
    #[arg(long, env = "MYSQL_DATABASE")]
    mysql_database: Option<String>,

    /// Write to this SQLite database instead of MySQL.
    #[arg(long, env = "SQLITE_URL")]
    sqlite_url: Option<String>,

    /// Read tables from a JSON export directory instead of DynamoDB.
    #[arg(long, env = "SOURCE_DIR")]
    source_dir: Option<PathBuf>,

    /// AWS region for DynamoDB.
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy one table.
    Table {
        /// Table name.
        name: String,

        /// Empty the target table before copying.
        #[arg(long)]
        truncate: bool,
    },

    /// Copy every table in the source.
    All {
        /// Empty each target table before copying.
        #[arg(long)]
        truncate: bool,

        /// Keep going when a table fails.
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Show the DDL a run would issue for a table, without executing it.
    Plan {
        /// Table name.
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Resolve configuration before touching any store
    let mut options = SyncOptions::new()
        .concurrency(cli.concurrency)
        .table_options(TableOptions {
            engine: cli.engine,
            charset: cli.charset,
        });
    match &cli.command {
        Commands::Table { truncate, .. } => options = options.truncate(*truncate),
        Commands::All {
            truncate,
            continue_on_error,
        } => {
            let policy = if *continue_on_error {
                FailurePolicy::Continue
            } else {
                FailurePolicy::Abort
            };
            options = options.truncate(*truncate).failure_policy(policy);
        }
        Commands::Plan { .. } => options = options.dry_run(true),
    }
    options.validate()?;

    let target_config = TargetConfig::resolve(
        cli.sqlite_url,
        MySqlSettings {
            host: cli.mysql_host,
            port: cli.mysql_port,
            user: cli.mysql_user,
            password: cli.mysql_password,
            database: cli.mysql_database,
        },
    )?;
    let source_config = SourceConfig::resolve(cli.source_dir, cli.region)?;

    // Connect
    info!(database = %target_config.describe(), "Connecting to target");
    let target_store = target::connect(&target_config, &options.table_options).await?;
    let source_store = source::open(&source_config).await?;
    let sync = Synchronizer::new(source_store, target_store).options(options);

    match cli.command {
        Commands::Table { name, .. } => {
            let outcome = sync.sync_table(&name).await?;
            log_outcome(&outcome);
        }

        Commands::All { .. } => {
            let report = sync.sync_all().await?;
            for outcome in &report.outcomes {
                log_outcome(outcome);
            }
            for failure in &report.failures {
                warn!(table = %failure.table, error = %failure.message, "Table failed");
            }
            if !report.is_success() {
                anyhow::bail!("{} table(s) failed", report.failures.len());
            }
        }

        Commands::Plan { name } => match sync.sync_table(&name).await? {
            TableOutcome::Planned { statements, .. } if statements.is_empty() => {
                info!(table = %name, "Schema is up to date, nothing to do");
            }
            TableOutcome::Planned { statements, .. } => {
                for sql in statements {
                    println!("{sql};");
                }
            }
            other => log_outcome(&other),
        },
    }

    Ok(())
}

fn log_outcome(outcome: &TableOutcome) {
    match outcome {
        TableOutcome::Synced {
            table,
            created,
            columns_changed,
            records_copied,
        } => info!(
            table = %table,
            created,
            columns_changed,
            records_copied,
            "Table synchronized"
        ),
        TableOutcome::Planned { table, statements } => {
            info!(table = %table, statements = statements.len(), "Table planned");
        }
        TableOutcome::Skipped { table } => info!(table = %table, "Table skipped (empty)"),
    }
}
