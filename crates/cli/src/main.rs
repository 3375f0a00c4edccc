//! dbshift command line interface
//!
//! Thin wrapper over `dbshift-core`: flags map onto an engine
//! configuration, subcommands dispatch to engine operations.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use dbshift_core::config::{DEFAULT_MIGRATIONS_DIR, DEFAULT_SCHEMA_FILE};
use dbshift_core::driver::postgres::PostgresDriver;
use dbshift_core::{Config, MigrationEngine};

#[derive(Parser)]
#[command(name = "dbshift", version, about = "Database schema migration tool")]
struct Cli {
    /// Database connection URL
    #[arg(short = 'u', long = "url", env = "DATABASE_URL", global = true)]
    url: Option<Url>,

    /// Directory containing migration files
    #[arg(
        short = 'd',
        long = "migrations-dir",
        default_value = DEFAULT_MIGRATIONS_DIR,
        global = true
    )]
    migrations_dir: PathBuf,

    /// Path to the generated schema file
    #[arg(
        short = 's',
        long = "schema-file",
        default_value = DEFAULT_SCHEMA_FILE,
        global = true
    )]
    schema_file: PathBuf,

    /// Skip regenerating the schema file after migrate/rollback
    #[arg(long = "no-dump-schema", global = true)]
    no_dump_schema: bool,

    /// Wait for the database server before running the command
    #[arg(long = "wait", global = true)]
    wait: bool,

    /// Maximum seconds to wait for the database server
    #[arg(long = "wait-timeout", default_value_t = 60, global = true)]
    wait_timeout: u64,

    /// Run migration scripts statement by statement instead of as one call
    #[arg(long = "no-native-engine", global = true)]
    no_native_engine: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new migration file
    New {
        /// Name for the migration, e.g. `create_users`
        name: String,
    },
    /// Create the database
    Create,
    /// Drop the database
    Drop,
    /// Create the database if needed, then apply pending migrations
    Up,
    /// Apply pending migrations
    Migrate,
    /// Roll back the most recent migration
    Rollback,
    /// List migrations and their applied state
    Status {
        /// Print only the exit status, no per-file lines
        #[arg(short, long)]
        quiet: bool,
    },
    /// Write the current schema to the schema file
    Dump,
    /// Block until the database server is reachable
    Wait,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let url = cli
        .url
        .ok_or_else(|| anyhow!("no database URL given; set --url or DATABASE_URL"))?;

    let mut config = Config::new(url);
    config.migrations_dir = cli.migrations_dir;
    config.schema_file = cli.schema_file;
    config.auto_dump_schema = !cli.no_dump_schema;
    config.wait_before = cli.wait;
    config.wait_timeout = Duration::from_secs(cli.wait_timeout);
    config.native_engine = !cli.no_native_engine;

    let driver = PostgresDriver::new(config.database_url.clone())
        .context("unsupported database URL")?;
    let engine = MigrationEngine::new(config, Arc::new(driver));

    match cli.command {
        Command::New { name } => {
            engine.new_migration(&name)?;
        }
        Command::Create => engine.create().await?,
        Command::Drop => engine.drop_database().await?,
        Command::Up => engine.create_and_migrate().await?,
        Command::Migrate => engine.migrate().await?,
        Command::Rollback => engine.rollback().await?,
        Command::Status { quiet } => {
            let (_applied, pending) = engine.status(quiet).await?;
            if pending > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Dump => engine.dump_schema().await?,
        Command::Wait => engine.wait().await?,
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_quiet_flag_parses() {
        let cli = Cli::parse_from(["dbshift", "status", "--quiet"]);
        assert!(matches!(cli.command, Command::Status { quiet: true }));
    }

    #[test]
    fn global_flags_apply_before_the_subcommand() {
        let cli = Cli::parse_from([
            "dbshift",
            "--url",
            "postgres://localhost/app",
            "--wait",
            "migrate",
        ]);
        assert!(cli.url.is_some());
        assert!(cli.wait);
        assert!(matches!(cli.command, Command::Migrate));
    }
}
