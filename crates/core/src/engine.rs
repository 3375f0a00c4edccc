//! Migration engine
//!
//! Orchestrates file discovery, parsing, execution policy, and driver
//! bookkeeping into the migrate / rollback / status / dump workflows.
//! Execution is strictly sequential: migrations apply one at a time in
//! ascending version order, and exactly one connection is opened per
//! top-level operation. Running two engines concurrently against the
//! same database requires external mutual exclusion.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::driver::{DatabaseConnection, Driver};
use crate::error::{EngineError, EngineResult};
use crate::executor::{self, ExecutionMode, MigrationStep};
use crate::migrations::files::{find_migration_file, list_migrations};
use crate::migrations::parser::parse_migration;
use crate::migrations::{MigrationFile, StatusEntry};
use crate::wait::wait_for_connection;

/// Template written for newly created migrations
const MIGRATION_TEMPLATE: &str = "-- migrate:up\n\n\n-- migrate:down\n\n";

/// Version timestamp format for new migrations (UTC, second resolution)
const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Migration engine bound to one configuration and one driver
pub struct MigrationEngine {
    config: Config,
    driver: Arc<dyn Driver>,
}

impl MigrationEngine {
    pub fn new(config: Config, driver: Arc<dyn Driver>) -> Self {
        Self { config, driver }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Block until the database server is reachable.
    ///
    /// Verifies reachability only; the target database may not exist.
    pub async fn wait(&self) -> EngineResult<()> {
        wait_for_connection(
            || self.driver.ping(),
            self.config.wait_interval,
            self.config.wait_timeout,
            || info!("waiting for database"),
        )
        .await
    }

    async fn wait_if_configured(&self) -> EngineResult<()> {
        if self.config.wait_before {
            self.wait().await
        } else {
            Ok(())
        }
    }

    /// Create the target database.
    pub async fn create(&self) -> EngineResult<()> {
        self.wait_if_configured().await?;
        self.driver.create_database().await
    }

    /// Drop the target database if it exists.
    pub async fn drop_database(&self) -> EngineResult<()> {
        self.wait_if_configured().await?;
        self.driver.drop_database().await
    }

    /// Create the database when absent, then run pending migrations.
    ///
    /// An existence check that itself fails (e.g. insufficient
    /// privilege to list databases) skips the creation step instead of
    /// aborting.
    pub async fn create_and_migrate(&self) -> EngineResult<()> {
        self.wait_if_configured().await?;

        match self.driver.database_exists().await {
            Ok(false) => self.driver.create_database().await?,
            Ok(true) => {}
            Err(err) => warn!("skipping database creation, existence check failed: {}", err),
        }

        self.migrate().await
    }

    /// Apply all pending migrations in ascending version order.
    ///
    /// Halts on the first failure. On full success the schema file is
    /// regenerated best-effort.
    pub async fn migrate(&self) -> EngineResult<()> {
        let files = list_migrations(&self.config.migrations_dir)?;
        if files.is_empty() {
            return Err(EngineError::NoMigrationFiles);
        }

        self.wait_if_configured().await?;

        let mut conn = self.open_for_migration().await?;
        let result = self.apply_pending(&files, conn.as_mut()).await;
        self.close_connection(conn).await;
        result?;

        self.auto_dump_schema().await;
        Ok(())
    }

    async fn apply_pending(
        &self,
        files: &[MigrationFile],
        conn: &mut dyn DatabaseConnection,
    ) -> EngineResult<()> {
        let applied = self.driver.select_migrations(conn, None).await?;
        let mode = self.execution_mode();

        for file in files {
            if applied.contains_key(&file.version) {
                continue;
            }

            info!("applying: {}", file.filename);
            let (up, _down) = parse_migration(&file.path)?;

            let use_transaction = up.transaction() && self.driver.supports_transactions();
            let mut step = MigrationStep::apply(
                self.driver.as_ref(),
                up.contents,
                file.version.clone(),
                mode,
            );
            executor::run_scoped(conn, use_transaction, &mut step).await?;
        }

        Ok(())
    }

    /// Roll back the most recently applied migration.
    pub async fn rollback(&self) -> EngineResult<()> {
        self.wait_if_configured().await?;

        let mut conn = self.open_for_migration().await?;
        let result = self.rollback_latest(conn.as_mut()).await;
        self.close_connection(conn).await;
        result?;

        self.auto_dump_schema().await;
        Ok(())
    }

    async fn rollback_latest(&self, conn: &mut dyn DatabaseConnection) -> EngineResult<()> {
        let applied = self.driver.select_migrations(conn, Some(1)).await?;
        let version = match applied.keys().next() {
            Some(version) => version.clone(),
            None => return Err(EngineError::NothingToRollBack),
        };

        let filename = find_migration_file(&self.config.migrations_dir, &version)?;
        info!("rolling back: {}", filename);
        let (_up, down) = parse_migration(&self.config.migrations_dir.join(&filename))?;

        let use_transaction = down.transaction() && self.driver.supports_transactions();
        let mut step = MigrationStep::revert(
            self.driver.as_ref(),
            down.contents,
            version,
            self.execution_mode(),
        );
        executor::run_scoped(conn, use_transaction, &mut step).await
    }

    /// Applied/pending state of every discovered migration file, in
    /// directory order.
    pub async fn migration_status(&self) -> EngineResult<Vec<StatusEntry>> {
        let files = list_migrations(&self.config.migrations_dir)?;
        if files.is_empty() {
            return Err(EngineError::NoMigrationFiles);
        }

        let mut conn = self.open_for_migration().await?;
        let result = self.driver.select_migrations(conn.as_mut(), None).await;
        self.close_connection(conn).await;
        let applied = result?;

        Ok(files
            .into_iter()
            .map(|file| StatusEntry {
                applied: applied.contains_key(&file.version),
                filename: file.filename,
            })
            .collect())
    }

    /// Report applied/pending counts, printing one line per file unless
    /// `quiet` is set.
    pub async fn status(&self, quiet: bool) -> EngineResult<(usize, usize)> {
        let entries = self.migration_status().await?;

        let mut applied = 0;
        for entry in &entries {
            if entry.applied {
                applied += 1;
            }
            if !quiet {
                let marker = if entry.applied { "X" } else { " " };
                println!("[{}] {}", marker, entry.filename);
            }
        }

        let pending = entries.len() - applied;
        if !quiet {
            println!();
            println!("Applied: {}", applied);
            println!("Pending: {}", pending);
        }

        Ok((applied, pending))
    }

    /// Write the current schema to the configured schema file,
    /// overwriting any previous content.
    pub async fn dump_schema(&self) -> EngineResult<()> {
        self.wait_if_configured().await?;

        let mut conn = self.open_for_migration().await?;
        let result = self.driver.dump_schema(conn.as_mut()).await;
        self.close_connection(conn).await;
        let schema = result?;

        info!("writing: {}", self.config.schema_file.display());
        if let Some(dir) = self.config.schema_file.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.config.schema_file, schema)?;
        Ok(())
    }

    /// Create a new timestamped migration file from the template.
    pub fn new_migration(&self, name: &str) -> EngineResult<PathBuf> {
        if name.is_empty() {
            return Err(EngineError::MissingName);
        }

        let timestamp = Utc::now().format(VERSION_FORMAT);
        let filename = format!("{}_{}.sql", timestamp, name);

        fs::create_dir_all(&self.config.migrations_dir)?;
        let path = self.config.migrations_dir.join(filename);
        if path.exists() {
            return Err(EngineError::FileExists(path));
        }

        info!("creating migration: {}", path.display());
        fs::write(&path, MIGRATION_TEMPLATE)?;
        Ok(path)
    }

    fn execution_mode(&self) -> ExecutionMode {
        if self.config.native_engine && self.driver.supports_compound_statements() {
            ExecutionMode::Native
        } else {
            ExecutionMode::Emulated
        }
    }

    /// Open a connection with the bookkeeping table provisioned.
    async fn open_for_migration(&self) -> EngineResult<Box<dyn DatabaseConnection>> {
        let mut conn = self.driver.open().await?;
        if let Err(err) = self.driver.create_migrations_table(conn.as_mut()).await {
            self.close_connection(conn).await;
            return Err(err);
        }
        Ok(conn)
    }

    async fn close_connection(&self, conn: Box<dyn DatabaseConnection>) {
        if let Err(err) = conn.close().await {
            warn!("failed to close database connection: {}", err);
        }
    }

    /// Regenerate the schema file after a successful migrate/rollback.
    /// Failures here are swallowed: the primary effect is committed and
    /// the dump is best-effort housekeeping.
    async fn auto_dump_schema(&self) {
        if !self.config.auto_dump_schema {
            return;
        }
        if let Err(err) = self.dump_schema().await {
            warn!("schema dump failed: {}", err);
        }
    }
}
