//! Script execution policy
//!
//! Decides how a migration script reaches the backend (natively as one
//! compound call, or emulated statement by statement) and owns the
//! scoped-execution helper that wraps a migration step in a transaction
//! and guarantees commit-or-rollback on every exit path.

use async_trait::async_trait;
use tracing::debug;

use crate::driver::{DatabaseConnection, Driver, ExecutionScope};
use crate::error::EngineResult;
use crate::migrations::statements::split_statements;

/// How a script is submitted to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Submit the whole script as one call, trusting the backend's own
    /// semantics for partial failure within the batch
    Native,
    /// Split the script and submit statements one at a time, stopping
    /// at the first failure
    Emulated,
}

/// Execute `script` against `scope` under the given mode.
///
/// Under [`ExecutionMode::Emulated`], statements already executed are
/// not undone on failure unless the scope is transactional.
pub async fn execute_script(
    scope: &mut dyn ExecutionScope,
    script: &str,
    mode: ExecutionMode,
) -> EngineResult<()> {
    match mode {
        ExecutionMode::Native => {
            debug!("executing script on native engine");
            scope.execute(script, &[]).await?;
        }
        ExecutionMode::Emulated => {
            debug!("executing script on emulated engine");
            for statement in split_statements(script) {
                scope.execute(&statement, &[]).await?;
            }
        }
    }
    Ok(())
}

/// A unit of work run under [`run_scoped`]
#[async_trait]
pub trait ScopedOperation: Send {
    async fn run(&mut self, scope: &mut dyn ExecutionScope) -> EngineResult<()>;
}

/// Run `op` against `conn`, inside a transaction when requested.
///
/// On success the transaction is committed; on failure a rollback is
/// attempted, and a rollback failure supersedes the original error
/// since it signals a more severe condition. Without a transaction the
/// operation runs directly on the live connection, with no atomicity
/// between the schema change and the bookkeeping mutation.
pub async fn run_scoped(
    conn: &mut dyn DatabaseConnection,
    use_transaction: bool,
    op: &mut dyn ScopedOperation,
) -> EngineResult<()> {
    if !use_transaction {
        debug!("running migration step outside a transaction");
        return op.run(conn.as_scope()).await;
    }

    conn.execute("BEGIN", &[]).await?;
    match op.run(conn.as_scope()).await {
        Ok(()) => {
            conn.execute("COMMIT", &[]).await?;
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = conn.execute("ROLLBACK", &[]).await {
                return Err(rollback_err);
            }
            Err(err)
        }
    }
}

/// Bookkeeping side of a migration step
enum Bookkeeping {
    Insert,
    Delete,
}

/// One migration's script execution plus its bookkeeping mutation,
/// runnable inside a single scope.
pub struct MigrationStep<'d> {
    driver: &'d dyn Driver,
    script: String,
    version: String,
    mode: ExecutionMode,
    action: Bookkeeping,
}

impl<'d> MigrationStep<'d> {
    /// Step that applies a migration and records its version.
    pub fn apply(
        driver: &'d dyn Driver,
        script: String,
        version: String,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            driver,
            script,
            version,
            mode,
            action: Bookkeeping::Insert,
        }
    }

    /// Step that reverts a migration and removes its version.
    pub fn revert(
        driver: &'d dyn Driver,
        script: String,
        version: String,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            driver,
            script,
            version,
            mode,
            action: Bookkeeping::Delete,
        }
    }
}

#[async_trait]
impl ScopedOperation for MigrationStep<'_> {
    async fn run(&mut self, scope: &mut dyn ExecutionScope) -> EngineResult<()> {
        execute_script(scope, &self.script, self.mode).await?;
        match self.action {
            Bookkeeping::Insert => self.driver.insert_migration(scope, &self.version).await,
            Bookkeeping::Delete => self.driver.delete_migration(scope, &self.version).await,
        }
    }
}
