//! Database driver abstraction
//!
//! Defines the per-backend capability consumed by the engine. These
//! traits abstract away dialect-specific operations (existence checks,
//! bookkeeping DDL, schema dumps) so the engine can work with different
//! database systems through one interface.

pub mod postgres;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::migrations::AppliedVersionSet;

/// Minimal execution seam shared by live connections and transaction
/// scopes.
///
/// A migration's script execution and its bookkeeping mutation both run
/// against a scope, so they can share one transaction when the backend
/// supports it.
#[async_trait]
pub trait ExecutionScope: Send {
    /// Execute a statement or script, returning the affected row count.
    async fn execute(&mut self, sql: &str, params: &[&str]) -> EngineResult<u64>;
}

/// Abstract live database connection
#[async_trait]
pub trait DatabaseConnection: ExecutionScope {
    /// Execute a query and return the first column of every row.
    async fn fetch_versions(&mut self, sql: &str) -> EngineResult<Vec<String>>;

    /// Close the connection.
    async fn close(self: Box<Self>) -> EngineResult<()>;

    /// View this connection as a bare execution scope.
    fn as_scope(&mut self) -> &mut dyn ExecutionScope;
}

/// Per-backend capability providing connection, existence, bookkeeping
/// and dump operations.
///
/// Exactly one driver instance backs one engine; execution-policy
/// differences between backends are expressed as the capability flags
/// below, never as a textual backend identifier.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Check that the server is reachable. Does not verify that the
    /// target database exists.
    async fn ping(&self) -> EngineResult<()>;

    /// Whether the target database exists.
    async fn database_exists(&self) -> EngineResult<bool>;

    /// Create the target database.
    async fn create_database(&self) -> EngineResult<()>;

    /// Drop the target database if it exists.
    async fn drop_database(&self) -> EngineResult<()>;

    /// Open a connection to the target database.
    async fn open(&self) -> EngineResult<Box<dyn DatabaseConnection>>;

    /// Whether the backend can wrap script execution in a transaction.
    fn supports_transactions(&self) -> bool {
        true
    }

    /// Whether the backend can run a compound multi-statement script in
    /// a single call.
    fn supports_compound_statements(&self) -> bool {
        true
    }

    /// Ensure the bookkeeping table exists.
    async fn create_migrations_table(
        &self,
        conn: &mut dyn DatabaseConnection,
    ) -> EngineResult<()>;

    /// Load applied versions, newest first, bounded by `limit` when
    /// given.
    async fn select_migrations(
        &self,
        conn: &mut dyn DatabaseConnection,
        limit: Option<usize>,
    ) -> EngineResult<AppliedVersionSet>;

    /// Record a version as applied, within the given scope.
    async fn insert_migration(
        &self,
        scope: &mut dyn ExecutionScope,
        version: &str,
    ) -> EngineResult<()>;

    /// Remove a version's bookkeeping row, within the given scope.
    async fn delete_migration(
        &self,
        scope: &mut dyn ExecutionScope,
        version: &str,
    ) -> EngineResult<()>;

    /// Produce a full textual snapshot of the current schema.
    async fn dump_schema(&self, conn: &mut dyn DatabaseConnection) -> EngineResult<Vec<u8>>;
}
