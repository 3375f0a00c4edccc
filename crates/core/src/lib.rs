//! # dbshift-core: database schema migration engine
//!
//! Tracks which versioned SQL change-sets have been applied to a target
//! database, applies pending ones in ascending version order, rolls the
//! most recent one back, reports status, and regenerates a full schema
//! snapshot after each change.
//!
//! All dialect-specific behavior (connecting, create/drop database,
//! bookkeeping DDL, schema dumps) lives behind the [`Driver`] capability,
//! so the engine itself never branches on a backend identifier.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod executor;
pub mod migrations;
pub mod wait;


pub use config::Config;
pub use driver::{DatabaseConnection, Driver, ExecutionScope};
pub use engine::MigrationEngine;
pub use error::{EngineError, EngineResult};
pub use executor::ExecutionMode;
pub use migrations::{
    AppliedVersionSet, MigrationFile, MigrationScript, ScriptDirection, StatusEntry,
};
