//! Storage layer - SQLite via sqlx
//!
//! Provides database management and migrations for progress-snapshot.
//!
//! # Architecture
//!
//! - `database`: Connection pool management and initialization
//! - `migrations`: Schema versioning and automatic migration
//!
//! # Usage
//!
//! ```ignore
//! use progress_snapshot_core::storage::{Database, DatabaseConfig};
//!
//! // Create an in-memory database for testing
//! let db = Database::in_memory().await?;
//!
//! // Or connect to the configured store
//! let db = Database::new(DatabaseConfig::from_config(&config)?).await?;
//! ```

pub mod database;
pub mod migrations;

pub use database::{Database, DatabaseConfig};
pub use migrations::{migration_status, run_migrations, MigrationStatus, CURRENT_VERSION};
