//! progress-snapshot Core Library
//!
//! This crate provides the core functionality for progress-snapshot, including:
//! - Commands (weekly snapshot run, snapshot history)
//! - Interface status classification
//! - Storage (SQLite via sqlx, versioned migrations)
//! - Configuration (TOML file + environment)

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::storage::{Database, DatabaseConfig};
}
