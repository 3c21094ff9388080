//! Domain layer
//!
//! - `projects`: tracked projects and their interface, task and upload data
//! - `snapshot`: classification rules and the weekly rollup store

pub mod projects;
pub mod snapshot;
