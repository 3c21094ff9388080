//! Weekly snapshot domain
//!
//! # Architecture
//!
//! - **Entities**: `WeeklySnapshot`, `StatusCounts`, `Classification`
//! - **Classifier**: pure per-interface classification and per-project tallies
//! - **Week**: `WeekEndPolicy` mapping a run date to its week-ending date
//! - **Repository**: `SnapshotRepository` for the idempotent upsert

pub mod classifier;
pub mod entity;
pub mod repository;
pub mod week;

pub use classifier::{classify_interface, latest_uploads, tally_interfaces, tasks_by_interface};
pub use entity::{Classification, StatusCategory, StatusCounts, UpsertOutcome, WeeklySnapshot};
pub use repository::SnapshotRepository;
pub use week::WeekEndPolicy;
