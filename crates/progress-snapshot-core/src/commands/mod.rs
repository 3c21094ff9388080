//! Commands module - all operations as library functions
//!
//! These commands are used by the CLI and by any scheduler embedding the library.

pub mod history;
pub mod snapshot;

pub use history::snapshot_history;
pub use snapshot::{take_weekly_snapshot, ProjectOutcome, ProjectReport, RunOptions, RunReport};
