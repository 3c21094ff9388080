//! Project tracking domain
//!
//! Projects, their interfaces, scheduled sub-tasks and upload history as read by the
//! snapshot run.

pub mod entity;
pub mod repository;

pub use entity::{
    DeclaredStatus, InterfaceStatus, Project, ScheduleTask, TaskName, TaskStatus, UploadOutcome,
    UploadRecord,
};
pub use repository::ProjectRepository;
