//! Project tracking entities
//!
//! Projects own interfaces (with a declared status), scheduled sub-tasks per interface,
//! and a name-keyed upload log. Status columns are stored as display strings and
//! parsed into closed enums here.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A tracked project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    /// Unique project name; upload history is keyed by it
    pub name: String,
}

/// Status an interface owner declares for an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredStatus {
    #[default]
    NotStarted,
    InProgress,
    FailedValidation,
    CompletedAwaitingUpload,
    CompletedAndUploaded,
}

impl DeclaredStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclaredStatus::NotStarted => "Not Started",
            DeclaredStatus::InProgress => "In Progress",
            DeclaredStatus::FailedValidation => "Failed validation",
            DeclaredStatus::CompletedAwaitingUpload => {
                "Completed and awaiting upload in RELEX system"
            }
            DeclaredStatus::CompletedAndUploaded => "Completed and uploaded",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Not Started" => Some(DeclaredStatus::NotStarted),
            "In Progress" => Some(DeclaredStatus::InProgress),
            "Failed validation" => Some(DeclaredStatus::FailedValidation),
            "Completed and awaiting upload in RELEX system" => {
                Some(DeclaredStatus::CompletedAwaitingUpload)
            }
            "Completed and uploaded" => Some(DeclaredStatus::CompletedAndUploaded),
            _ => None,
        }
    }
}

/// Declared status of one interface within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceStatus {
    pub id: i64,
    pub project_id: i64,
    pub interface_name: String,
    pub status: DeclaredStatus,
}

/// Pipeline step an interface goes through
///
/// Ordering follows the delivery pipeline; names outside it are kept verbatim and
/// sort after every known step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskName {
    DataExtraction,
    DataDelivery,
    TechnicalValidation,
    FunctionalValidation,
    Other(String),
}

impl TaskName {
    pub fn as_str(&self) -> &str {
        match self {
            TaskName::DataExtraction => "Data Extraction",
            TaskName::DataDelivery => "Data Delivery",
            TaskName::TechnicalValidation => "Technical Validation",
            TaskName::FunctionalValidation => "Functional Validation",
            TaskName::Other(name) => name,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Data Extraction" => TaskName::DataExtraction,
            "Data Delivery" => TaskName::DataDelivery,
            "Technical Validation" => TaskName::TechnicalValidation,
            "Functional Validation" => TaskName::FunctionalValidation,
            _ => TaskName::Other(s.to_string()),
        }
    }

    /// Position in the pipeline; unknown names share the last slot
    pub fn sequence(&self) -> u8 {
        match self {
            TaskName::DataExtraction => 0,
            TaskName::DataDelivery => 1,
            TaskName::TechnicalValidation => 2,
            TaskName::FunctionalValidation => 3,
            TaskName::Other(_) => 4,
        }
    }
}

/// Completion status of a scheduled sub-task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pendente",
            TaskStatus::InProgress => "Em Andamento",
            TaskStatus::Done => "Concluído",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pendente" => Some(TaskStatus::Pending),
            "Em Andamento" => Some(TaskStatus::InProgress),
            "Concluído" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// A scheduled sub-task for one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTask {
    pub id: i64,
    pub project_id: i64,
    pub interface_name: String,
    pub task_name: TaskName,
    pub status: TaskStatus,
    /// Planned completion date
    pub end_date: Option<NaiveDate>,
}

/// Outcome logged for a file upload
///
/// The upload log is written by the uploader, so any value it records is kept. Only
/// `Error` marks an interface as failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadOutcome {
    Success,
    Error,
    Other(String),
}

impl UploadOutcome {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &str {
        match self {
            UploadOutcome::Success => "Success",
            UploadOutcome::Error => "Error",
            UploadOutcome::Other(status) => status,
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Self {
        match s {
            "Success" => UploadOutcome::Success,
            "Error" => UploadOutcome::Error,
            _ => UploadOutcome::Other(s.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, UploadOutcome::Error)
    }
}

/// One entry in the upload log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: i64,
    pub project_name: Option<String>,
    pub interface_name: Option<String>,
    pub filename: String,
    pub status: UploadOutcome,
    pub uploaded_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_status_roundtrip_strings() {
        for status in [
            DeclaredStatus::NotStarted,
            DeclaredStatus::InProgress,
            DeclaredStatus::FailedValidation,
            DeclaredStatus::CompletedAwaitingUpload,
            DeclaredStatus::CompletedAndUploaded,
        ] {
            assert_eq!(DeclaredStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DeclaredStatus::parse("not started"), None);
    }

    #[test]
    fn test_task_status_sentinels() {
        assert_eq!(TaskStatus::parse("Concluído"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::parse("Pendente"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::parse("Concluido"), None);
        assert!(TaskStatus::Done.is_done());
        assert!(!TaskStatus::InProgress.is_done());
    }

    #[test]
    fn test_task_name_sequence() {
        assert!(TaskName::DataExtraction.sequence() < TaskName::DataDelivery.sequence());
        assert!(TaskName::DataDelivery.sequence() < TaskName::TechnicalValidation.sequence());
        assert!(
            TaskName::TechnicalValidation.sequence() < TaskName::FunctionalValidation.sequence()
        );
        assert!(
            TaskName::FunctionalValidation.sequence() < TaskName::parse("Go-live").sequence()
        );
    }

    #[test]
    fn test_task_name_parse_keeps_unknown_names() {
        assert_eq!(TaskName::parse("Data Delivery"), TaskName::DataDelivery);
        let other = TaskName::parse("Cutover rehearsal");
        assert_eq!(other, TaskName::Other("Cutover rehearsal".to_string()));
        assert_eq!(other.as_str(), "Cutover rehearsal");
    }

    #[test]
    fn test_upload_outcome_parse() {
        assert_eq!(UploadOutcome::parse("Error"), UploadOutcome::Error);
        assert_eq!(UploadOutcome::parse("Success"), UploadOutcome::Success);
        assert!(UploadOutcome::parse("Error").is_error());

        // Only the exact sentinel counts as a failure
        let lowercase = UploadOutcome::parse("error");
        assert_eq!(lowercase, UploadOutcome::Other("error".to_string()));
        assert!(!lowercase.is_error());
        assert_eq!(UploadOutcome::parse("Warning").as_str(), "Warning");
    }
}
