//! Error types for progress-snapshot

use thiserror::Error;

/// Result type alias using progress-snapshot's Error
pub type Result<T> = std::result::Result<T, Error>;

/// progress-snapshot error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Project '{0}' not found. Run `progress-snapshot doctor` to check the configured database.")]
    ProjectNotFound(String),

    // Data errors (E100-E199)
    #[error("Invalid {field} value '{value}' stored in {table}")]
    InvalidStoredValue {
        table: &'static str,
        field: &'static str,
        value: String,
    },

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Snapshot run rolled back")]
    RunAborted(#[source] Box<Error>),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Build an `InvalidStoredValue` error for a column that failed enum validation
    pub fn invalid_value(table: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidStoredValue {
            table,
            field,
            value: value.into(),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "E001",
            Self::InvalidStoredValue { .. } => "E100",
            Self::DatabaseError(_) => "E400",
            Self::RunAborted(_) => "E401",
            Self::ConfigError(_) => "E600",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ProjectNotFound(_) => Some("progress-snapshot doctor".to_string()),
            Self::InvalidStoredValue { table, field, .. } => {
                Some(format!("Fix the {} column of table {}", field, table))
            }
            Self::ConfigError(_) => Some("Set DATABASE_URL (e.g. sqlite://progress.db)".to_string()),
            Self::RunAborted(cause) => cause.suggestion(),
            Self::DatabaseError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_not_found_error() {
        let error = Error::ProjectNotFound("acme".to_string());
        assert_eq!(error.code(), "E001");
        assert_eq!(error.suggestion(), Some("progress-snapshot doctor".to_string()));
        assert!(error.to_string().contains("acme"));
    }

    #[test]
    fn test_invalid_stored_value_error() {
        let error = Error::invalid_value("project_schedule_tasks", "status", "Done?");
        assert_eq!(error.code(), "E100");
        assert!(error.to_string().contains("Done?"));
        assert!(error.to_string().contains("project_schedule_tasks"));
        assert_eq!(
            error.suggestion(),
            Some("Fix the status column of table project_schedule_tasks".to_string())
        );
    }

    #[test]
    fn test_config_error() {
        let error = Error::ConfigError("DATABASE_URL is not set".to_string());
        assert_eq!(error.code(), "E600");
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_database_error_from_sqlx() {
        let error: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(error.code(), "E400");
        assert_eq!(error.suggestion(), None);
    }

    #[test]
    fn test_run_aborted_keeps_cause() {
        use std::error::Error as _;

        let error = Error::RunAborted(Box::new(Error::invalid_value(
            "project_schedule_tasks",
            "status",
            "Finished",
        )));
        assert_eq!(error.code(), "E401");
        assert_eq!(error.to_string(), "Snapshot run rolled back");

        let cause = error.source().expect("cause should be kept");
        assert!(cause.to_string().contains("Finished"));
        assert_eq!(
            error.suggestion(),
            Some("Fix the status column of table project_schedule_tasks".to_string())
        );
    }
}
