//! Snapshot entities

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Primary status bucket of an interface; exactly one applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Completed,
    Failed,
    NotStarted,
    InProgress,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Completed => "Completed",
            StatusCategory::Failed => "Failed",
            StatusCategory::NotStarted => "Not Started",
            StatusCategory::InProgress => "In Progress",
        }
    }
}

/// Result of classifying one interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: StatusCategory,
    /// Overlay flag, independent of `category` except that completed work is never late
    pub delayed: bool,
}

/// Per-category tallies for one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub completed: i64,
    pub in_progress: i64,
    pub failed: i64,
    pub not_started: i64,
    pub delayed: i64,
    pub total: i64,
}

impl StatusCounts {
    /// Add one classified interface to the tallies
    pub fn record(&mut self, classification: Classification) {
        match classification.category {
            StatusCategory::Completed => self.completed += 1,
            StatusCategory::Failed => self.failed += 1,
            StatusCategory::NotStarted => self.not_started += 1,
            StatusCategory::InProgress => self.in_progress += 1,
        }
        if classification.delayed {
            self.delayed += 1;
        }
        self.total += 1;
    }

    /// Sum of the mutually exclusive buckets; always equals `total`
    pub fn primary_sum(&self) -> i64 {
        self.completed + self.in_progress + self.failed + self.not_started
    }
}

/// Persisted weekly rollup for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySnapshot {
    pub id: i64,
    pub project_id: i64,
    pub week_end_date: NaiveDate,
    pub counts: StatusCounts,
}

/// Whether an upsert inserted a new row or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}
