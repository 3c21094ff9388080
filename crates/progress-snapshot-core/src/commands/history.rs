//! Snapshot history lookup

use crate::domain::projects::ProjectRepository;
use crate::domain::snapshot::{SnapshotRepository, WeeklySnapshot};
use crate::error::{Error, Result};
use crate::storage::Database;

/// List stored snapshots for a project by name, newest week first
pub async fn snapshot_history(
    db: &Database,
    project_name: &str,
    limit: Option<u32>,
) -> Result<Vec<WeeklySnapshot>> {
    let mut conn = db.pool().acquire().await?;

    let project = ProjectRepository::new(&mut conn)
        .get_by_name(project_name)
        .await?
        .ok_or_else(|| Error::ProjectNotFound(project_name.to_string()))?;

    SnapshotRepository::new(&mut conn)
        .list_for_project(project.id, limit)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::snapshot::{take_weekly_snapshot, RunOptions};
    use crate::config::SnapshotSettings;
    use crate::domain::projects::DeclaredStatus;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_history_for_unknown_project() {
        let db = Database::in_memory().await.unwrap();
        let err = snapshot_history(&db, "nope", None).await.unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }

    #[tokio::test]
    async fn test_history_lists_runs_across_weeks() {
        let db = Database::in_memory().await.unwrap();
        {
            let mut conn = db.pool().acquire().await.unwrap();
            let mut repo = ProjectRepository::new(&mut conn);
            let project = repo.create("alpha").await.unwrap();
            repo.add_interface(project.id, "SKU", DeclaredStatus::NotStarted)
                .await
                .unwrap();
        }

        let settings = SnapshotSettings::default();
        for day in [5, 12, 13] {
            let run_date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
            take_weekly_snapshot(&db, &RunOptions::new(run_date, &settings))
                .await
                .unwrap();
        }

        let history = snapshot_history(&db, "alpha", None).await.unwrap();
        let weeks: Vec<String> = history.iter().map(|s| s.week_end_date.to_string()).collect();
        assert_eq!(weeks, vec!["2024-06-09", "2024-06-02"]);
        assert!(history.iter().all(|s| s.counts.not_started == 1));

        let latest = snapshot_history(&db, "alpha", Some(1)).await.unwrap();
        assert_eq!(latest.len(), 1);
    }
}
