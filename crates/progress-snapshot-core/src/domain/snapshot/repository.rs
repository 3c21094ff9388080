//! Snapshot repository for database operations

use super::entity::{StatusCounts, UpsertOutcome, WeeklySnapshot};
use crate::error::Result;
use chrono::NaiveDate;
use sqlx::SqliteConnection;

const SNAPSHOT_COLUMNS: &str = "id, project_id, week_end_date, completed_count, in_progress_count, \
     failed_count, delayed_count, not_started_count, total_interfaces";

/// Repository for weekly snapshot rows
pub struct SnapshotRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SnapshotRepository<'c> {
    /// Create a new repository on the given connection (or transaction)
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Find the snapshot for a project and week
    pub async fn find(
        &mut self,
        project_id: i64,
        week_end_date: NaiveDate,
    ) -> Result<Option<WeeklySnapshot>> {
        let row: Option<SnapshotRow> = sqlx::query_as(&format!(
            "SELECT {} FROM weekly_progress_snapshots WHERE project_id = ? AND week_end_date = ?",
            SNAPSHOT_COLUMNS
        ))
        .bind(project_id)
        .bind(week_end_date)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(SnapshotRow::into_snapshot))
    }

    /// Insert or overwrite the snapshot for a project and week
    ///
    /// The write is a single `INSERT ... ON CONFLICT DO UPDATE` against the
    /// `(project_id, week_end_date)` unique constraint, so concurrent runs can't
    /// produce duplicate rows.
    pub async fn upsert(
        &mut self,
        project_id: i64,
        week_end_date: NaiveDate,
        counts: &StatusCounts,
    ) -> Result<(WeeklySnapshot, UpsertOutcome)> {
        let outcome = match self.find(project_id, week_end_date).await? {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        };

        let row: SnapshotRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO weekly_progress_snapshots (
                project_id, week_end_date,
                completed_count, in_progress_count, failed_count,
                delayed_count, not_started_count, total_interfaces
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (project_id, week_end_date) DO UPDATE SET
                completed_count = excluded.completed_count,
                in_progress_count = excluded.in_progress_count,
                failed_count = excluded.failed_count,
                delayed_count = excluded.delayed_count,
                not_started_count = excluded.not_started_count,
                total_interfaces = excluded.total_interfaces
            RETURNING {}
            "#,
            SNAPSHOT_COLUMNS
        ))
        .bind(project_id)
        .bind(week_end_date)
        .bind(counts.completed)
        .bind(counts.in_progress)
        .bind(counts.failed)
        .bind(counts.delayed)
        .bind(counts.not_started)
        .bind(counts.total)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok((row.into_snapshot(), outcome))
    }

    /// List snapshots for a project, newest week first
    pub async fn list_for_project(
        &mut self,
        project_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<WeeklySnapshot>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows: Vec<SnapshotRow> = sqlx::query_as(&format!(
            "SELECT {} FROM weekly_progress_snapshots WHERE project_id = ? ORDER BY week_end_date DESC LIMIT ?",
            SNAPSHOT_COLUMNS
        ))
        .bind(project_id)
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(SnapshotRow::into_snapshot).collect())
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: i64,
    project_id: i64,
    week_end_date: NaiveDate,
    completed_count: i64,
    in_progress_count: i64,
    failed_count: i64,
    delayed_count: i64,
    not_started_count: i64,
    total_interfaces: i64,
}

impl SnapshotRow {
    fn into_snapshot(self) -> WeeklySnapshot {
        WeeklySnapshot {
            id: self.id,
            project_id: self.project_id,
            week_end_date: self.week_end_date,
            counts: StatusCounts {
                completed: self.completed_count,
                in_progress: self.in_progress_count,
                failed: self.failed_count,
                not_started: self.not_started_count,
                delayed: self.delayed_count,
                total: self.total_interfaces,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::projects::ProjectRepository;
    use crate::storage::Database;

    fn week(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn counts(completed: i64, in_progress: i64) -> StatusCounts {
        StatusCounts {
            completed,
            in_progress,
            total: completed + in_progress,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates_in_place() {
        let db = Database::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let project = ProjectRepository::new(&mut conn).create("alpha").await.unwrap();
        let mut repo = SnapshotRepository::new(&mut conn);

        let (first, outcome) = repo.upsert(project.id, week(2), &counts(1, 2)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(first.counts, counts(1, 2));

        let (second, outcome) = repo.upsert(project.id, week(2), &counts(3, 0)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(second.id, first.id, "Row should be overwritten, not duplicated");
        assert_eq!(second.counts, counts(3, 0));

        let stored = repo.find(project.id, week(2)).await.unwrap().unwrap();
        assert_eq!(stored, second);

        let all = repo.list_for_project(project.id, None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let db = Database::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let project = ProjectRepository::new(&mut conn).create("alpha").await.unwrap();
        let mut repo = SnapshotRepository::new(&mut conn);

        for d in [2, 16, 9] {
            repo.upsert(project.id, week(d), &counts(1, 0)).await.unwrap();
        }

        let weeks: Vec<NaiveDate> = repo
            .list_for_project(project.id, None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.week_end_date)
            .collect();
        assert_eq!(weeks, vec![week(16), week(9), week(2)]);

        let limited = repo.list_for_project(project.id, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].week_end_date, week(16));
    }

    #[tokio::test]
    async fn test_find_missing_snapshot() {
        let db = Database::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let mut repo = SnapshotRepository::new(&mut conn);

        assert!(repo.find(42, week(2)).await.unwrap().is_none());
    }
}
