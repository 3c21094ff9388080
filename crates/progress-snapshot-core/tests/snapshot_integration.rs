//! progress-snapshot Core Integration Tests

use chrono::{NaiveDate, NaiveDateTime};
use progress_snapshot_core::{
    commands::{snapshot_history, take_weekly_snapshot, ProjectOutcome, RunOptions},
    config::SnapshotSettings,
    domain::projects::{DeclaredStatus, ProjectRepository, TaskName, TaskStatus, UploadOutcome},
    domain::snapshot::StatusCounts,
    storage::Database,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn timestamp(d: NaiveDate, hour: u32) -> NaiveDateTime {
    d.and_hms_opt(hour, 0, 0).unwrap()
}

/// Seed project P with interfaces A (all tasks done), B (declared not started),
/// C (latest upload failed, overdue task)
async fn seed_reference_project(db: &Database, today: NaiveDate) {
    let mut conn = db.pool().acquire().await.unwrap();
    let mut repo = ProjectRepository::new(&mut conn);

    let project = repo.create("P").await.unwrap();
    repo.add_interface(project.id, "A", DeclaredStatus::InProgress).await.unwrap();
    repo.add_interface(project.id, "B", DeclaredStatus::NotStarted).await.unwrap();
    repo.add_interface(project.id, "C", DeclaredStatus::InProgress).await.unwrap();

    let last_week = today.pred_opt().unwrap().pred_opt().unwrap();
    for name in [
        TaskName::DataExtraction,
        TaskName::DataDelivery,
        TaskName::TechnicalValidation,
        TaskName::FunctionalValidation,
    ] {
        repo.add_task(project.id, "A", name, TaskStatus::Done, Some(last_week))
            .await
            .unwrap();
    }
    repo.add_task(project.id, "C", TaskName::DataExtraction, TaskStatus::Pending, Some(last_week))
        .await
        .unwrap();

    repo.record_upload("P", "C", "c.csv", UploadOutcome::Success, Some(timestamp(last_week, 8)))
        .await
        .unwrap();
    repo.record_upload("P", "C", "c.csv", UploadOutcome::Error, Some(timestamp(last_week, 17)))
        .await
        .unwrap();
    // A failing upload for a completed interface doesn't matter
    repo.record_upload("P", "A", "a.csv", UploadOutcome::Error, Some(timestamp(last_week, 9)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reference_project_counts() {
    let db = Database::in_memory().await.unwrap();
    let today = date(2024, 6, 5);
    seed_reference_project(&db, today).await;

    let report = take_weekly_snapshot(&db, &RunOptions::new(today, &SnapshotSettings::default()))
        .await
        .unwrap();

    assert_eq!(report.projects.len(), 1);
    let project = &report.projects[0];
    assert_eq!(project.outcome, ProjectOutcome::Created);
    assert_eq!(
        project.counts,
        Some(StatusCounts {
            completed: 1,
            in_progress: 0,
            failed: 1,
            not_started: 1,
            delayed: 1,
            total: 3,
        })
    );

    let history = snapshot_history(&db, "P", None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].week_end_date, date(2024, 6, 2));
    assert_eq!(Some(history[0].counts), project.counts);
}

#[tokio::test]
async fn test_lone_in_progress_interface() {
    let db = Database::in_memory().await.unwrap();
    {
        let mut conn = db.pool().acquire().await.unwrap();
        let mut repo = ProjectRepository::new(&mut conn);
        let project = repo.create("solo").await.unwrap();
        repo.add_interface(project.id, "Prices", DeclaredStatus::InProgress)
            .await
            .unwrap();
    }

    let report = take_weekly_snapshot(
        &db,
        &RunOptions::new(date(2024, 6, 5), &SnapshotSettings::default()),
    )
    .await
    .unwrap();

    let counts = report.projects[0].counts.unwrap();
    assert_eq!(counts.in_progress, 1);
    assert_eq!(counts.delayed, 0);
    assert_eq!(counts.total, 1);
}

#[tokio::test]
async fn test_rerun_is_idempotent_and_reflects_latest_state() {
    let db = Database::in_memory().await.unwrap();
    let today = date(2024, 6, 5);
    seed_reference_project(&db, today).await;
    let settings = SnapshotSettings::default();

    take_weekly_snapshot(&db, &RunOptions::new(today, &settings))
        .await
        .unwrap();

    // C's pending task gets finished before the second run
    sqlx::query("UPDATE project_schedule_tasks SET status = 'Concluído' WHERE interface_name = 'C'")
        .execute(db.pool())
        .await
        .unwrap();

    let later = date(2024, 6, 8);
    let report = take_weekly_snapshot(&db, &RunOptions::new(later, &settings))
        .await
        .unwrap();
    assert_eq!(report.projects[0].outcome, ProjectOutcome::Updated);

    let history = snapshot_history(&db, "P", None).await.unwrap();
    assert_eq!(history.len(), 1, "Same week must never produce a second row");
    let counts = history[0].counts;
    assert_eq!(counts.completed, 2);
    assert_eq!(counts.failed, 0);
    assert_eq!(counts.not_started, 1);
    assert_eq!(counts.delayed, 0);
    assert_eq!(
        counts.completed + counts.in_progress + counts.failed + counts.not_started,
        counts.total
    );
}

#[tokio::test]
async fn test_unrecognized_upload_status_does_not_abort_run() {
    let db = Database::in_memory().await.unwrap();
    let today = date(2024, 6, 5);
    seed_reference_project(&db, today).await;

    // The uploader logs a status this crate has no name for; it supersedes C's error
    sqlx::query(
        "INSERT INTO upload_history (filename, uploaded_at, status, project_name, interface_name) \
         VALUES ('c.csv', '2024-06-04 09:00:00', 'Warning', 'P', 'C')",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let report = take_weekly_snapshot(&db, &RunOptions::new(today, &SnapshotSettings::default()))
        .await
        .unwrap();

    let counts = report.projects[0].counts.unwrap();
    assert_eq!(counts.failed, 0);
    assert_eq!(counts.in_progress, 1);
    assert_eq!(counts.delayed, 1);
    assert_eq!(counts.total, 3);
}

#[tokio::test]
async fn test_report_serializes_for_cli_output() {
    let db = Database::in_memory().await.unwrap();
    let today = date(2024, 6, 5);
    seed_reference_project(&db, today).await;

    let report = take_weekly_snapshot(
        &db,
        &RunOptions::new(today, &SnapshotSettings::default()).dry_run(true),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["week_end_date"], "2024-06-02");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["projects"][0]["outcome"], "created");
    assert_eq!(json["projects"][0]["counts"]["failed"], 1);

    assert!(snapshot_history(&db, "P", None).await.unwrap().is_empty());
}
