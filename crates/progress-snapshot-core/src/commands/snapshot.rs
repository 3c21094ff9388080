//! Weekly snapshot run
//!
//! Classifies every interface of every project and upserts one snapshot row per project
//! for the week-ending date. All reads and writes share one transaction: the run either
//! commits every project's snapshot or none of them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{error, info, warn};

use crate::config::SnapshotSettings;
use crate::domain::projects::{Project, ProjectRepository};
use crate::domain::snapshot::{
    tally_interfaces, SnapshotRepository, StatusCounts, UpsertOutcome, WeekEndPolicy,
};
use crate::error::{Error, Result};
use crate::storage::Database;

/// Options for a single snapshot run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Date the run is evaluated against; also drives the delayed check
    pub run_date: NaiveDate,
    pub policy: WeekEndPolicy,
    /// Only write snapshots when `run_date` falls on the week-end day
    pub only_on_week_end_day: bool,
    /// Roll back instead of committing
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(run_date: NaiveDate, settings: &SnapshotSettings) -> Self {
        Self {
            run_date,
            policy: WeekEndPolicy::from_settings(settings),
            only_on_week_end_day: settings.only_on_week_end_day,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What happened to one project during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectOutcome {
    Created,
    Updated,
    /// Project has no interfaces; no snapshot written
    Skipped,
}

impl From<UpsertOutcome> for ProjectOutcome {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created => ProjectOutcome::Created,
            UpsertOutcome::Updated => ProjectOutcome::Updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub project_id: i64,
    pub project_name: String,
    pub outcome: ProjectOutcome,
    pub counts: Option<StatusCounts>,
}

/// Summary of a snapshot run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub dry_run: bool,
    /// Set when the run was skipped because today isn't the week-end day
    pub not_week_end_day: bool,
    pub projects: Vec<ProjectReport>,
}

impl RunReport {
    fn new(options: &RunOptions) -> Self {
        Self {
            run_date: options.run_date,
            week_end_date: options.policy.week_ending(options.run_date),
            dry_run: options.dry_run,
            not_week_end_day: false,
            projects: Vec::new(),
        }
    }

    /// Number of snapshot rows written (or that would have been, for a dry run)
    pub fn written(&self) -> usize {
        self.projects
            .iter()
            .filter(|p| p.outcome != ProjectOutcome::Skipped)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.projects.len() - self.written()
    }
}

/// Take the weekly snapshot for every project
pub async fn take_weekly_snapshot(db: &Database, options: &RunOptions) -> Result<RunReport> {
    let mut report = RunReport::new(options);

    if options.only_on_week_end_day && !options.policy.is_week_end_day(options.run_date) {
        info!(
            run_date = %options.run_date,
            week_end_day = %options.policy.week_end_day(),
            "Today is not snapshot day, nothing to do"
        );
        report.not_week_end_day = true;
        return Ok(report);
    }

    info!(
        run_date = %report.run_date,
        week_end_date = %report.week_end_date,
        dry_run = options.dry_run,
        "Starting weekly snapshot run"
    );

    let mut tx = db.begin().await?;

    match snapshot_all_projects(&mut tx, options, &mut report).await {
        Ok(()) if options.dry_run => {
            tx.rollback().await?;
            info!(
                snapshots = report.written(),
                skipped = report.skipped(),
                "Dry run finished, changes rolled back"
            );
            Ok(report)
        }
        Ok(()) => {
            tx.commit().await?;
            info!(
                snapshots = report.written(),
                skipped = report.skipped(),
                "Weekly snapshots completed for all projects"
            );
            Ok(report)
        }
        Err(err) => {
            error!(error = %err, code = err.code(), "Snapshot run failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed; transaction dropped");
            }
            Err(Error::RunAborted(Box::new(err)))
        }
    }
}

async fn snapshot_all_projects(
    conn: &mut SqliteConnection,
    options: &RunOptions,
    report: &mut RunReport,
) -> Result<()> {
    let projects = ProjectRepository::new(conn).list().await?;

    for project in projects {
        let entry = snapshot_project(conn, &project, options.run_date, report.week_end_date).await?;
        report.projects.push(entry);
    }

    Ok(())
}

async fn snapshot_project(
    conn: &mut SqliteConnection,
    project: &Project,
    run_date: NaiveDate,
    week_end_date: NaiveDate,
) -> Result<ProjectReport> {
    info!(project = %project.name, "Processing snapshot for project");

    let mut projects = ProjectRepository::new(conn);
    let interfaces = projects.list_interfaces(project.id).await?;

    if interfaces.is_empty() {
        info!(project = %project.name, "Project has no interfaces to snapshot, skipping");
        return Ok(ProjectReport {
            project_id: project.id,
            project_name: project.name.clone(),
            outcome: ProjectOutcome::Skipped,
            counts: None,
        });
    }

    let tasks = projects.list_tasks(project.id).await?;
    let uploads = projects.list_uploads(&project.name).await?;

    let counts = tally_interfaces(&interfaces, &tasks, &uploads, run_date);
    debug_assert_eq!(counts.primary_sum(), counts.total);

    let (snapshot, outcome) = SnapshotRepository::new(conn)
        .upsert(project.id, week_end_date, &counts)
        .await?;

    info!(
        project = %project.name,
        snapshot_id = snapshot.id,
        total = counts.total,
        completed = counts.completed,
        failed = counts.failed,
        delayed = counts.delayed,
        ?outcome,
        "Snapshot saved"
    );

    Ok(ProjectReport {
        project_id: project.id,
        project_name: project.name.clone(),
        outcome: outcome.into(),
        counts: Some(counts),
    })
}
