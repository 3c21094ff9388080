//! Database migrations
//!
//! This module manages SQLite schema migrations for progress-snapshot.
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Project tracking schema
const MIGRATION_V1: &str = r#"
    -- Projects table
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_name TEXT NOT NULL UNIQUE
    );

    CREATE INDEX IF NOT EXISTS idx_projects_name ON projects(project_name);

    -- Declared status per interface
    CREATE TABLE IF NOT EXISTS project_interface_status (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        interface_name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Not Started' CHECK (status IN (
            'Not Started',
            'In Progress',
            'Failed validation',
            'Completed and awaiting upload in RELEX system',
            'Completed and uploaded'
        )),
        UNIQUE (project_id, interface_name)
    );

    CREATE INDEX IF NOT EXISTS idx_interface_status_project_id ON project_interface_status(project_id);

    -- File upload log (keyed by names, not ids)
    CREATE TABLE IF NOT EXISTS upload_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        uploaded_at TIMESTAMP,
        status TEXT NOT NULL,
        project_name TEXT,
        interface_name TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_upload_history_project ON upload_history(project_name, interface_name);

    -- Scheduled sub-tasks per interface
    CREATE TABLE IF NOT EXISTS project_schedule_tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        interface_name TEXT NOT NULL,
        task_name TEXT NOT NULL,
        end_date DATE,
        status TEXT NOT NULL DEFAULT 'Pendente' CHECK (status IN ('Pendente', 'Em Andamento', 'Concluído'))
    );

    CREATE INDEX IF NOT EXISTS idx_schedule_tasks_project_id ON project_schedule_tasks(project_id);
"#;

/// Migration 2: Weekly progress snapshots
const MIGRATION_V2: &str = r#"
    CREATE TABLE IF NOT EXISTS weekly_progress_snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        week_end_date DATE NOT NULL,
        completed_count INTEGER NOT NULL DEFAULT 0,
        in_progress_count INTEGER NOT NULL DEFAULT 0,
        failed_count INTEGER NOT NULL DEFAULT 0,
        delayed_count INTEGER NOT NULL DEFAULT 0,
        not_started_count INTEGER NOT NULL DEFAULT 0,
        total_interfaces INTEGER NOT NULL DEFAULT 0,
        CONSTRAINT _project_week_snapshot_uc UNIQUE (project_id, week_end_date)
    );

    CREATE INDEX IF NOT EXISTS idx_snapshots_project_week ON weekly_progress_snapshots(project_id, week_end_date);
"#;

/// Get the current schema version from the database
///
/// Read-only: a store that has never been migrated reports version 0.
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    let (tracked,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok(0);
    }

    let row: Option<(Option<i32>,)> = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(row.and_then(|(v,)| v).unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    if current_version < 1 {
        tracing::info!("Applying migration v1: Project tracking schema");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Weekly progress snapshots");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
