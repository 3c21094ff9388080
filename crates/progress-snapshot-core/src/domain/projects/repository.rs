//! Project repository for database operations
//!
//! Reads projects, interface statuses, schedule tasks and upload history. The repository
//! borrows a connection so the snapshot run can route every query through its transaction.

use super::entity::{
    DeclaredStatus, InterfaceStatus, Project, ScheduleTask, TaskName, TaskStatus, UploadOutcome,
    UploadRecord,
};
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqliteConnection;

/// Repository for project tracking data
pub struct ProjectRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ProjectRepository<'c> {
    /// Create a new repository on the given connection (or transaction)
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    // ========== Projects ==========

    /// List all projects ordered by id
    pub async fn list(&mut self) -> Result<Vec<Project>> {
        let rows: Vec<ProjectRow> =
            sqlx::query_as("SELECT id, project_name FROM projects ORDER BY id")
                .fetch_all(&mut *self.conn)
                .await?;

        Ok(rows.into_iter().map(ProjectRow::into_project).collect())
    }

    /// Get a project by its unique name
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<Project>> {
        let row: Option<ProjectRow> =
            sqlx::query_as("SELECT id, project_name FROM projects WHERE project_name = ?")
                .bind(name)
                .fetch_optional(&mut *self.conn)
                .await?;

        Ok(row.map(ProjectRow::into_project))
    }

    /// Create a project
    pub async fn create(&mut self, name: &str) -> Result<Project> {
        let result = sqlx::query("INSERT INTO projects (project_name) VALUES (?)")
            .bind(name)
            .execute(&mut *self.conn)
            .await?;

        Ok(Project {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    // ========== Interfaces ==========

    /// List declared interface statuses for a project
    pub async fn list_interfaces(&mut self, project_id: i64) -> Result<Vec<InterfaceStatus>> {
        let rows: Vec<InterfaceStatusRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, interface_name, status
            FROM project_interface_status
            WHERE project_id = ?
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(InterfaceStatusRow::into_interface).collect()
    }

    /// Declare an interface for a project
    pub async fn add_interface(
        &mut self,
        project_id: i64,
        interface_name: &str,
        status: DeclaredStatus,
    ) -> Result<InterfaceStatus> {
        let result = sqlx::query(
            "INSERT INTO project_interface_status (project_id, interface_name, status) VALUES (?, ?, ?)",
        )
        .bind(project_id)
        .bind(interface_name)
        .bind(status.as_str())
        .execute(&mut *self.conn)
        .await?;

        Ok(InterfaceStatus {
            id: result.last_insert_rowid(),
            project_id,
            interface_name: interface_name.to_string(),
            status,
        })
    }

    // ========== Schedule tasks ==========

    /// List all schedule tasks for a project in insertion order
    pub async fn list_tasks(&mut self, project_id: i64) -> Result<Vec<ScheduleTask>> {
        let rows: Vec<ScheduleTaskRow> = sqlx::query_as(
            r#"
            SELECT id, project_id, interface_name, task_name, end_date, status
            FROM project_schedule_tasks
            WHERE project_id = ?
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(ScheduleTaskRow::into_task).collect()
    }

    /// Schedule a sub-task for an interface
    pub async fn add_task(
        &mut self,
        project_id: i64,
        interface_name: &str,
        task_name: TaskName,
        status: TaskStatus,
        end_date: Option<NaiveDate>,
    ) -> Result<ScheduleTask> {
        let result = sqlx::query(
            r#"
            INSERT INTO project_schedule_tasks (project_id, interface_name, task_name, end_date, status)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(interface_name)
        .bind(task_name.as_str())
        .bind(end_date)
        .bind(status.as_str())
        .execute(&mut *self.conn)
        .await?;

        Ok(ScheduleTask {
            id: result.last_insert_rowid(),
            project_id,
            interface_name: interface_name.to_string(),
            task_name,
            status,
            end_date,
        })
    }

    // ========== Upload history ==========

    /// List upload history for a project name, oldest first
    pub async fn list_uploads(&mut self, project_name: &str) -> Result<Vec<UploadRecord>> {
        let rows: Vec<UploadRow> = sqlx::query_as(
            r#"
            SELECT id, filename, uploaded_at, status, project_name, interface_name
            FROM upload_history
            WHERE project_name = ?
            ORDER BY uploaded_at ASC, id ASC
            "#,
        )
        .bind(project_name)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows.into_iter().map(UploadRow::into_record).collect())
    }

    /// Append an entry to the upload log
    pub async fn record_upload(
        &mut self,
        project_name: &str,
        interface_name: &str,
        filename: &str,
        status: UploadOutcome,
        uploaded_at: Option<NaiveDateTime>,
    ) -> Result<UploadRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO upload_history (filename, uploaded_at, status, project_name, interface_name)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(filename)
        .bind(uploaded_at)
        .bind(status.as_str())
        .bind(project_name)
        .bind(interface_name)
        .execute(&mut *self.conn)
        .await?;

        Ok(UploadRecord {
            id: result.last_insert_rowid(),
            project_name: Some(project_name.to_string()),
            interface_name: Some(interface_name.to_string()),
            filename: filename.to_string(),
            status,
            uploaded_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    project_name: String,
}

impl ProjectRow {
    fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.project_name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct InterfaceStatusRow {
    id: i64,
    project_id: i64,
    interface_name: String,
    status: String,
}

impl InterfaceStatusRow {
    fn into_interface(self) -> Result<InterfaceStatus> {
        let status = DeclaredStatus::parse(&self.status)
            .ok_or_else(|| Error::invalid_value("project_interface_status", "status", &self.status))?;

        Ok(InterfaceStatus {
            id: self.id,
            project_id: self.project_id,
            interface_name: self.interface_name,
            status,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ScheduleTaskRow {
    id: i64,
    project_id: i64,
    interface_name: String,
    task_name: String,
    end_date: Option<NaiveDate>,
    status: String,
}

impl ScheduleTaskRow {
    fn into_task(self) -> Result<ScheduleTask> {
        let status = TaskStatus::parse(&self.status)
            .ok_or_else(|| Error::invalid_value("project_schedule_tasks", "status", &self.status))?;

        Ok(ScheduleTask {
            id: self.id,
            project_id: self.project_id,
            interface_name: self.interface_name,
            task_name: TaskName::parse(&self.task_name),
            status,
            end_date: self.end_date,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UploadRow {
    id: i64,
    filename: String,
    uploaded_at: Option<NaiveDateTime>,
    status: String,
    project_name: Option<String>,
    interface_name: Option<String>,
}

impl UploadRow {
    fn into_record(self) -> UploadRecord {
        UploadRecord {
            id: self.id,
            project_name: self.project_name,
            interface_name: self.interface_name,
            filename: self.filename,
            status: UploadOutcome::parse(&self.status),
            uploaded_at: self.uploaded_at,
        }
    }
}
