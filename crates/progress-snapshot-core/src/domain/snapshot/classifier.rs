//! Interface status classification
//!
//! Merges three signals per interface (declared status, sub-task completion and the
//! latest upload outcome) into one primary category plus the delayed overlay.
//!
//! Precedence, first match wins:
//!
//! 1. Completed: at least one sub-task and all of them done
//! 2. Failed: latest upload for the interface ended in `Error`
//! 3. Not Started: declared status is `Not Started`
//! 4. In Progress: everything else
//!
//! Delayed is set when the interface is not completed and its first unfinished sub-task,
//! in pipeline order, was due before today.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::entity::{Classification, StatusCategory, StatusCounts};
use crate::domain::projects::{DeclaredStatus, InterfaceStatus, ScheduleTask, UploadRecord};

/// Group tasks by interface name and order each group by pipeline sequence
///
/// The sort is stable, so tasks sharing a slot (unknown names) keep their input order.
pub fn tasks_by_interface(tasks: &[ScheduleTask]) -> HashMap<&str, Vec<&ScheduleTask>> {
    let mut grouped: HashMap<&str, Vec<&ScheduleTask>> = HashMap::new();
    for task in tasks {
        grouped
            .entry(task.interface_name.as_str())
            .or_default()
            .push(task);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|task| task.task_name.sequence());
    }
    grouped
}

/// Most recent upload per interface
///
/// Newest `uploaded_at` wins; records without a timestamp count as oldest, and equal
/// timestamps fall back to the highest id.
pub fn latest_uploads(uploads: &[UploadRecord]) -> HashMap<&str, &UploadRecord> {
    let mut latest: HashMap<&str, &UploadRecord> = HashMap::new();
    for upload in uploads {
        let Some(interface) = upload.interface_name.as_deref() else {
            continue;
        };
        latest
            .entry(interface)
            .and_modify(|current| {
                if (upload.uploaded_at, upload.id) > (current.uploaded_at, current.id) {
                    *current = upload;
                }
            })
            .or_insert(upload);
    }
    latest
}

/// Classify a single interface
///
/// `tasks` must already be in pipeline order (see [`tasks_by_interface`]).
pub fn classify_interface(
    interface: &InterfaceStatus,
    tasks: &[&ScheduleTask],
    latest_upload: Option<&UploadRecord>,
    today: NaiveDate,
) -> Classification {
    let all_done = !tasks.is_empty() && tasks.iter().all(|task| task.status.is_done());

    let category = if all_done {
        StatusCategory::Completed
    } else if latest_upload.is_some_and(|upload| upload.status.is_error()) {
        StatusCategory::Failed
    } else if interface.status == DeclaredStatus::NotStarted {
        StatusCategory::NotStarted
    } else {
        StatusCategory::InProgress
    };

    let delayed = !all_done
        && tasks
            .iter()
            .find(|task| !task.status.is_done())
            .and_then(|task| task.end_date)
            .is_some_and(|due| due < today);

    Classification { category, delayed }
}

/// Classify every interface of a project and tally the results
pub fn tally_interfaces(
    interfaces: &[InterfaceStatus],
    tasks: &[ScheduleTask],
    uploads: &[UploadRecord],
    today: NaiveDate,
) -> StatusCounts {
    let grouped = tasks_by_interface(tasks);
    let latest = latest_uploads(uploads);

    let mut counts = StatusCounts::default();
    for interface in interfaces {
        let name = interface.interface_name.as_str();
        let interface_tasks = grouped.get(name).map(Vec::as_slice).unwrap_or(&[]);
        let classification =
            classify_interface(interface, interface_tasks, latest.get(name).copied(), today);

        tracing::debug!(
            interface = name,
            category = classification.category.as_str(),
            delayed = classification.delayed,
            "Classified interface"
        );
        counts.record(classification);
    }
    counts
}
