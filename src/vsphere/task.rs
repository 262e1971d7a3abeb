//! Async task status mapping.

use crate::resilience::Result;
use crate::rpc::backend::TaskStatusOutcome;

use super::client::{HypervisorClient, TaskHandle, TaskInfo, TaskState};

/// Maps a vSphere task info onto the wire `TaskStatus` response: `success` ->
/// done with no error; `error` -> done with the task's localized message;
/// `running`/`queued` -> not done. Any other state is surfaced as a
/// retryable error rather than silently treated as done.
pub fn project(info: &TaskInfo) -> TaskStatusOutcome {
    match info.state {
        TaskState::Success => TaskStatusOutcome {
            done: true,
            error: String::new(),
            progress_percent: info.progress_percent.unwrap_or(100),
        },
        TaskState::Error => TaskStatusOutcome {
            done: true,
            error: info.error_message.clone().unwrap_or_default(),
            progress_percent: info.progress_percent.unwrap_or(0),
        },
        TaskState::Running | TaskState::Queued => TaskStatusOutcome {
            done: false,
            error: String::new(),
            progress_percent: info.progress_percent.unwrap_or(0),
        },
    }
}

pub async fn status(client: &dyn HypervisorClient, task_ref: &str) -> Result<TaskStatusOutcome> {
    let handle = TaskHandle(super::client::MoRef::new("Task", task_ref));
    let info = client.task_info(&handle).await?;
    Ok(project(&info))
}

/// Extracts the resulting managed reference when a clone task completes
///.
pub async fn vm_from_completed_task(
    client: &dyn HypervisorClient,
    task: &TaskHandle,
) -> Result<Option<super::client::MoRef>> {
    let info = client.task_info(task).await?;
    Ok(match info.state {
        TaskState::Success => info.result,
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_to_done_with_no_error() {
        let outcome = project(&TaskInfo {
            state: TaskState::Success,
            error_message: None,
            progress_percent: Some(100),
            result: None,
        });
        assert!(outcome.done);
        assert_eq!(outcome.error, "");
    }

    #[test]
    fn error_maps_to_done_with_localized_message() {
        let outcome = project(&TaskInfo {
            state: TaskState::Error,
            error_message: Some("disk full".to_string()),
            progress_percent: None,
            result: None,
        });
        assert!(outcome.done);
        assert_eq!(outcome.error, "disk full");
    }

    #[test]
    fn running_and_queued_are_not_done() {
        for state in [TaskState::Running, TaskState::Queued] {
            let outcome = project(&TaskInfo {
                state,
                error_message: None,
                progress_percent: Some(40),
                result: None,
            });
            assert!(!outcome.done);
        }
    }
}
