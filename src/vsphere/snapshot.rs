//! Snapshot orchestration: create, delete, revert.

use tracing::warn;

use crate::resilience::Result;
use crate::rpc::backend::{SnapshotCreateOutcome, TaskOutcome};

use super::client::{HypervisorClient, MoRef};

pub async fn create(
    client: &dyn HypervisorClient,
    vm: &MoRef,
    name_hint: &str,
    description: &str,
    include_memory: bool,
) -> Result<SnapshotCreateOutcome> {
    let (snapshot_id, task) = client
        .create_snapshot(vm, name_hint, description, include_memory)
        .await?;
    Ok(SnapshotCreateOutcome {
        snapshot_id,
        task_ref: task.task_ref().to_string(),
    })
}

pub async fn delete(client: &dyn HypervisorClient, snapshot_id: &str) -> Result<TaskOutcome> {
    let task = client.remove_snapshot(snapshot_id).await?;
    Ok(TaskOutcome { task_ref: task.task_ref().to_string() })
}

/// VM typically must be powered off for a revert to take effect cleanly
///; the provider does not enforce that here — it is a
/// vSphere-side precondition surfaced through the task's error on failure.
pub async fn revert(client: &dyn HypervisorClient, vm: &MoRef, snapshot_id: &str) -> Result<TaskOutcome> {
    let task = client.revert_snapshot(vm, snapshot_id).await.map_err(|e| {
        warn!(vm = %vm.id(), snapshot_id, error = %e, "snapshot revert failed");
        e
    })?;
    Ok(TaskOutcome { task_ref: task.task_ref().to_string() })
}
