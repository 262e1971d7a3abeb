//! The domain-level provider contract that hypervisor backends
//! implement. Kept free of protobuf types so a backend (and its tests) never
//! depends on the wire format — `service::GrpcProviderService` is the only
//! thing that knows about `pb`.

use async_trait::async_trait;

use crate::resilience::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerOp {
    On,
    Off,
    Reboot,
    ShutdownGraceful,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateOutcome {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub supported_operations: Vec<String>,
    pub supported_disk_types: Vec<String>,
    pub supported_network_types: Vec<String>,
    pub supports_graceful_shutdown: bool,
    pub supports_memory_snapshots: bool,
    pub supports_linked_clone: bool,
}

#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub name: String,
    pub class_json: String,
    pub image_json: String,
    pub networks_json: String,
    pub disks_json: String,
    pub user_data: Vec<u8>,
    pub placement_json: String,
    /// `"On"`, `"Off"`, or empty.
    pub desired_power_state: String,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOutcome {
    pub id: String,
    pub task_ref: String,
}

/// The common shape for mutating operations that only ever return a task
/// reference (Delete, Power, Reconfigure, SnapshotDelete, SnapshotRevert,
/// ImagePrepare). An empty `task_ref` means the operation already completed
/// synchronously.
#[derive(Debug, Clone, Default)]
pub struct TaskOutcome {
    pub task_ref: String,
}

#[derive(Debug, Clone, Default)]
pub struct DescribeOutcome {
    pub exists: bool,
    /// `"On"`, `"Off"`, or empty — never a hypervisor-native string.
    pub power_state: String,
    pub ips: Vec<String>,
    pub console_url: String,
    pub provider_raw_json: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaskStatusOutcome {
    pub done: bool,
    pub error: String,
    pub progress_percent: i32,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotCreateOutcome {
    pub snapshot_id: String,
    pub task_ref: String,
}

#[derive(Debug, Clone)]
pub struct CloneArgs {
    pub source_id: String,
    pub target_name: String,
    pub clone_type: String,
    pub power_on: bool,
    pub customization_json: String,
}

#[derive(Debug, Clone, Default)]
pub struct CloneOutcome {
    pub id: String,
    pub task_ref: String,
}

/// Every hypervisor backend implements this. The vSphere
/// backend (`vsphere::provider::VsphereProvider`) is the only concrete
/// implementation in this crate.
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    async fn validate(&self) -> Result<ValidateOutcome>;
    async fn get_capabilities(&self) -> Result<Capabilities>;
    async fn create(&self, args: CreateArgs) -> Result<CreateOutcome>;
    async fn delete(&self, id: &str) -> Result<TaskOutcome>;
    async fn power(&self, id: &str, op: PowerOp, graceful_timeout_seconds: u32) -> Result<TaskOutcome>;
    async fn reconfigure(&self, id: &str, desired_class_json: &str, disk_changes_json: &str) -> Result<TaskOutcome>;
    async fn describe(&self, id: &str) -> Result<DescribeOutcome>;
    async fn task_status(&self, task_ref: &str) -> Result<TaskStatusOutcome>;
    async fn snapshot_create(
        &self,
        id: &str,
        name_hint: &str,
        description: &str,
        include_memory: bool,
    ) -> Result<SnapshotCreateOutcome>;
    async fn snapshot_delete(&self, snapshot_id: &str) -> Result<TaskOutcome>;
    async fn snapshot_revert(&self, id: &str, snapshot_id: &str) -> Result<TaskOutcome>;
    async fn clone(&self, args: CloneArgs) -> Result<CloneOutcome>;
    async fn image_prepare(&self, image_json: &str) -> Result<TaskOutcome>;
}

#[async_trait]
impl<T: ProviderBackend + ?Sized> ProviderBackend for std::sync::Arc<T> {
    async fn validate(&self) -> Result<ValidateOutcome> {
        T::validate(self).await
    }
    async fn get_capabilities(&self) -> Result<Capabilities> {
        T::get_capabilities(self).await
    }
    async fn create(&self, args: CreateArgs) -> Result<CreateOutcome> {
        T::create(self, args).await
    }
    async fn delete(&self, id: &str) -> Result<TaskOutcome> {
        T::delete(self, id).await
    }
    async fn power(&self, id: &str, op: PowerOp, graceful_timeout_seconds: u32) -> Result<TaskOutcome> {
        T::power(self, id, op, graceful_timeout_seconds).await
    }
    async fn reconfigure(&self, id: &str, desired_class_json: &str, disk_changes_json: &str) -> Result<TaskOutcome> {
        T::reconfigure(self, id, desired_class_json, disk_changes_json).await
    }
    async fn describe(&self, id: &str) -> Result<DescribeOutcome> {
        T::describe(self, id).await
    }
    async fn task_status(&self, task_ref: &str) -> Result<TaskStatusOutcome> {
        T::task_status(self, task_ref).await
    }
    async fn snapshot_create(
        &self,
        id: &str,
        name_hint: &str,
        description: &str,
        include_memory: bool,
    ) -> Result<SnapshotCreateOutcome> {
        T::snapshot_create(self, id, name_hint, description, include_memory).await
    }
    async fn snapshot_delete(&self, snapshot_id: &str) -> Result<TaskOutcome> {
        T::snapshot_delete(self, snapshot_id).await
    }
    async fn snapshot_revert(&self, id: &str, snapshot_id: &str) -> Result<TaskOutcome> {
        T::snapshot_revert(self, id, snapshot_id).await
    }
    async fn clone(&self, args: CloneArgs) -> Result<CloneOutcome> {
        T::clone(self, args).await
    }
    async fn image_prepare(&self, image_json: &str) -> Result<TaskOutcome> {
        T::image_prepare(self, image_json).await
    }
}
