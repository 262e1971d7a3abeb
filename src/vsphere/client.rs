//! The domain-level seam between the rest of the `vsphere` module and the
//! SOAP transport. [`soap::SoapHypervisorClient`]
//! is the real implementation; tests substitute a scripted stub.

use async_trait::async_trait;

use crate::resilience::Result;

use super::clone_spec::CloneSpec;

/// A vSphere managed object reference: a type name plus an opaque value
/// (e.g. `type="VirtualMachine", value="vm-104"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoRef {
    pub type_: String,
    pub value: String,
}

impl MoRef {
    pub fn new(type_: impl Into<String>, value: impl Into<String>) -> Self {
        MoRef {
            type_: type_.into(),
            value: value.into(),
        }
    }

    /// The durable VM ID returned to the controller is the bare MoRef value
    ///.
    pub fn id(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle(pub MoRef);

impl TaskHandle {
    /// The string the controller polls back with:
    /// `taskRef = task.Reference().Value`.
    pub fn task_ref(&self) -> &str {
        &self.0.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Success,
    Error,
    Running,
    Queued,
}

#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub state: TaskState,
    pub error_message: Option<String>,
    pub progress_percent: Option<i32>,
    /// The object the task operated on, when the task created one (clone).
    pub result: Option<MoRef>,
}

#[derive(Debug, Clone, Default)]
pub struct GuestNic {
    pub ip_addresses: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VmSummary {
    pub power_state: String,
    pub connection_state: String,
    pub guest_tools_status: String,
    pub guest_tools_version: String,
    pub hostname: String,
    pub guest_full_name: String,
    pub nics: Vec<GuestNic>,
    pub num_cpu: i32,
    pub memory_mb: i32,
    pub overall_cpu_usage_mhz: i32,
    pub guest_memory_usage_mb: i32,
    pub uptime_seconds: i64,
    pub boot_time: Option<String>,
}

/// Everything the rest of this module needs from a vSphere endpoint. One
/// logical session per process.
#[async_trait]
pub trait HypervisorClient: Send + Sync {
    /// Re-establishes the session if expired or absent. Safe under
    /// concurrent callers.
    async fn ensure_connection(&self) -> Result<()>;

    /// A lightweight reachability probe used by `Validate`.
    async fn current_time(&self) -> Result<String>;

    async fn find_datacenter(&self, name: Option<&str>) -> Result<MoRef>;
    async fn find_vm_by_name(&self, datacenter: &MoRef, name: &str) -> Result<MoRef>;
    async fn find_cluster(&self, datacenter: &MoRef, name: &str) -> Result<MoRef>;
    async fn find_resource_pool_of_cluster(&self, cluster: &MoRef) -> Result<MoRef>;
    async fn find_datastore(&self, datacenter: &MoRef, name: &str) -> Result<MoRef>;
    /// `None` falls back to the datacenter's default VM folder.
    async fn find_folder(&self, datacenter: &MoRef, name: Option<&str>) -> Result<MoRef>;
    async fn find_network(&self, datacenter: &MoRef, name: &str) -> Result<MoRef>;

    async fn clone_vm(
        &self,
        template: &MoRef,
        folder: &MoRef,
        name: &str,
        spec: CloneSpec,
    ) -> Result<TaskHandle>;

    async fn power_on(&self, vm: &MoRef) -> Result<TaskHandle>;
    async fn power_off(&self, vm: &MoRef) -> Result<TaskHandle>;
    async fn reboot_guest(&self, vm: &MoRef) -> Result<()>;
    async fn shutdown_guest(&self, vm: &MoRef) -> Result<()>;
    async fn reconfigure(&self, vm: &MoRef, spec: CloneSpec) -> Result<TaskHandle>;
    async fn destroy(&self, vm: &MoRef) -> Result<TaskHandle>;

    async fn power_state_raw(&self, vm: &MoRef) -> Result<String>;
    async fn guest_tools_status(&self, vm: &MoRef) -> Result<String>;
    async fn summary(&self, vm: &MoRef) -> Result<VmSummary>;

    async fn task_info(&self, task: &TaskHandle) -> Result<TaskInfo>;

    async fn create_snapshot(
        &self,
        vm: &MoRef,
        name_hint: &str,
        description: &str,
        include_memory: bool,
    ) -> Result<(String, TaskHandle)>;
    async fn remove_snapshot(&self, snapshot_id: &str) -> Result<TaskHandle>;
    async fn revert_snapshot(&self, vm: &MoRef, snapshot_id: &str) -> Result<TaskHandle>;
}
