//! `VirtualMachine` custom resource plus its renamed/re-typed/widened fields.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::conditions::Condition;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum DesiredPowerState {
    On,
    Off,
    OffGraceful,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum ExpandPolicy {
    Online,
    Offline,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum VmPhase {
    Pending,
    Creating,
    Running,
    Stopped,
    Updating,
    Deleting,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_pool: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GpuOverride {
    pub count: i32,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignition: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleHooks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_stop_exec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graceful_shutdown_timeout_seconds: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOperation {
    pub revert_to_ref: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStatusEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    #[serde(default)]
    pub has_memory: bool,
}

pub mod v1beta1 {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct NetworkEntry {
        pub attachment_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ip_address: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub mac: Option<String>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct DiskEntry {
        pub name: String,
        pub size: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub r#type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub expand_policy: Option<ExpandPolicy>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub storage_class: Option<String>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct ResourceOverrides {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cpus: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub memory: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub gpu: Option<GpuOverride>,
    }

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "VirtualMachine",
        namespaced,
        status = "VirtualMachineStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VirtualMachineSpec {
        pub provider_ref: String,
        pub class_ref: String,
        pub image_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub placement_ref: Option<String>,
        #[serde(default)]
        pub networks: Vec<NetworkEntry>,
        #[serde(default)]
        pub disks: Vec<DiskEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub user_data: Option<UserData>,
        #[serde(default)]
        pub placement: PlacementHints,
        #[serde(default)]
        pub resources: ResourceOverrides,
        pub power_state: DesiredPowerState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub snapshot_operation: Option<SnapshotOperation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub lifecycle: Option<LifecycleHooks>,
        /// `v1alpha1`'s `tags[]` has no beta-native counterpart; it is
        /// folded entirely into `labels{}` on conversion rather than
        /// carried as a second, redundant lane.
        #[serde(default)]
        pub labels: HashMap<String, serde_json::Value>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct VirtualMachineStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub provider_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub power_state: Option<String>,
        #[serde(default)]
        pub ips: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub console_url: Option<String>,
        #[serde(default)]
        pub conditions: Vec<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub last_task_ref: Option<String>,
        #[serde(default)]
        pub current_resources: ResourceOverrides,
        #[serde(default)]
        pub snapshots: Vec<SnapshotStatusEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub phase: Option<VmPhase>,
        #[serde(default)]
        pub observed_generation: i64,
    }
}

pub mod v1alpha1 {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct NetworkEntry {
        pub attachment_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub static_ip: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub mac: Option<String>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct DiskEntry {
        pub name: String,
        pub size_gi_b: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub r#type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub expand_policy: Option<ExpandPolicy>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub storage_class: Option<String>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct ResourceOverrides {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub cpus: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub memory_mi_b: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub gpu: Option<GpuOverride>,
    }

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "VirtualMachine",
        namespaced,
        status = "VirtualMachineStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VirtualMachineSpec {
        pub provider_ref: String,
        pub class_ref: String,
        pub image_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub placement_ref: Option<String>,
        #[serde(default)]
        pub networks: Vec<NetworkEntry>,
        #[serde(default)]
        pub disks: Vec<DiskEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub user_data: Option<UserData>,
        #[serde(default)]
        pub placement: PlacementHints,
        #[serde(default)]
        pub resources: ResourceOverrides,
        pub power_state: DesiredPowerState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub snapshot_operation: Option<SnapshotOperation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub lifecycle: Option<LifecycleHooks>,
        #[serde(default)]
        pub tags: Vec<String>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct VirtualMachineStatus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub provider_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub power_state: Option<String>,
        #[serde(default)]
        pub ips: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub console_url: Option<String>,
        #[serde(default)]
        pub conditions: Vec<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub last_task_ref: Option<String>,
        #[serde(default)]
        pub current_resources: ResourceOverrides,
        #[serde(default)]
        pub snapshots: Vec<SnapshotStatusEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub phase: Option<VmPhase>,
        #[serde(default)]
        pub observed_generation: i64,
    }
}
