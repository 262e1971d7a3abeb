//! `VMClone` custom resource.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::virtualmachine::v1beta1::{DiskEntry, NetworkEntry};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum CloneType {
    FullClone,
    LinkedClone,
    InstantClone,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum ClonePhase {
    Pending,
    Cloning,
    Customizing,
    Ready,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneOptions {
    pub r#type: CloneType,
    #[serde(default)]
    pub power_on: bool,
}

impl Default for CloneType {
    fn default() -> Self {
        CloneType::FullClone
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCustomization {
    pub attachment_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default)]
    pub dns: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub networks: Vec<NetworkCustomization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneTarget {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_ref: Option<String>,
    #[serde(default)]
    pub networks: Vec<NetworkEntry>,
    #[serde(default)]
    pub disks: Vec<DiskEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<ClonePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub linked_clone_confirmed: bool,
}

pub mod v1beta1 {
    use super::*;

    /// The widened union: alpha only ever populates `Vm`.
    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(tag = "kind", rename_all = "camelCase")]
    pub enum CloneSource {
        Vm { vm_ref: String },
        Snapshot { snapshot_ref: String },
        Template { template_ref: String },
        Image { image_ref: String },
    }

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "VMClone",
        namespaced,
        status = "CloneStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMCloneSpec {
        pub source: CloneSource,
        pub target: CloneTarget,
        #[serde(default)]
        pub options: CloneOptions,
        #[serde(default)]
        pub customization: Customization,
    }
}

pub mod v1alpha1 {
    use super::*;

    /// Pre-union alpha shape: a VM reference only.
    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct CloneSource {
        pub vm_ref: String,
    }

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "VMClone",
        namespaced,
        status = "CloneStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMCloneSpec {
        pub source: CloneSource,
        pub target: CloneTarget,
        #[serde(default)]
        pub options: CloneOptions,
        #[serde(default)]
        pub customization: Customization,
    }
}
