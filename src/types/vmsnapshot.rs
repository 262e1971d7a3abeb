//! `VMSnapshot` custom resource.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum SnapshotPhase {
    Pending,
    Creating,
    Ready,
    Deleting,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<i64>,
    #[serde(default)]
    pub delete_on_vm_delete: bool,
}

macro_rules! vmsnapshot_spec {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub vm_ref: String,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub name_hint: Option<String>,
            #[serde(default)]
            pub include_memory: bool,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub description: Option<String>,
            #[serde(default)]
            pub retention: RetentionPolicy,
        }
    };
}

macro_rules! vmsnapshot_status {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub snapshot_id: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub phase: Option<SnapshotPhase>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub creation_time: Option<chrono::DateTime<chrono::Utc>>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub size_bytes: Option<i64>,
        }
    };
}

pub mod v1beta1 {
    use super::*;
    vmsnapshot_spec!(VMSnapshotSpec);
    vmsnapshot_status!(VMSnapshotStatus);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "VMSnapshot",
        namespaced,
        status = "VMSnapshotStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMSnapshotCrdSpec {
        #[serde(flatten)]
        pub spec: VMSnapshotSpec,
    }
}

pub mod v1alpha1 {
    use super::*;
    vmsnapshot_spec!(VMSnapshotSpec);
    vmsnapshot_status!(VMSnapshotStatus);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "VMSnapshot",
        namespaced,
        status = "VMSnapshotStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMSnapshotCrdSpec {
        #[serde(flatten)]
        pub spec: VMSnapshotSpec,
    }
}
