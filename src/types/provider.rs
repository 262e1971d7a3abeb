//! `Provider` custom resource.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::conditions::Condition;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Vsphere,
    Libvirt,
    Proxmox,
    Firecracker,
    Qemu,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
pub enum RuntimeMode {
    #[default]
    #[serde(rename = "in-process")]
    InProcess,
    #[serde(rename = "remote")]
    Remote,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
pub enum RuntimePhase {
    #[default]
    Pending,
    Starting,
    Running,
    Stopping,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ProviderDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "resourcePool")]
    pub resource_pool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct RateLimitSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct RuntimeSpec {
    #[serde(default)]
    pub mode: RuntimeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "servicePort")]
    pub service_port: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct HealthCheckSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "failureThreshold")]
    pub failure_threshold: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ConnectionPoolSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "maxIdle")]
    pub max_idle: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct RuntimeStatus {
    #[serde(default)]
    pub mode: RuntimeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub phase: RuntimePhase,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "readyReplicas")]
    pub ready_replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "availableReplicas")]
    pub available_replicas: Option<i32>,
}

pub mod v1beta1 {
    use super::*;

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "Provider",
        namespaced,
        status = "ProviderStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct ProviderSpec {
        #[serde(rename = "type")]
        pub type_: ProviderType,
        pub endpoint: String,
        pub credential_secret_ref: String,
        #[serde(default)]
        pub insecure_skip_verify: bool,
        #[serde(default)]
        pub defaults: ProviderDefaults,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub rate_limit: Option<RateLimitSpec>,
        pub runtime: RuntimeSpec,
        #[serde(default)]
        pub health_check: HealthCheckSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub connection_pool: Option<ConnectionPoolSpec>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct ProviderStatus {
        #[serde(default)]
        pub healthy: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub last_health_check_time: Option<chrono::DateTime<chrono::Utc>>,
        #[serde(default)]
        pub runtime: RuntimeStatus,
        #[serde(default)]
        pub capabilities: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        #[serde(default)]
        pub conditions: Vec<Condition>,
        #[serde(default)]
        pub observed_generation: i64,
    }
}

pub mod v1alpha1 {
    use super::*;

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "Provider",
        namespaced,
        status = "ProviderStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct ProviderSpec {
        #[serde(rename = "type")]
        pub type_: ProviderType,
        pub endpoint: String,
        pub credential_secret_ref: String,
        #[serde(default)]
        pub insecure_skip_verify: bool,
        #[serde(default)]
        pub defaults: ProviderDefaults,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub rate_limit: Option<RateLimitSpec>,
        pub runtime: RuntimeSpec,
        #[serde(default)]
        pub health_check: HealthCheckSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub connection_pool: Option<ConnectionPoolSpec>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct ProviderStatus {
        #[serde(default)]
        pub healthy: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub last_health_check_time: Option<chrono::DateTime<chrono::Utc>>,
        #[serde(default)]
        pub runtime: RuntimeStatus,
        #[serde(default)]
        pub capabilities: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<String>,
        #[serde(default)]
        pub conditions: Vec<Condition>,
        #[serde(default)]
        pub observed_generation: i64,
    }
}
