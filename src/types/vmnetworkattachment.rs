//! `VMNetworkAttachment` custom resource.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum NetworkBackend {
    VspherePortgroup { portgroup: String },
    LibvirtNetwork { bridge_or_network: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IpAllocationType {
    Dhcp,
    Static,
    Pool,
    None,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IpAllocation {
    #[serde(rename = "type")]
    pub type_: IpAllocationType,
}

pub mod v1beta1 {
    use super::*;

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "VMNetworkAttachment",
        namespaced,
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMNetworkAttachmentSpec {
        pub backend: NetworkBackend,
        pub ip_allocation: IpAllocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub mac_address: Option<String>,
    }
}

pub mod v1alpha1 {
    use super::*;

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "VMNetworkAttachment",
        namespaced,
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMNetworkAttachmentSpec {
        pub backend: NetworkBackend,
        pub ip_allocation: IpAllocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub mac_address: Option<String>,
    }
}
