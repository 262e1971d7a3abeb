//! `VMClass` custom resource.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::conditions::Condition;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum Firmware {
    BIOS,
    UEFI,
    EFI,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GuestToolsPolicy {
    Install,
    Skip,
    Upgrade,
    Uninstall,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum DiskType {
    #[serde(rename = "thin")]
    Thin,
    #[serde(rename = "thick")]
    Thick,
    #[serde(rename = "eagerZeroedThick")]
    EagerZeroedThick,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiskDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<DiskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfile {
    #[serde(default)]
    pub nested_virtualization: bool,
    #[serde(default)]
    pub cpu_hot_add: bool,
    #[serde(default)]
    pub memory_hot_add: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityProfile {
    #[serde(default)]
    pub secure_boot: bool,
    #[serde(default)]
    pub tpm: bool,
    #[serde(default)]
    pub vt_d: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

macro_rules! vmclass_spec {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            pub cpus: i32,
            pub memory: String,
            #[serde(default = "default_firmware")]
            pub firmware: Firmware,
            #[serde(default = "default_guest_tools_policy")]
            pub guest_tools_policy: GuestToolsPolicy,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub disk_defaults: Option<DiskDefaults>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub extra_config: Option<HashMap<String, String>>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub performance: Option<PerformanceProfile>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub security: Option<SecurityProfile>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub limits: Option<ResourceLimits>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub reservations: Option<ResourceLimits>,
        }
    };
}

fn default_firmware() -> Firmware {
    Firmware::BIOS
}

fn default_guest_tools_policy() -> GuestToolsPolicy {
    GuestToolsPolicy::Install
}

pub mod v1beta1 {
    use super::*;

    vmclass_spec!(VMClassSpecInner);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "VMClass",
        namespaced,
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMClassSpec {
        #[serde(flatten)]
        pub inner: VMClassSpecInner,
        #[serde(default)]
        pub conditions: Vec<Condition>,
    }
}

pub mod v1alpha1 {
    use super::*;

    vmclass_spec!(VMClassSpecInner);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "VMClass",
        namespaced,
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMClassSpec {
        #[serde(flatten)]
        pub inner: VMClassSpecInner,
        #[serde(default)]
        pub conditions: Vec<Condition>,
    }
}
