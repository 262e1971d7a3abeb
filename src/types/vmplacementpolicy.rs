//! `VMPlacementPolicy` custom resource.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConstraint {
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default)]
    pub datastores: Vec<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub resource_pools: Vec<String>,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub node_selectors: HashMap<String, String>,
    #[serde(default)]
    pub tolerations: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopologyRule {
    pub label_selector: HashMap<String, String>,
    pub topology_key: String,
    #[serde(default)]
    pub weight: Option<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffinityRules {
    #[serde(default)]
    pub required_affinity: Vec<TopologyRule>,
    #[serde(default)]
    pub preferred_affinity: Vec<TopologyRule>,
    #[serde(default)]
    pub required_anti_affinity: Vec<TopologyRule>,
    #[serde(default)]
    pub preferred_anti_affinity: Vec<TopologyRule>,
}

macro_rules! vmplacementpolicy_spec {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default)]
            pub hard: PlacementConstraint,
            #[serde(default)]
            pub soft: PlacementConstraint,
            #[serde(default)]
            pub affinity: AffinityRules,
        }
    };
}

pub mod v1beta1 {
    use super::*;
    vmplacementpolicy_spec!(VMPlacementPolicySpecInner);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "VMPlacementPolicy",
        namespaced,
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMPlacementPolicySpec {
        #[serde(flatten)]
        pub inner: VMPlacementPolicySpecInner,
    }
}

pub mod v1alpha1 {
    use super::*;
    vmplacementpolicy_spec!(VMPlacementPolicySpecInner);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "VMPlacementPolicy",
        namespaced,
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMPlacementPolicySpec {
        #[serde(flatten)]
        pub inner: VMPlacementPolicySpecInner,
    }
}
