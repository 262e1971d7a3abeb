//! `VMImage` custom resource.
//!
//! The beta source is a tagged union; alpha keeps the pre-union shape of a
//! source-kind discriminator plus one flat ref field, so the conversion
//! engine has a genuine widening/narrowing pair to implement.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::conditions::Condition;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum OnMissing {
    Import,
    Fail,
}

fn default_on_missing() -> OnMissing {
    OnMissing::Import
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreparePolicy {
    #[serde(default = "default_on_missing")]
    pub on_missing: OnMissing,
    #[serde(default)]
    pub validate_checksum: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<i32>,
    #[serde(default)]
    pub force: bool,
}

impl Default for PreparePolicy {
    fn default() -> Self {
        PreparePolicy {
            on_missing: default_on_missing(),
            validate_checksum: false,
            timeout_seconds: None,
            retries: None,
            force: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub enum ImagePhase {
    Pending,
    Importing,
    Preparing,
    Ready,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_bytes_per_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<i64>,
}

macro_rules! vmimage_status {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default)]
            pub ready: bool,
            #[serde(default)]
            pub available_providers: Vec<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub phase: Option<ImagePhase>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub import_progress: Option<ImportProgress>,
            #[serde(default)]
            pub conditions: Vec<Condition>,
            #[serde(default)]
            pub observed_generation: i64,
        }
    };
}

pub mod v1beta1 {
    use super::*;

    /// The hub's tagged union over source kinds.
    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(tag = "kind", rename_all = "camelCase")]
    pub enum ImageSource {
        VsphereTemplate { template: String },
        LibvirtPath { path: String },
        Http { url: String },
        Registry { image: String },
        DataVolume { name: String },
    }

    vmimage_status!(VMImageStatus);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1beta1",
        kind = "VMImage",
        namespaced,
        status = "VMImageStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMImageSpec {
        pub source: ImageSource,
        #[serde(default)]
        pub prepare: PreparePolicy,
    }
}

pub mod v1alpha1 {
    use super::*;

    /// Pre-union alpha shape: a discriminator plus one flat ref field.
    /// `fromHub` fails with `NotRepresentable` for source kinds that only
    /// exist as a beta variant (there are none today, but the shape is kept
    /// symmetric with `VMClone` for that reason).
    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub enum SourceKind {
        VsphereTemplate,
        LibvirtPath,
        Http,
        Registry,
        DataVolume,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct ImageSourceRef {
        pub kind: SourceKind,
        /// The template name, path, URL, image reference, or DataVolume name,
        /// depending on `kind`.
        #[serde(rename = "ref")]
        pub ref_: String,
    }

    vmimage_status!(VMImageStatus);

    #[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
    #[kube(
        group = "virtrigaud.io",
        version = "v1alpha1",
        kind = "VMImage",
        namespaced,
        status = "VMImageStatus",
        derive = "PartialEq"
    )]
    #[serde(rename_all = "camelCase")]
    pub struct VMImageSpec {
        pub source: ImageSourceRef,
        #[serde(default)]
        pub prepare: PreparePolicy,
    }
}
