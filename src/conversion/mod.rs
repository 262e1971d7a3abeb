//! Component B — lossless bidirectional mapping between `v1alpha1` and the
//! hub `v1beta1` for every kind.
//!
//! Two total functions per kind: `to_hub` and `from_hub`. Conversion never
//! panics and is value-preserving — no defaulting is applied here, so
//! `from_hub(to_hub(x)) == x` for every value the alpha shape can represent.

pub mod provider;
pub mod virtualmachine;
pub mod vmclass;
pub mod vmclone;
pub mod vmimage;
pub mod vmnetworkattachment;
pub mod vmplacementpolicy;
pub mod vmset;
pub mod vmsnapshot;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{field} is not representable in v1alpha1: {reason}")]
    NotRepresentable { field: String, reason: String },
    #[error("{field} has an invalid value: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConversionError {
    pub fn not_representable(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConversionError::NotRepresentable {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConversionError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Converts an alpha value into its hub representation.
pub trait ToHub {
    type Hub;
    fn to_hub(&self) -> Result<Self::Hub>;
}

/// Converts a hub value back into its alpha representation. May fail with
/// `NotRepresentable` (a beta-only variant was populated) or `InvalidValue`
/// (a numeric field does not fit the alpha type).
pub trait FromHub: Sized {
    type Hub;
    fn from_hub(hub: &Self::Hub) -> Result<Self>;
}
