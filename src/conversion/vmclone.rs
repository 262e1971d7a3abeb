//! `VMClone` conversion: union widening over clone source.

use super::{ConversionError, FromHub, Result, ToHub};
use crate::types::vmclone::v1beta1::CloneSource;
use crate::types::vmclone::{v1alpha1, v1beta1};

impl ToHub for v1alpha1::VMCloneSpec {
    type Hub = v1beta1::VMCloneSpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VMCloneSpec {
            source: CloneSource::Vm {
                vm_ref: self.source.vm_ref.clone(),
            },
            target: self.target.clone(),
            options: self.options.clone(),
            customization: self.customization.clone(),
        })
    }
}

impl FromHub for v1alpha1::VMCloneSpec {
    type Hub = v1beta1::VMCloneSpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        let vm_ref = match &hub.source {
            CloneSource::Vm { vm_ref } => vm_ref.clone(),
            CloneSource::Snapshot { .. } => {
                return Err(ConversionError::not_representable(
                    "source",
                    "snapshot-based cloning is not representable in v1alpha1",
                ))
            }
            CloneSource::Template { .. } => {
                return Err(ConversionError::not_representable(
                    "source",
                    "template-based cloning is not representable in v1alpha1",
                ))
            }
            CloneSource::Image { .. } => {
                return Err(ConversionError::not_representable(
                    "source",
                    "image-based cloning is not representable in v1alpha1",
                ))
            }
        };
        Ok(v1alpha1::VMCloneSpec {
            source: v1alpha1::CloneSource { vm_ref },
            target: hub.target.clone(),
            options: hub.options.clone(),
            customization: hub.customization.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::vmclone::{CloneOptions, CloneTarget, CloneType, Customization};

    fn target() -> CloneTarget {
        CloneTarget {
            name: "web-2".into(),
            ..Default::default()
        }
    }

    #[test]
    fn vm_source_round_trips() {
        let alpha = v1alpha1::VMCloneSpec {
            source: v1alpha1::CloneSource {
                vm_ref: "web-1".into(),
            },
            target: target(),
            options: CloneOptions {
                r#type: CloneType::FullClone,
                power_on: true,
            },
            customization: Customization::default(),
        };
        let hub = alpha.to_hub().unwrap();
        let back = v1alpha1::VMCloneSpec::from_hub(&hub).unwrap();
        assert_eq!(alpha, back);
    }

    #[test]
    fn snapshot_source_is_not_representable_in_alpha() {
        let hub = v1beta1::VMCloneSpec {
            source: crate::types::vmclone::v1beta1::CloneSource::Snapshot {
                snapshot_ref: "snap-1".into(),
            },
            target: target(),
            options: CloneOptions::default(),
            customization: Customization::default(),
        };
        let err = v1alpha1::VMCloneSpec::from_hub(&hub).unwrap_err();
        match err {
            ConversionError::NotRepresentable { reason, .. } => {
                assert!(reason.contains("snapshot-based cloning"));
            }
            other => panic!("expected NotRepresentable, got {other:?}"),
        }
    }
}
