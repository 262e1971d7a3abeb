//! `VMSet` conversion.
//!
//! The embedded VM template is stored in the hub `VirtualMachineSpec` shape
//! on both served versions.

use super::{FromHub, Result, ToHub};
use crate::types::vmset::{v1alpha1, v1beta1};

impl ToHub for v1alpha1::VMSetSpec {
    type Hub = v1beta1::VMSetSpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VMSetSpec {
            inner: self.inner.clone(),
        })
    }
}

impl FromHub for v1alpha1::VMSetSpec {
    type Hub = v1beta1::VMSetSpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::VMSetSpec {
            inner: hub.inner.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::virtualmachine::{v1beta1::VirtualMachineSpec, DesiredPowerState};
    use crate::types::vmset::{v1alpha1::VMSetSpecInner, VMTemplate};
    use std::collections::HashMap;

    #[test]
    fn round_trips_through_hub() {
        let alpha = v1alpha1::VMSetSpec {
            inner: VMSetSpecInner {
                replicas: Some(3),
                selector: HashMap::from([("app".to_string(), "web".to_string())]),
                template: VMTemplate {
                    labels: HashMap::new(),
                    spec: VirtualMachineSpec {
                        provider_ref: "vsphere-prod".into(),
                        class_ref: "medium".into(),
                        image_ref: "ubuntu-22-04".into(),
                        placement_ref: None,
                        networks: vec![],
                        disks: vec![],
                        user_data: None,
                        placement: Default::default(),
                        resources: Default::default(),
                        power_state: DesiredPowerState::On,
                        snapshot_operation: None,
                        lifecycle: None,
                        labels: HashMap::new(),
                    },
                },
                update_strategy: None,
                min_ready_seconds: None,
                revision_history_limit: None,
            },
        };
        let hub = alpha.to_hub().unwrap();
        let back = v1alpha1::VMSetSpec::from_hub(&hub).unwrap();
        assert_eq!(alpha, back);
    }
}
