//! `VMClass` conversion: identical shape on both sides (memory is already a
//! quantity string in both the alpha and beta schema; the int32 re-typing
//! case applies to `VirtualMachine`'s resource overrides, not here).

use super::{FromHub, Result, ToHub};
use crate::types::vmclass::{v1alpha1, v1beta1};

impl ToHub for v1alpha1::VMClassSpec {
    type Hub = v1beta1::VMClassSpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VMClassSpec {
            inner: self.inner.clone(),
            conditions: self.conditions.clone(),
        })
    }
}

impl FromHub for v1alpha1::VMClassSpec {
    type Hub = v1beta1::VMClassSpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::VMClassSpec {
            inner: hub.inner.clone(),
            conditions: hub.conditions.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::vmclass::v1alpha1::VMClassSpecInner;
    use crate::types::vmclass::{Firmware, GuestToolsPolicy};

    #[test]
    fn round_trips_through_hub() {
        let alpha = v1alpha1::VMClassSpec {
            inner: VMClassSpecInner {
                cpus: 2,
                memory: "4Gi".into(),
                firmware: Firmware::UEFI,
                guest_tools_policy: GuestToolsPolicy::Install,
                disk_defaults: None,
                extra_config: None,
                performance: None,
                security: None,
                limits: None,
                reservations: None,
            },
            conditions: vec![],
        };
        let hub = alpha.to_hub().unwrap();
        let back = v1alpha1::VMClassSpec::from_hub(&hub).unwrap();
        assert_eq!(alpha, back);
    }
}
