//! `VMNetworkAttachment` conversion: the `ipPolicy`/IP-allocation structural
//! move. `IPPool` and `IPNone` are beta-only.

use super::{ConversionError, FromHub, Result, ToHub};
use crate::types::vmnetworkattachment::{v1alpha1, v1beta1, IpAllocationType};

impl ToHub for v1alpha1::VMNetworkAttachmentSpec {
    type Hub = v1beta1::VMNetworkAttachmentSpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VMNetworkAttachmentSpec {
            backend: self.backend.clone(),
            ip_allocation: self.ip_allocation.clone(),
            mac_address: self.mac_address.clone(),
        })
    }
}

impl FromHub for v1alpha1::VMNetworkAttachmentSpec {
    type Hub = v1beta1::VMNetworkAttachmentSpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        match hub.ip_allocation.type_ {
            IpAllocationType::Pool | IpAllocationType::None => {
                return Err(ConversionError::not_representable(
                    "ipAllocation.type",
                    "Pool and None allocation types are beta-only",
                ))
            }
            IpAllocationType::Dhcp | IpAllocationType::Static => {}
        }
        Ok(v1alpha1::VMNetworkAttachmentSpec {
            backend: hub.backend.clone(),
            ip_allocation: hub.ip_allocation.clone(),
            mac_address: hub.mac_address.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::vmnetworkattachment::{IpAllocation, NetworkBackend};

    fn sample(alloc: IpAllocationType) -> v1beta1::VMNetworkAttachmentSpec {
        v1beta1::VMNetworkAttachmentSpec {
            backend: NetworkBackend::VspherePortgroup {
                portgroup: "vm-network".into(),
            },
            ip_allocation: IpAllocation { type_: alloc },
            mac_address: None,
        }
    }

    #[test]
    fn dhcp_and_static_round_trip() {
        for alloc in [IpAllocationType::Dhcp, IpAllocationType::Static] {
            let hub = sample(alloc);
            let alpha = v1alpha1::VMNetworkAttachmentSpec::from_hub(&hub).unwrap();
            let back = alpha.to_hub().unwrap();
            assert_eq!(hub, back);
        }
    }

    #[test]
    fn pool_and_none_are_not_representable() {
        for alloc in [IpAllocationType::Pool, IpAllocationType::None] {
            let hub = sample(alloc);
            assert!(matches!(
                v1alpha1::VMNetworkAttachmentSpec::from_hub(&hub),
                Err(ConversionError::NotRepresentable { .. })
            ));
        }
    }
}
