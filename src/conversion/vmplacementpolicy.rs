//! `VMPlacementPolicy` conversion: identical shape on both sides.

use super::{FromHub, Result, ToHub};
use crate::types::vmplacementpolicy::{v1alpha1, v1beta1};

impl ToHub for v1alpha1::VMPlacementPolicySpec {
    type Hub = v1beta1::VMPlacementPolicySpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VMPlacementPolicySpec {
            inner: self.inner.clone(),
        })
    }
}

impl FromHub for v1alpha1::VMPlacementPolicySpec {
    type Hub = v1beta1::VMPlacementPolicySpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::VMPlacementPolicySpec {
            inner: hub.inner.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_hub() {
        let alpha = v1alpha1::VMPlacementPolicySpec {
            inner: Default::default(),
        };
        let hub = alpha.to_hub().unwrap();
        let back = v1alpha1::VMPlacementPolicySpec::from_hub(&hub).unwrap();
        assert_eq!(alpha, back);
    }
}
