//! `VMSnapshot` conversion: identical shape on both sides.

use super::{FromHub, Result, ToHub};
use crate::types::vmsnapshot::{v1alpha1, v1beta1};

impl ToHub for v1alpha1::VMSnapshotCrdSpec {
    type Hub = v1beta1::VMSnapshotCrdSpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VMSnapshotCrdSpec {
            spec: self.spec.clone(),
        })
    }
}

impl FromHub for v1alpha1::VMSnapshotCrdSpec {
    type Hub = v1beta1::VMSnapshotCrdSpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::VMSnapshotCrdSpec {
            spec: hub.spec.clone(),
        })
    }
}

impl ToHub for v1alpha1::VMSnapshotStatus {
    type Hub = v1beta1::VMSnapshotStatus;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VMSnapshotStatus {
            snapshot_id: self.snapshot_id.clone(),
            phase: self.phase.clone(),
            creation_time: self.creation_time,
            size_bytes: self.size_bytes,
        })
    }
}

impl FromHub for v1alpha1::VMSnapshotStatus {
    type Hub = v1beta1::VMSnapshotStatus;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::VMSnapshotStatus {
            snapshot_id: hub.snapshot_id.clone(),
            phase: hub.phase.clone(),
            creation_time: hub.creation_time,
            size_bytes: hub.size_bytes,
        })
    }
}
