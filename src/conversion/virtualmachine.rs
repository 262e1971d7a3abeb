//! `VirtualMachine` conversion: the richest kind — field renames
//! (`staticIP` ↔ `ipAddress`), quantity re-typing (`memoryMiB` ↔ `memory`,
//! disk `sizeGiB` ↔ `size`), and the `tags[]` ↔ `metadata.labels{}` rename
//! with the one-way lossy refusal for non-string label values.

use std::collections::HashMap;

use super::{ConversionError, FromHub, Result, ToHub};
use crate::types::quantity;
use crate::types::virtualmachine::{v1alpha1, v1beta1};

fn network_to_hub(n: &v1alpha1::NetworkEntry) -> v1beta1::NetworkEntry {
    v1beta1::NetworkEntry {
        attachment_ref: n.attachment_ref.clone(),
        ip_address: n.static_ip.clone(),
        mac: n.mac.clone(),
    }
}

fn network_from_hub(n: &v1beta1::NetworkEntry) -> v1alpha1::NetworkEntry {
    v1alpha1::NetworkEntry {
        attachment_ref: n.attachment_ref.clone(),
        static_ip: n.ip_address.clone(),
        mac: n.mac.clone(),
    }
}

fn disk_to_hub(d: &v1alpha1::DiskEntry) -> v1beta1::DiskEntry {
    v1beta1::DiskEntry {
        name: d.name.clone(),
        size: quantity::format_gib(d.size_gi_b as i64),
        r#type: d.r#type.clone(),
        expand_policy: d.expand_policy.clone(),
        storage_class: d.storage_class.clone(),
    }
}

fn disk_from_hub(d: &v1beta1::DiskEntry) -> Result<v1alpha1::DiskEntry> {
    let bytes = quantity::parse_bytes(&d.size)
        .map_err(|e| ConversionError::invalid_value("disks[].size", e.to_string()))?;
    let size_gi_b = quantity::bytes_to_gib_i32(bytes)
        .map_err(|e| ConversionError::invalid_value("disks[].size", e.to_string()))?;
    Ok(v1alpha1::DiskEntry {
        name: d.name.clone(),
        size_gi_b,
        r#type: d.r#type.clone(),
        expand_policy: d.expand_policy.clone(),
        storage_class: d.storage_class.clone(),
    })
}

fn resources_to_hub(r: &v1alpha1::ResourceOverrides) -> v1beta1::ResourceOverrides {
    v1beta1::ResourceOverrides {
        cpus: r.cpus,
        memory: r.memory_mi_b.map(|mib| quantity::format_mib(mib as i64)),
        gpu: r.gpu.clone(),
    }
}

fn resources_from_hub(r: &v1beta1::ResourceOverrides) -> Result<v1alpha1::ResourceOverrides> {
    let memory_mi_b = match &r.memory {
        Some(s) => {
            let bytes = quantity::parse_bytes(s)
                .map_err(|e| ConversionError::invalid_value("resources.memory", e.to_string()))?;
            Some(
                quantity::bytes_to_mib_i32(bytes)
                    .map_err(|e| ConversionError::invalid_value("resources.memory", e.to_string()))?,
            )
        }
        None => None,
    };
    Ok(v1alpha1::ResourceOverrides {
        cpus: r.cpus,
        memory_mi_b,
        gpu: r.gpu.clone(),
    })
}

fn tags_to_labels(tags: &[String]) -> HashMap<String, serde_json::Value> {
    tags.iter()
        .map(|t| (t.clone(), serde_json::Value::String("true".to_string())))
        .collect()
}

fn labels_to_tags(labels: &HashMap<String, serde_json::Value>) -> Result<Vec<String>> {
    let mut tags: Vec<String> = Vec::with_capacity(labels.len());
    for (key, value) in labels {
        if !value.is_string() {
            return Err(ConversionError::not_representable(
                "metadata.labels",
                format!("label {key:?} has a non-string value"),
            ));
        }
        tags.push(key.clone());
    }
    tags.sort();
    Ok(tags)
}

impl ToHub for v1alpha1::VirtualMachineSpec {
    type Hub = v1beta1::VirtualMachineSpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VirtualMachineSpec {
            provider_ref: self.provider_ref.clone(),
            class_ref: self.class_ref.clone(),
            image_ref: self.image_ref.clone(),
            placement_ref: self.placement_ref.clone(),
            networks: self.networks.iter().map(network_to_hub).collect(),
            disks: self.disks.iter().map(disk_to_hub).collect(),
            user_data: self.user_data.clone(),
            placement: self.placement.clone(),
            resources: resources_to_hub(&self.resources),
            power_state: self.power_state.clone(),
            snapshot_operation: self.snapshot_operation.clone(),
            lifecycle: self.lifecycle.clone(),
            labels: tags_to_labels(&self.tags),
        })
    }
}

impl FromHub for v1alpha1::VirtualMachineSpec {
    type Hub = v1beta1::VirtualMachineSpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        let disks = hub
            .disks
            .iter()
            .map(disk_from_hub)
            .collect::<Result<Vec<_>>>()?;
        let tags = labels_to_tags(&hub.labels)?;
        Ok(v1alpha1::VirtualMachineSpec {
            provider_ref: hub.provider_ref.clone(),
            class_ref: hub.class_ref.clone(),
            image_ref: hub.image_ref.clone(),
            placement_ref: hub.placement_ref.clone(),
            networks: hub.networks.iter().map(network_from_hub).collect(),
            disks,
            user_data: hub.user_data.clone(),
            placement: hub.placement.clone(),
            resources: resources_from_hub(&hub.resources)?,
            power_state: hub.power_state.clone(),
            snapshot_operation: hub.snapshot_operation.clone(),
            lifecycle: hub.lifecycle.clone(),
            tags,
        })
    }
}

impl ToHub for v1alpha1::VirtualMachineStatus {
    type Hub = v1beta1::VirtualMachineStatus;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::VirtualMachineStatus {
            provider_id: self.provider_id.clone(),
            power_state: self.power_state.clone(),
            ips: self.ips.clone(),
            console_url: self.console_url.clone(),
            conditions: self.conditions.clone(),
            last_task_ref: self.last_task_ref.clone(),
            current_resources: resources_to_hub(&self.current_resources),
            snapshots: self.snapshots.clone(),
            phase: self.phase.clone(),
            observed_generation: self.observed_generation,
        })
    }
}

impl FromHub for v1alpha1::VirtualMachineStatus {
    type Hub = v1beta1::VirtualMachineStatus;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::VirtualMachineStatus {
            provider_id: hub.provider_id.clone(),
            power_state: hub.power_state.clone(),
            ips: hub.ips.clone(),
            console_url: hub.console_url.clone(),
            conditions: hub.conditions.clone(),
            last_task_ref: hub.last_task_ref.clone(),
            current_resources: resources_from_hub(&hub.current_resources)?,
            snapshots: hub.snapshots.clone(),
            phase: hub.phase.clone(),
            observed_generation: hub.observed_generation,
        })
    }
}
