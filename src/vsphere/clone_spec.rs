//! Parses the JSON payloads `Create`/`Reconfigure` embed into an
//! internal VM spec, then builds the clone/reconfigure spec vSphere expects.

use serde::Deserialize;

use crate::resilience::{Error, ErrorKind, Result};
use crate::types::quantity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firmware {
    Bios,
    Uefi,
}

impl Firmware {
    /// Unknown firmware strings default to BIOS.
    fn parse(raw: &str) -> Self {
        match raw {
            "UEFI" | "EFI" => Firmware::Uefi,
            _ => Firmware::Bios,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClassJson {
    cpus: i32,
    #[serde(default)]
    memory: String,
    #[serde(default)]
    firmware: String,
}

#[derive(Debug, Deserialize)]
struct ImageJson {
    #[serde(default)]
    template: String,
}

#[derive(Debug, Deserialize)]
struct NetworkEntryJson {
    network: String,
}

#[derive(Debug, Deserialize)]
struct DiskEntryJson {
    #[serde(default)]
    size: String,
}

/// The fields `Create`/`Reconfigure` need out of the class/image/network/disk
/// JSON payloads, independent of CRD version.
#[derive(Debug, Clone)]
pub struct VmSpec {
    pub cpus: i32,
    pub memory_mib: i32,
    pub firmware: Firmware,
    pub template_name: String,
    /// `None` when no network is specified: no NIC is added.
    pub network_name: Option<String>,
    pub disk_size_gib: Option<i32>,
    pub user_data: Vec<u8>,
}

impl VmSpec {
    pub fn parse(
        class_json: &str,
        image_json: &str,
        networks_json: &str,
        disks_json: &str,
        user_data: Vec<u8>,
    ) -> Result<Self> {
        let class: ClassJson = serde_json::from_str(class_json)
            .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("invalid class JSON: {e}")))?;
        let image: ImageJson = serde_json::from_str(image_json)
            .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("invalid image JSON: {e}")))?;
        let networks: Vec<NetworkEntryJson> = if networks_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(networks_json)
                .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("invalid networks JSON: {e}")))?
        };
        let disks: Vec<DiskEntryJson> = if disks_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(disks_json)
                .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("invalid disks JSON: {e}")))?
        };

        let memory_mib = if class.memory.is_empty() {
            0
        } else {
            let bytes = quantity::parse_bytes(&class.memory)
                .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("invalid memory quantity: {e}")))?;
            quantity::bytes_to_mib_i32(bytes)
                .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("memory out of range: {e}")))?
        };

        let disk_size_gib = match disks.first() {
            Some(d) if !d.size.is_empty() => {
                let bytes = quantity::parse_bytes(&d.size)
                    .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("invalid disk size: {e}")))?;
                Some(
                    quantity::bytes_to_gib_i32(bytes)
                        .map_err(|e| Error::new(ErrorKind::InvalidSpec, format!("disk size out of range: {e}")))?,
                )
            }
            _ => None,
        };

        Ok(VmSpec {
            cpus: class.cpus,
            memory_mib,
            firmware: Firmware::parse(&class.firmware),
            template_name: image.template,
            network_name: networks.into_iter().next().map(|n| n.network),
            disk_size_gib,
            user_data,
        })
    }
}

/// A single extra-config key/value pair, as vSphere's `OptionValue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraConfigEntry {
    pub key: String,
    pub value: String,
}

/// Everything needed to build the `VirtualMachineCloneSpec` /
/// `VirtualMachineConfigSpec` vSphere expects. Kept as
/// plain data so `HypervisorClient::clone_vm`/`reconfigure` implementations
/// translate it into wire XML without this module knowing the wire format.
#[derive(Debug, Clone)]
pub struct CloneSpec {
    pub resource_pool: Option<super::client::MoRef>,
    pub datastore: Option<super::client::MoRef>,
    pub network: Option<super::client::MoRef>,
    pub num_cpus: Option<i32>,
    pub memory_mib: Option<i32>,
    pub firmware: Option<Firmware>,
    /// `startConnected=true, allowGuestControl=true` always, per spec.
    pub add_vmxnet3_nic: bool,
    pub extra_config: Vec<ExtraConfigEntry>,
    pub power_on: bool,
    pub template: bool,
}

impl CloneSpec {
    /// Cloud-init is injected via guestinfo keys; existing
    /// extra-config entries the caller passed in are preserved by appending,
    /// never replacing, the list.
    pub fn for_create(
        spec: &VmSpec,
        name: &str,
        resource_pool: super::client::MoRef,
        datastore: super::client::MoRef,
        network: Option<super::client::MoRef>,
        mut existing_extra_config: Vec<ExtraConfigEntry>,
    ) -> Self {
        if !spec.user_data.is_empty() {
            existing_extra_config.push(ExtraConfigEntry {
                key: "guestinfo.userdata".to_string(),
                value: base64_encode(&spec.user_data),
            });
            existing_extra_config.push(ExtraConfigEntry {
                key: "guestinfo.userdata.encoding".to_string(),
                value: "yaml".to_string(),
            });
            existing_extra_config.push(ExtraConfigEntry {
                key: "guestinfo.metadata".to_string(),
                value: base64_encode(format!(r#"{{"instance-id": "{}"}}"#, name).as_bytes()),
            });
            existing_extra_config.push(ExtraConfigEntry {
                key: "guestinfo.metadata.encoding".to_string(),
                value: "json".to_string(),
            });
        }

        CloneSpec {
            resource_pool: Some(resource_pool),
            datastore: Some(datastore),
            network: network.clone(),
            num_cpus: Some(spec.cpus),
            memory_mib: Some(spec.memory_mib),
            firmware: Some(spec.firmware),
            add_vmxnet3_nic: network.is_some(),
            extra_config: existing_extra_config,
            // Power-on happens as a separate step after the clone completes
            // so the controller observes a stable ID first.
            power_on: false,
            template: false,
        }
    }
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_class_image_network_disk_json() {
        let spec = VmSpec::parse(
            r#"{"cpus": 2, "memory": "4Gi", "firmware": "UEFI"}"#,
            r#"{"template": "ubuntu-22-04"}"#,
            r#"[{"network": "vm-network"}]"#,
            r#"[{"size": "40Gi"}]"#,
            b"#cloud-config\n".to_vec(),
        )
        .unwrap();
        assert_eq!(spec.cpus, 2);
        assert_eq!(spec.memory_mib, 4096);
        assert_eq!(spec.firmware, Firmware::Uefi);
        assert_eq!(spec.template_name, "ubuntu-22-04");
        assert_eq!(spec.network_name.as_deref(), Some("vm-network"));
        assert_eq!(spec.disk_size_gib, Some(40));
    }

    #[test]
    fn unknown_firmware_defaults_to_bios() {
        let spec = VmSpec::parse(
            r#"{"cpus": 1, "memory": "1Gi", "firmware": "weird"}"#,
            r#"{"template": "t"}"#,
            "",
            "",
            Vec::new(),
        )
        .unwrap();
        assert_eq!(spec.firmware, Firmware::Bios);
    }

    #[test]
    fn no_network_means_no_nic() {
        let spec = VmSpec::parse(
            r#"{"cpus": 1, "memory": "1Gi"}"#,
            r#"{"template": "t"}"#,
            "",
            "",
            Vec::new(),
        )
        .unwrap();
        assert_eq!(spec.network_name, None);
    }

    #[test]
    fn malformed_memory_quantity_fails() {
        let err = VmSpec::parse(
            r#"{"cpus": 1, "memory": "not-a-quantity"}"#,
            r#"{"template": "t"}"#,
            "",
            "",
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSpec);
    }

    #[test]
    fn clone_spec_injects_cloud_init_guestinfo_and_preserves_existing() {
        let spec = VmSpec {
            cpus: 2,
            memory_mib: 2048,
            firmware: Firmware::Bios,
            template_name: "ubuntu".to_string(),
            network_name: Some("vm-network".to_string()),
            disk_size_gib: None,
            user_data: b"#cloud-config\nhostname: x\n".to_vec(),
        };
        let existing = vec![ExtraConfigEntry {
            key: "existing.key".to_string(),
            value: "existing-value".to_string(),
        }];
        let clone_spec = CloneSpec::for_create(
            &spec,
            "web-1",
            super::super::client::MoRef::new("ResourcePool", "rp-1"),
            super::super::client::MoRef::new("Datastore", "ds-1"),
            Some(super::super::client::MoRef::new("Network", "net-1")),
            existing,
        );
        assert!(!clone_spec.power_on);
        assert!(!clone_spec.template);
        assert!(clone_spec.add_vmxnet3_nic);
        assert!(clone_spec
            .extra_config
            .iter()
            .any(|e| e.key == "existing.key"));
        assert!(clone_spec
            .extra_config
            .iter()
            .any(|e| e.key == "guestinfo.userdata"));
        let encoding = clone_spec
            .extra_config
            .iter()
            .find(|e| e.key == "guestinfo.userdata.encoding")
            .unwrap();
        assert_eq!(encoding.value, "yaml");
        let metadata = clone_spec
            .extra_config
            .iter()
            .find(|e| e.key == "guestinfo.metadata")
            .unwrap();
        let decoded = {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD.decode(&metadata.value).unwrap()
        };
        assert_eq!(String::from_utf8(decoded).unwrap(), r#"{"instance-id": "web-1"}"#);
    }
}
