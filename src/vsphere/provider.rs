//! The vSphere [`ProviderBackend`], gluing inventory
//! resolution, clone-spec construction, power/graceful-shutdown, describe,
//! snapshots and async task polling behind the RPC contract.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::resilience::{Error, Result};
use crate::rpc::backend::{
    Capabilities, CloneArgs, CloneOutcome, CreateArgs, CreateOutcome, DescribeOutcome, PowerOp, ProviderBackend,
    SnapshotCreateOutcome, TaskOutcome, TaskStatusOutcome, ValidateOutcome,
};
use crate::runtime::config::ProviderDefaults;

use super::client::HypervisorClient;
use super::clone_spec::{CloneSpec, ExtraConfigEntry, VmSpec};
use super::inventory::{self, CreateRefs};
use super::{describe, power, snapshot, task};

/// The operations and disk/network types the vSphere backend actually
/// supports.
pub fn capabilities() -> Capabilities {
    Capabilities {
        supported_operations: vec![
            "Create", "Delete", "Power", "Reconfigure", "Describe", "SnapshotCreate", "SnapshotDelete",
            "SnapshotRevert", "Clone", "ImagePrepare",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
        supported_disk_types: vec!["thin", "thick", "eagerZeroedThick"].into_iter().map(str::to_string).collect(),
        supported_network_types: vec!["portgroup", "dvportgroup"].into_iter().map(str::to_string).collect(),
        supports_graceful_shutdown: true,
        supports_memory_snapshots: true,
        // vSphere does support linked clones, but this backend only builds
        // full-clone specs today.
        supports_linked_clone: false,
    }
}

pub struct VsphereProvider<C> {
    client: C,
    defaults: ProviderDefaults,
}

impl<C: HypervisorClient> VsphereProvider<C> {
    pub fn new(client: C, defaults: ProviderDefaults) -> Self {
        VsphereProvider { client, defaults }
    }
}

#[async_trait]
impl<C: HypervisorClient> ProviderBackend for VsphereProvider<C> {
    async fn validate(&self) -> Result<ValidateOutcome> {
        self.client.ensure_connection().await?;
        match self.client.current_time().await {
            Ok(_) => Ok(ValidateOutcome { ok: true, message: String::new() }),
            Err(e) => Ok(ValidateOutcome { ok: false, message: e.message }),
        }
    }

    async fn get_capabilities(&self) -> Result<Capabilities> {
        Ok(capabilities())
    }

    async fn create(&self, args: CreateArgs) -> Result<CreateOutcome> {
        self.client.ensure_connection().await?;
        let spec = VmSpec::parse(&args.class_json, &args.image_json, &args.networks_json, &args.disks_json, args.user_data)?;

        let resolved = inventory::resolve_for_create(
            &self.client,
            CreateRefs {
                datacenter: None,
                template_name: &spec.template_name,
                cluster: self.defaults.cluster.as_deref(),
                datastore: self.defaults.datastore.as_deref().unwrap_or(""),
                folder: self.defaults.folder.as_deref(),
                network: spec.network_name.as_deref(),
            },
        )
        .await?;

        let clone_spec = CloneSpec::for_create(
            &spec,
            &args.name,
            resolved.resource_pool,
            resolved.datastore,
            resolved.network,
            Vec::<ExtraConfigEntry>::new(),
        );

        let clone_task = self
            .client
            .clone_vm(&resolved.template, &resolved.folder, &args.name, clone_spec)
            .await?;

        // The durable ID must be returned before any further hypervisor-visible
        // side effect (power-on) completes.
        let vm = wait_for_clone(&self.client, &clone_task).await?;
        let id = vm.id().to_string();

        if args.desired_power_state == "On" {
            if let Err(e) = self.client.power_on(&vm).await {
                warn!(vm = %id, error = %e, "best-effort power-on after create failed");
            }
        }

        Ok(CreateOutcome { id, task_ref: String::new() })
    }

    async fn delete(&self, id: &str) -> Result<TaskOutcome> {
        self.client.ensure_connection().await?;
        let vm = super::client::MoRef::new("VirtualMachine", id);
        let power_state = match self.client.power_state_raw(&vm).await {
            Ok(state) => state,
            Err(e) if e.kind == crate::resilience::ErrorKind::NotFound => {
                // Idempotent: missing VM -> success.
                return Ok(TaskOutcome::default());
            }
            Err(e) => return Err(e),
        };

        if power_state == "poweredOn" {
            if let Err(e) = self.client.power_off(&vm).await {
                warn!(vm = id, error = %e, "power-off before delete failed, continuing");
            }
        }

        let task = self.client.destroy(&vm).await?;
        Ok(TaskOutcome { task_ref: task.task_ref().to_string() })
    }

    async fn power(&self, id: &str, op: PowerOp, graceful_timeout_seconds: u32) -> Result<TaskOutcome> {
        self.client.ensure_connection().await?;
        let vm = super::client::MoRef::new("VirtualMachine", id);
        let outcome = power::apply(&self.client, &vm, op, graceful_timeout_seconds).await?;
        Ok(TaskOutcome { task_ref: outcome.task_ref })
    }

    async fn reconfigure(&self, id: &str, desired_class_json: &str, disk_changes_json: &str) -> Result<TaskOutcome> {
        self.client.ensure_connection().await?;
        let vm = super::client::MoRef::new("VirtualMachine", id);
        let spec = VmSpec::parse(desired_class_json, r#"{"template":""}"#, "", disk_changes_json, Vec::new())?;
        let clone_spec = CloneSpec {
            resource_pool: None,
            datastore: None,
            network: None,
            num_cpus: Some(spec.cpus),
            memory_mib: Some(spec.memory_mib),
            firmware: None,
            add_vmxnet3_nic: false,
            extra_config: Vec::new(),
            power_on: false,
            template: false,
        };
        let task = self.client.reconfigure(&vm, clone_spec).await?;
        Ok(TaskOutcome { task_ref: task.task_ref().to_string() })
    }

    async fn describe(&self, id: &str) -> Result<DescribeOutcome> {
        self.client.ensure_connection().await?;
        let vm = super::client::MoRef::new("VirtualMachine", id);
        describe::describe(&self.client, &vm).await
    }

    async fn task_status(&self, task_ref: &str) -> Result<TaskStatusOutcome> {
        self.client.ensure_connection().await?;
        task::status(&self.client, task_ref).await
    }

    async fn snapshot_create(
        &self,
        id: &str,
        name_hint: &str,
        description: &str,
        include_memory: bool,
    ) -> Result<SnapshotCreateOutcome> {
        self.client.ensure_connection().await?;
        let vm = super::client::MoRef::new("VirtualMachine", id);
        snapshot::create(&self.client, &vm, name_hint, description, include_memory).await
    }

    async fn snapshot_delete(&self, snapshot_id: &str) -> Result<TaskOutcome> {
        self.client.ensure_connection().await?;
        snapshot::delete(&self.client, snapshot_id).await
    }

    async fn snapshot_revert(&self, id: &str, snapshot_id: &str) -> Result<TaskOutcome> {
        self.client.ensure_connection().await?;
        let vm = super::client::MoRef::new("VirtualMachine", id);
        snapshot::revert(&self.client, &vm, snapshot_id).await
    }

    async fn clone(&self, args: CloneArgs) -> Result<CloneOutcome> {
        self.client.ensure_connection().await?;
        let source = super::client::MoRef::new("VirtualMachine", &args.source_id);
        let folder = self.client.find_folder(&self.client.find_datacenter(None).await?, None).await?;
        let clone_spec = CloneSpec {
            resource_pool: None,
            datastore: None,
            network: None,
            num_cpus: None,
            memory_mib: None,
            firmware: None,
            add_vmxnet3_nic: false,
            extra_config: Vec::new(),
            power_on: args.power_on,
            template: false,
        };
        let clone_task = self.client.clone_vm(&source, &folder, &args.target_name, clone_spec).await?;
        let vm = wait_for_clone(&self.client, &clone_task).await?;
        info!(source = %args.source_id, target = %vm.id(), "cloned VM");
        Ok(CloneOutcome { id: vm.id().to_string(), task_ref: String::new() })
    }

    async fn image_prepare(&self, _image_json: &str) -> Result<TaskOutcome> {
        // Import/preparation of non-template image sources (HTTP, registry,
        // DataVolume) is outside this backend's scope.
        Err(Error::not_supported("image preparation is not supported by the vSphere backend"))
    }
}

#[async_trait]
impl<C: HypervisorClient> crate::runtime::SessionHealth for VsphereProvider<C> {
    async fn is_ready(&self) -> bool {
        self.client.ensure_connection().await.is_ok()
    }

    async fn detail(&self) -> String {
        match self.client.current_time().await {
            Ok(_) => "vSphere session established".to_string(),
            Err(e) => format!("vSphere session unavailable: {e}"),
        }
    }
}

async fn wait_for_clone(client: &dyn HypervisorClient, task_handle: &super::client::TaskHandle) -> Result<super::client::MoRef> {
    loop {
        let info = client.task_info(task_handle).await?;
        match info.state {
            super::client::TaskState::Success => {
                return info
                    .result
                    .ok_or_else(|| Error::retryable("clone task succeeded without a result reference"));
            }
            super::client::TaskState::Error => {
                return Err(Error::retryable(
                    info.error_message.unwrap_or_else(|| "clone task failed".to_string()),
                ));
            }
            super::client::TaskState::Running | super::client::TaskState::Queued => {
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vsphere::client::{GuestNic, MoRef, TaskHandle, TaskInfo, TaskState, VmSummary};
    use std::sync::Mutex;

    struct FakeHypervisor {
        vms: Mutex<std::collections::HashMap<String, VmSummary>>,
        next_id: Mutex<u32>,
        templates: Mutex<Vec<String>>,
    }

    impl FakeHypervisor {
        fn with_template(name: &str) -> Self {
            FakeHypervisor {
                vms: Mutex::new(std::collections::HashMap::new()),
                next_id: Mutex::new(1),
                templates: Mutex::new(vec![name.to_string()]),
            }
        }
    }

    #[async_trait]
    impl HypervisorClient for FakeHypervisor {
        async fn ensure_connection(&self) -> Result<()> {
            Ok(())
        }
        async fn current_time(&self) -> Result<String> {
            Ok("now".to_string())
        }
        async fn find_datacenter(&self, _name: Option<&str>) -> Result<MoRef> {
            Ok(MoRef::new("Datacenter", "dc-1"))
        }
        async fn find_vm_by_name(&self, _dc: &MoRef, name: &str) -> Result<MoRef> {
            if self.templates.lock().unwrap().iter().any(|t| t == name) {
                Ok(MoRef::new("VirtualMachine", format!("template-{name}")))
            } else {
                Err(Error::not_found(format!("template {name} not found")))
            }
        }
        async fn find_cluster(&self, _dc: &MoRef, _name: &str) -> Result<MoRef> {
            Ok(MoRef::new("ClusterComputeResource", "cluster-1"))
        }
        async fn find_resource_pool_of_cluster(&self, _cluster: &MoRef) -> Result<MoRef> {
            Ok(MoRef::new("ResourcePool", "rp-1"))
        }
        async fn find_datastore(&self, _dc: &MoRef, _name: &str) -> Result<MoRef> {
            Ok(MoRef::new("Datastore", "ds-1"))
        }
        async fn find_folder(&self, _dc: &MoRef, _name: Option<&str>) -> Result<MoRef> {
            Ok(MoRef::new("Folder", "folder-1"))
        }
        async fn find_network(&self, _dc: &MoRef, name: &str) -> Result<MoRef> {
            Ok(MoRef::new("Network", name))
        }
        async fn clone_vm(&self, _t: &MoRef, _f: &MoRef, _name: &str, _spec: CloneSpec) -> Result<TaskHandle> {
            let mut next_id = self.next_id.lock().unwrap();
            let id = format!("vm-{next_id}");
            *next_id += 1;
            self.vms.lock().unwrap().insert(
                id.clone(),
                VmSummary {
                    power_state: "poweredOff".to_string(),
                    nics: vec![GuestNic { ip_addresses: vec!["10.0.0.5".to_string()] }],
                    ..Default::default()
                },
            );
            Ok(TaskHandle(MoRef::new("Task", format!("clone-task-{id}"))))
        }
        async fn power_on(&self, vm: &MoRef) -> Result<TaskHandle> {
            if let Some(summary) = self.vms.lock().unwrap().get_mut(&vm.value) {
                summary.power_state = "poweredOn".to_string();
            }
            Ok(TaskHandle(MoRef::new("Task", "power-on-task")))
        }
        async fn power_off(&self, vm: &MoRef) -> Result<TaskHandle> {
            if let Some(summary) = self.vms.lock().unwrap().get_mut(&vm.value) {
                summary.power_state = "poweredOff".to_string();
            }
            Ok(TaskHandle(MoRef::new("Task", "power-off-task")))
        }
        async fn reboot_guest(&self, _vm: &MoRef) -> Result<()> {
            Ok(())
        }
        async fn shutdown_guest(&self, _vm: &MoRef) -> Result<()> {
            Ok(())
        }
        async fn reconfigure(&self, _vm: &MoRef, _spec: CloneSpec) -> Result<TaskHandle> {
            Ok(TaskHandle(MoRef::new("Task", "reconfigure-task")))
        }
        async fn destroy(&self, vm: &MoRef) -> Result<TaskHandle> {
            self.vms.lock().unwrap().remove(&vm.value);
            Ok(TaskHandle(MoRef::new("Task", "destroy-task")))
        }
        async fn power_state_raw(&self, vm: &MoRef) -> Result<String> {
            self.vms
                .lock()
                .unwrap()
                .get(&vm.value)
                .map(|s| s.power_state.clone())
                .ok_or_else(|| Error::not_found(format!("VM {} not found", vm.value)))
        }
        async fn guest_tools_status(&self, _vm: &MoRef) -> Result<String> {
            Ok("toolsOk".to_string())
        }
        async fn summary(&self, vm: &MoRef) -> Result<VmSummary> {
            self.vms
                .lock()
                .unwrap()
                .get(&vm.value)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("VM {} not found", vm.value)))
        }
        async fn task_info(&self, task: &TaskHandle) -> Result<TaskInfo> {
            if task.0.value.starts_with("clone-task-") {
                let id = task.0.value.trim_start_matches("clone-task-").to_string();
                Ok(TaskInfo {
                    state: TaskState::Success,
                    error_message: None,
                    progress_percent: Some(100),
                    result: Some(MoRef::new("VirtualMachine", id)),
                })
            } else {
                Ok(TaskInfo { state: TaskState::Success, error_message: None, progress_percent: Some(100), result: None })
            }
        }
        async fn create_snapshot(&self, _vm: &MoRef, _n: &str, _d: &str, _m: bool) -> Result<(String, TaskHandle)> {
            Ok(("snapshot-1".to_string(), TaskHandle(MoRef::new("Task", "snap-task"))))
        }
        async fn remove_snapshot(&self, _snapshot_id: &str) -> Result<TaskHandle> {
            Ok(TaskHandle(MoRef::new("Task", "remove-snap-task")))
        }
        async fn revert_snapshot(&self, _vm: &MoRef, _snapshot_id: &str) -> Result<TaskHandle> {
            Ok(TaskHandle(MoRef::new("Task", "revert-snap-task")))
        }
    }

    fn provider(hypervisor: FakeHypervisor) -> VsphereProvider<FakeHypervisor> {
        VsphereProvider::new(
            hypervisor,
            ProviderDefaults {
                datastore: Some("ds-1".to_string()),
                cluster: Some("cluster-1".to_string()),
                folder: None,
                resource_pool: None,
                network: None,
            },
        )
    }

    #[tokio::test]
    async fn create_happy_path_then_describe_shows_on_and_ip() {
        let provider = provider(FakeHypervisor::with_template("ubuntu-22-04"));
        let outcome = provider
            .create(CreateArgs {
                name: "web-1".to_string(),
                class_json: r#"{"cpus": 2, "memory": "4Gi"}"#.to_string(),
                image_json: r#"{"template": "ubuntu-22-04"}"#.to_string(),
                networks_json: r#"[{"network": "vm-network"}]"#.to_string(),
                disks_json: "[]".to_string(),
                user_data: Vec::new(),
                placement_json: "{}".to_string(),
                desired_power_state: "On".to_string(),
            })
            .await
            .unwrap();
        assert!(!outcome.id.is_empty());

        let described = provider.describe(&outcome.id).await.unwrap();
        assert!(described.exists);
        assert_eq!(described.power_state, "On");
        assert_eq!(described.ips, vec!["10.0.0.5".to_string()]);
    }

    #[tokio::test]
    async fn create_with_missing_template_fails_not_found() {
        let provider = provider(FakeHypervisor::with_template("something-else"));
        let err = provider
            .create(CreateArgs {
                name: "web-1".to_string(),
                class_json: r#"{"cpus": 1, "memory": "1Gi"}"#.to_string(),
                image_json: r#"{"template": "does-not-exist"}"#.to_string(),
                networks_json: "[]".to_string(),
                disks_json: "[]".to_string(),
                user_data: Vec::new(),
                placement_json: "{}".to_string(),
                desired_power_state: "Off".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::resilience::ErrorKind::NotFound);
        assert!(err.message.contains("does-not-exist"));
    }

    #[tokio::test]
    async fn delete_is_idempotent_on_missing_vm() {
        let provider = provider(FakeHypervisor::with_template("t"));
        let outcome = provider.delete("vm-never-existed").await.unwrap();
        assert_eq!(outcome.task_ref, "");
    }

    #[tokio::test]
    async fn describe_missing_vm_reports_exists_false_not_error() {
        let provider = provider(FakeHypervisor::with_template("t"));
        let described = provider.describe("vm-missing").await.unwrap();
        assert!(!described.exists);
    }
}
