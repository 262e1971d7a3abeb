//! Inventory resolution: for every create-class operation,
//! resolve datacenter, template, cluster/resource-pool, datastore, folder
//! and network, in order, failing the whole operation with `NotFound` on the
//! first missing reference.

use crate::resilience::{Error, Result};

use super::client::{HypervisorClient, MoRef};

/// Everything inventory resolution produces for a create/clone request.
pub struct ResolvedInventory {
    pub datacenter: MoRef,
    pub template: MoRef,
    pub resource_pool: MoRef,
    pub datastore: MoRef,
    pub folder: MoRef,
    pub network: Option<MoRef>,
}

pub struct CreateRefs<'a> {
    pub datacenter: Option<&'a str>,
    pub template_name: &'a str,
    pub cluster: Option<&'a str>,
    pub datastore: &'a str,
    pub folder: Option<&'a str>,
    pub network: Option<&'a str>,
}

/// Resolves every reference a create/clone needs: datacenter, template,
/// cluster/resource pool, datastore, folder, network, in that order. Any
/// missing reference terminates with `NotFound`; recovery is the
/// controller's responsibility.
pub async fn resolve_for_create(
    client: &dyn HypervisorClient,
    refs: CreateRefs<'_>,
) -> Result<ResolvedInventory> {
    let datacenter = client.find_datacenter(refs.datacenter).await?;

    let template = client
        .find_vm_by_name(&datacenter, refs.template_name)
        .await
        .map_err(|e| annotate_not_found(e, refs.template_name))?;

    let resource_pool = match refs.cluster {
        Some(cluster_name) => {
            let cluster = client.find_cluster(&datacenter, cluster_name).await?;
            client.find_resource_pool_of_cluster(&cluster).await?
        }
        None => {
            return Err(Error::invalid_spec("no cluster specified to resolve a resource pool"))
        }
    };

    let datastore = client.find_datastore(&datacenter, refs.datastore).await?;

    // Fallback to the datacenter's default VM folder.
    let folder = client.find_folder(&datacenter, refs.folder).await?;

    let network = match refs.network {
        Some(name) => Some(client.find_network(&datacenter, name).await?),
        None => None,
    };

    Ok(ResolvedInventory {
        datacenter,
        template,
        resource_pool,
        datastore,
        folder,
        network,
    })
}

fn annotate_not_found(err: Error, template_name: &str) -> Error {
    if err.kind == crate::resilience::ErrorKind::NotFound && !err.message.contains(template_name) {
        Error::not_found(format!("template {template_name:?} not found: {}", err.message))
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vsphere::clone_spec::CloneSpec;
    use crate::vsphere::client::{TaskHandle, TaskInfo, VmSummary};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubClient {
        templates: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HypervisorClient for StubClient {
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
                Ok(MoRef::new("VirtualMachine", format!("vm-{name}")))
            } else {
                Err(Error::not_found(format!("no such VM {name}")))
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
        async fn find_network(&self, _dc: &MoRef, _name: &str) -> Result<MoRef> {
            Ok(MoRef::new("Network", "net-1"))
        }
        async fn clone_vm(&self, _t: &MoRef, _f: &MoRef, _n: &str, _s: CloneSpec) -> Result<TaskHandle> {
            unimplemented!()
        }
        async fn power_on(&self, _vm: &MoRef) -> Result<TaskHandle> {
            unimplemented!()
        }
        async fn power_off(&self, _vm: &MoRef) -> Result<TaskHandle> {
            unimplemented!()
        }
        async fn reboot_guest(&self, _vm: &MoRef) -> Result<()> {
            unimplemented!()
        }
        async fn shutdown_guest(&self, _vm: &MoRef) -> Result<()> {
            unimplemented!()
        }
        async fn reconfigure(&self, _vm: &MoRef, _s: CloneSpec) -> Result<TaskHandle> {
            unimplemented!()
        }
        async fn destroy(&self, _vm: &MoRef) -> Result<TaskHandle> {
            unimplemented!()
        }
        async fn power_state_raw(&self, _vm: &MoRef) -> Result<String> {
            unimplemented!()
        }
        async fn guest_tools_status(&self, _vm: &MoRef) -> Result<String> {
            unimplemented!()
        }
        async fn summary(&self, _vm: &MoRef) -> Result<VmSummary> {
            unimplemented!()
        }
        async fn task_info(&self, _task: &TaskHandle) -> Result<TaskInfo> {
            unimplemented!()
        }
        async fn create_snapshot(
            &self,
            _vm: &MoRef,
            _name_hint: &str,
            _description: &str,
            _include_memory: bool,
        ) -> Result<(String, TaskHandle)> {
            unimplemented!()
        }
        async fn remove_snapshot(&self, _snapshot_id: &str) -> Result<TaskHandle> {
            unimplemented!()
        }
        async fn revert_snapshot(&self, _vm: &MoRef, _snapshot_id: &str) -> Result<TaskHandle> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn missing_template_fails_with_not_found_mentioning_the_name() {
        let client = StubClient::default();
        let err = resolve_for_create(
            &client,
            CreateRefs {
                datacenter: None,
                template_name: "does-not-exist",
                cluster: Some("cluster"),
                datastore: "ds",
                folder: None,
                network: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, crate::resilience::ErrorKind::NotFound);
        assert!(err.message.contains("does-not-exist"));
    }

    #[tokio::test]
    async fn resolves_everything_when_present() {
        let client = StubClient {
            templates: Mutex::new(vec!["ubuntu-22-04".to_string()]),
        };
        let resolved = resolve_for_create(
            &client,
            CreateRefs {
                datacenter: None,
                template_name: "ubuntu-22-04",
                cluster: Some("cluster"),
                datastore: "ds",
                folder: None,
                network: Some("vm-network"),
            },
        )
        .await
        .unwrap();
        assert_eq!(resolved.template.value, "vm-ubuntu-22-04");
        assert!(resolved.network.is_some());
    }
}
