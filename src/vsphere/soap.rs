//! A minimal SOAP transport over vSphere's `vim25` API: `reqwest` for the
//! HTTP/TLS leg, `quick-xml` for envelope construction and response
//! extraction. There is no full vim25 binding in this crate — only the
//! handful of calls the rest of `vsphere` needs, hand-rolled as request
//! templates and small response extractors, per `DESIGN.md`.

use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::resilience::{Error, Result};

use super::client::{MoRef, TaskInfo, TaskState, VmSummary};
use super::clone_spec::CloneSpec;

const SOAP_ACTION: &str = "urn:vim25/8.0";

pub struct SoapTransport {
    http: Client,
    endpoint: Url,
}

impl SoapTransport {
    pub fn new(endpoint: Url, insecure_skip_verify: bool, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(insecure_skip_verify)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(SoapTransport { http, endpoint })
    }

    #[instrument(skip(self, body), fields(soap_action = SOAP_ACTION))]
    pub async fn call(&self, body: &str, cookie: Option<&str>) -> Result<String> {
        let envelope = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:vim25="urn:vim25">
  <soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>"#
        );

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(envelope);
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::unavailable(format!("failed to read SOAP response body: {e}")))?;

        if !status.is_success() {
            return Err(classify_soap_fault(&text, status.as_u16()));
        }
        if let Some(fault) = extract_tag(&text, "faultstring") {
            return Err(classify_fault_string(&fault));
        }
        debug!(bytes = text.len(), "SOAP call completed");
        Ok(text)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let body = format!(
            r#"<vim25:Login><_this type="SessionManager">SessionManager</_this><userName>{}</userName><password>{}</password></vim25:Login>"#,
            xml_escape(username),
            xml_escape(password)
        );
        let response = self.call(&body, None).await?;
        extract_tag(&response, "key")
            .map(|session_key| format!("vmware_soap_session={session_key}"))
            .ok_or_else(|| Error::unauthorized("Login response had no session key"))
    }

    pub async fn current_time(&self, cookie: &str) -> Result<String> {
        let body = r#"<vim25:CurrentTime><_this type="ServiceInstance">ServiceInstance</_this></vim25:CurrentTime>"#;
        let response = self.call(body, Some(cookie)).await?;
        extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable("CurrentTime response missing returnval"))
    }

    pub async fn find_by_name(&self, cookie: &str, container_type: &str, name: &str) -> Result<MoRef> {
        let body = format!(
            r#"<vim25:FindByInventoryPath><_this type="SearchIndex">SearchIndex</_this><inventoryPath>{}</inventoryPath></vim25:FindByInventoryPath>"#,
            xml_escape(name)
        );
        let response = self.call(&body, Some(cookie)).await?;
        let value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::not_found(format!("{container_type} {name:?} not found")))?;
        Ok(MoRef::new(container_type, value))
    }

    pub async fn clone_vm(
        &self,
        cookie: &str,
        template: &MoRef,
        folder: &MoRef,
        name: &str,
        spec: &CloneSpec,
    ) -> Result<MoRef> {
        let extra_config: String = spec
            .extra_config
            .iter()
            .map(|e| format!("<extraConfig><key>{}</key><value>{}</value></extraConfig>", xml_escape(&e.key), xml_escape(&e.value)))
            .collect();
        let body = format!(
            r#"<vim25:CloneVM_Task><_this type="VirtualMachine">{template}</_this><folder type="Folder">{folder}</folder><name>{name}</name><spec><powerOn>{power_on}</powerOn><template>{template_flag}</template><config>{extra_config}</config></spec></vim25:CloneVM_Task>"#,
            template = template.value,
            folder = folder.value,
            name = xml_escape(name),
            power_on = spec.power_on,
            template_flag = spec.template,
            extra_config = extra_config,
        );
        let response = self.call(&body, Some(cookie)).await?;
        let task_value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable("CloneVM_Task response missing task reference"))?;
        Ok(MoRef::new("Task", task_value))
    }

    pub async fn task_info(&self, cookie: &str, task: &MoRef) -> Result<TaskInfo> {
        let body = format!(
            r#"<vim25:RetrievePropertiesEx><_this type="PropertyCollector">propertyCollector</_this><specSet><objectSet><obj type="Task">{}</obj></objectSet></specSet></vim25:RetrievePropertiesEx>"#,
            task.value
        );
        let response = self.call(&body, Some(cookie)).await?;
        let state = match extract_tag(&response, "state").as_deref() {
            Some("success") => TaskState::Success,
            Some("error") => TaskState::Error,
            Some("running") => TaskState::Running,
            Some("queued") => TaskState::Queued,
            _ => TaskState::Running,
        };
        let result = extract_tag(&response, "result")
            .map(|value| MoRef::new("VirtualMachine", value));
        Ok(TaskInfo {
            state,
            error_message: extract_tag(&response, "localizedMessage"),
            progress_percent: extract_tag(&response, "progress").and_then(|p| p.parse().ok()),
            result,
        })
    }

    pub async fn guest_tools_status(&self, cookie: &str, vm: &MoRef) -> Result<String> {
        let property = self.retrieve_property(cookie, vm, "guest.toolsStatus").await?;
        Ok(property.unwrap_or_default())
    }

    pub async fn power_state_raw(&self, cookie: &str, vm: &MoRef) -> Result<String> {
        let property = self.retrieve_property(cookie, vm, "runtime.powerState").await?;
        property.ok_or_else(|| Error::not_found(format!("VM {} not found", vm.value)))
    }

    pub async fn summary(&self, cookie: &str, vm: &MoRef) -> Result<VmSummary> {
        let body = format!(
            r#"<vim25:RetrievePropertiesEx><_this type="PropertyCollector">propertyCollector</_this><specSet><objectSet><obj type="VirtualMachine">{}</obj></objectSet><propSet><pathSet>summary</pathSet></propSet></specSet></vim25:RetrievePropertiesEx>"#,
            vm.value
        );
        let response = self.call(&body, Some(cookie)).await?;
        if response.contains("ManagedObjectNotFound") {
            return Err(Error::not_found(format!("VM {} not found", vm.value)));
        }
        let nics = extract_all_tags(&response, "ipAddress")
            .into_iter()
            .map(|ip| super::client::GuestNic { ip_addresses: vec![ip] })
            .collect();
        Ok(VmSummary {
            power_state: extract_tag(&response, "powerState").unwrap_or_default(),
            connection_state: extract_tag(&response, "connectionState").unwrap_or_default(),
            guest_tools_status: extract_tag(&response, "toolsStatus").unwrap_or_default(),
            guest_tools_version: extract_tag(&response, "toolsVersion").unwrap_or_default(),
            hostname: extract_tag(&response, "hostName").unwrap_or_default(),
            guest_full_name: extract_tag(&response, "guestFullName").unwrap_or_default(),
            nics,
            num_cpu: extract_tag(&response, "numCpu").and_then(|v| v.parse().ok()).unwrap_or_default(),
            memory_mb: extract_tag(&response, "memorySizeMB").and_then(|v| v.parse().ok()).unwrap_or_default(),
            overall_cpu_usage_mhz: extract_tag(&response, "overallCpuUsage").and_then(|v| v.parse().ok()).unwrap_or_default(),
            guest_memory_usage_mb: extract_tag(&response, "guestMemoryUsage").and_then(|v| v.parse().ok()).unwrap_or_default(),
            uptime_seconds: extract_tag(&response, "uptimeSeconds").and_then(|v| v.parse().ok()).unwrap_or_default(),
            boot_time: extract_tag(&response, "bootTime"),
        })
    }

    async fn retrieve_property(&self, cookie: &str, vm: &MoRef, path: &str) -> Result<Option<String>> {
        let body = format!(
            r#"<vim25:RetrievePropertiesEx><_this type="PropertyCollector">propertyCollector</_this><specSet><objectSet><obj type="VirtualMachine">{}</obj></objectSet><propSet><pathSet>{}</pathSet></propSet></specSet></vim25:RetrievePropertiesEx>"#,
            vm.value, path
        );
        let response = self.call(&body, Some(cookie)).await?;
        if response.contains("ManagedObjectNotFound") {
            return Err(Error::not_found(format!("VM {} not found", vm.value)));
        }
        let leaf = path.rsplit('.').next().unwrap_or(path);
        Ok(extract_tag(&response, leaf))
    }

    pub async fn power_task(&self, cookie: &str, vm: &MoRef, method: &str) -> Result<MoRef> {
        let body = format!(
            r#"<vim25:{method}><_this type="VirtualMachine">{vm}</_this></vim25:{method}>"#,
            method = method,
            vm = vm.value
        );
        let response = self.call(&body, Some(cookie)).await?;
        let task_value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable(format!("{method} response missing task reference")))?;
        Ok(MoRef::new("Task", task_value))
    }

    pub async fn guest_op(&self, cookie: &str, vm: &MoRef, method: &str) -> Result<()> {
        let body = format!(
            r#"<vim25:{method}><_this type="VirtualMachine">{vm}</_this></vim25:{method}>"#,
            method = method,
            vm = vm.value
        );
        self.call(&body, Some(cookie)).await?;
        Ok(())
    }

    pub async fn destroy(&self, cookie: &str, vm: &MoRef) -> Result<MoRef> {
        let body = format!(
            r#"<vim25:Destroy_Task><_this type="VirtualMachine">{}</_this></vim25:Destroy_Task>"#,
            vm.value
        );
        let response = self.call(&body, Some(cookie)).await?;
        let task_value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable("Destroy_Task response missing task reference"))?;
        Ok(MoRef::new("Task", task_value))
    }

    pub async fn create_snapshot(
        &self,
        cookie: &str,
        vm: &MoRef,
        name_hint: &str,
        description: &str,
        include_memory: bool,
    ) -> Result<(String, MoRef)> {
        let body = format!(
            r#"<vim25:CreateSnapshotEx_Task><_this type="VirtualMachine">{}</_this><name>{}</name><description>{}</description><memory>{}</memory><quiesce>false</quiesce></vim25:CreateSnapshotEx_Task>"#,
            vm.value,
            xml_escape(name_hint),
            xml_escape(description),
            include_memory
        );
        let response = self.call(&body, Some(cookie)).await?;
        let task_value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable("CreateSnapshotEx_Task response missing task reference"))?;
        // The snapshot's own MoRef becomes known once the task completes; the
        // vCenter assigns it synchronously and echoes it in the task result.
        let snapshot_id = extract_tag(&response, "result").unwrap_or_else(|| task_value.clone());
        Ok((snapshot_id, MoRef::new("Task", task_value)))
    }

    pub async fn remove_snapshot(&self, cookie: &str, snapshot: &MoRef) -> Result<MoRef> {
        let body = format!(
            r#"<vim25:RemoveSnapshot_Task><_this type="VirtualMachineSnapshot">{}</_this><removeChildren>false</removeChildren></vim25:RemoveSnapshot_Task>"#,
            snapshot.value
        );
        let response = self.call(&body, Some(cookie)).await?;
        let task_value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable("RemoveSnapshot_Task response missing task reference"))?;
        Ok(MoRef::new("Task", task_value))
    }

    pub async fn revert_snapshot(&self, cookie: &str, snapshot: &MoRef) -> Result<MoRef> {
        let body = format!(
            r#"<vim25:RevertToSnapshot_Task><_this type="VirtualMachineSnapshot">{}</_this></vim25:RevertToSnapshot_Task>"#,
            snapshot.value
        );
        let response = self.call(&body, Some(cookie)).await?;
        let task_value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable("RevertToSnapshot_Task response missing task reference"))?;
        Ok(MoRef::new("Task", task_value))
    }
}

/// Combines [`SoapTransport`] with [`super::session::SessionManager`] into
/// the real [`super::client::HypervisorClient`] implementation.
pub struct SoapHypervisorClient {
    transport: SoapTransport,
    session: super::session::SessionManager,
}

impl SoapHypervisorClient {
    pub fn new(endpoint: Url, insecure_skip_verify: bool, credentials: crate::runtime::Credentials) -> Result<Self> {
        Ok(SoapHypervisorClient {
            transport: SoapTransport::new(endpoint, insecure_skip_verify, Duration::from_secs(30))?,
            session: super::session::SessionManager::new(credentials),
        })
    }

    async fn cookie(&self) -> Result<String> {
        self.session
            .ensure_connection(|u, p| self.transport.login(u, p))
            .await
    }
}

#[async_trait::async_trait]
impl super::client::HypervisorClient for SoapHypervisorClient {
    async fn ensure_connection(&self) -> Result<()> {
        self.cookie().await.map(|_| ())
    }

    async fn current_time(&self) -> Result<String> {
        let cookie = self.cookie().await?;
        self.transport.current_time(&cookie).await
    }

    async fn find_datacenter(&self, name: Option<&str>) -> Result<MoRef> {
        let cookie = self.cookie().await?;
        self.transport
            .find_by_name(&cookie, "Datacenter", name.unwrap_or("ha-datacenter"))
            .await
    }

    async fn find_vm_by_name(&self, _datacenter: &MoRef, name: &str) -> Result<MoRef> {
        let cookie = self.cookie().await?;
        self.transport.find_by_name(&cookie, "VirtualMachine", name).await
    }

    async fn find_cluster(&self, _datacenter: &MoRef, name: &str) -> Result<MoRef> {
        let cookie = self.cookie().await?;
        self.transport.find_by_name(&cookie, "ClusterComputeResource", name).await
    }

    async fn find_resource_pool_of_cluster(&self, cluster: &MoRef) -> Result<MoRef> {
        let cookie = self.cookie().await?;
        self.transport
            .find_by_name(&cookie, "ResourcePool", &format!("{}/Resources", cluster.value))
            .await
    }

    async fn find_datastore(&self, _datacenter: &MoRef, name: &str) -> Result<MoRef> {
        let cookie = self.cookie().await?;
        self.transport.find_by_name(&cookie, "Datastore", name).await
    }

    async fn find_folder(&self, datacenter: &MoRef, name: Option<&str>) -> Result<MoRef> {
        let cookie = self.cookie().await?;
        match name {
            Some(name) => self.transport.find_by_name(&cookie, "Folder", name).await,
            None => Ok(MoRef::new("Folder", format!("{}/vm", datacenter.value))),
        }
    }

    async fn find_network(&self, _datacenter: &MoRef, name: &str) -> Result<MoRef> {
        let cookie = self.cookie().await?;
        self.transport.find_by_name(&cookie, "Network", name).await
    }

    async fn clone_vm(
        &self,
        template: &MoRef,
        folder: &MoRef,
        name: &str,
        spec: CloneSpec,
    ) -> Result<super::client::TaskHandle> {
        let cookie = self.cookie().await?;
        self.transport
            .clone_vm(&cookie, template, folder, name, &spec)
            .await
            .map(super::client::TaskHandle)
    }

    async fn power_on(&self, vm: &MoRef) -> Result<super::client::TaskHandle> {
        let cookie = self.cookie().await?;
        self.transport.power_task(&cookie, vm, "PowerOnVM_Task").await.map(super::client::TaskHandle)
    }

    async fn power_off(&self, vm: &MoRef) -> Result<super::client::TaskHandle> {
        let cookie = self.cookie().await?;
        self.transport.power_task(&cookie, vm, "PowerOffVM_Task").await.map(super::client::TaskHandle)
    }

    async fn reboot_guest(&self, vm: &MoRef) -> Result<()> {
        let cookie = self.cookie().await?;
        self.transport.guest_op(&cookie, vm, "RebootGuest").await
    }

    async fn shutdown_guest(&self, vm: &MoRef) -> Result<()> {
        let cookie = self.cookie().await?;
        self.transport.guest_op(&cookie, vm, "ShutdownGuest").await
    }

    async fn reconfigure(&self, vm: &MoRef, spec: CloneSpec) -> Result<super::client::TaskHandle> {
        let cookie = self.cookie().await?;
        let extra_config: String = spec
            .extra_config
            .iter()
            .map(|e| format!("<extraConfig><key>{}</key><value>{}</value></extraConfig>", e.key, e.value))
            .collect();
        let body = format!(
            r#"<vim25:ReconfigVM_Task><_this type="VirtualMachine">{}</_this><spec>{}</spec></vim25:ReconfigVM_Task>"#,
            vm.value, extra_config
        );
        let response = self.transport.call(&body, Some(&cookie)).await?;
        let task_value = extract_tag(&response, "returnval")
            .ok_or_else(|| Error::unavailable("ReconfigVM_Task response missing task reference"))?;
        Ok(super::client::TaskHandle(MoRef::new("Task", task_value)))
    }

    async fn destroy(&self, vm: &MoRef) -> Result<super::client::TaskHandle> {
        let cookie = self.cookie().await?;
        self.transport.destroy(&cookie, vm).await.map(super::client::TaskHandle)
    }

    async fn power_state_raw(&self, vm: &MoRef) -> Result<String> {
        let cookie = self.cookie().await?;
        self.transport.power_state_raw(&cookie, vm).await
    }

    async fn guest_tools_status(&self, vm: &MoRef) -> Result<String> {
        let cookie = self.cookie().await?;
        self.transport.guest_tools_status(&cookie, vm).await
    }

    async fn summary(&self, vm: &MoRef) -> Result<VmSummary> {
        let cookie = self.cookie().await?;
        self.transport.summary(&cookie, vm).await
    }

    async fn task_info(&self, task: &super::client::TaskHandle) -> Result<TaskInfo> {
        let cookie = self.cookie().await?;
        self.transport.task_info(&cookie, &task.0).await
    }

    async fn create_snapshot(
        &self,
        vm: &MoRef,
        name_hint: &str,
        description: &str,
        include_memory: bool,
    ) -> Result<(String, super::client::TaskHandle)> {
        let cookie = self.cookie().await?;
        let (id, task) = self
            .transport
            .create_snapshot(&cookie, vm, name_hint, description, include_memory)
            .await?;
        Ok((id, super::client::TaskHandle(task)))
    }

    async fn remove_snapshot(&self, snapshot_id: &str) -> Result<super::client::TaskHandle> {
        let cookie = self.cookie().await?;
        self.transport
            .remove_snapshot(&cookie, &MoRef::new("VirtualMachineSnapshot", snapshot_id))
            .await
            .map(super::client::TaskHandle)
    }

    async fn revert_snapshot(&self, _vm: &MoRef, snapshot_id: &str) -> Result<super::client::TaskHandle> {
        let cookie = self.cookie().await?;
        self.transport
            .revert_snapshot(&cookie, &MoRef::new("VirtualMachineSnapshot", snapshot_id))
            .await
            .map(super::client::TaskHandle)
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(err.to_string())
    } else {
        Error::unavailable(err.to_string())
    }
}

fn classify_soap_fault(body: &str, status: u16) -> Error {
    if status == 401 || status == 403 {
        Error::unauthorized(format!("SOAP call rejected (HTTP {status})"))
    } else {
        Error::retryable(format!("SOAP call failed (HTTP {status}): {}", truncate(body, 200)))
    }
}

fn classify_fault_string(fault: &str) -> Error {
    if fault.contains("NotFound") {
        Error::not_found(fault.to_string())
    } else if fault.contains("InvalidLogin") || fault.contains("NoPermission") {
        Error::unauthorized(fault.to_string())
    } else {
        Error::retryable(fault.to_string())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        &s[..max]
    }
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Extracts the text content of the first element named `tag`, ignoring any
/// namespace prefix. Good enough for the flat response shapes this module
/// reads — this is not a general-purpose XML-to-struct mapper.
fn extract_tag(xml: &str, tag: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text = true;
    let mut buf = Vec::new();
    let mut capturing = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if local_name_matches(e.name().as_ref(), tag) => {
                capturing = true;
            }
            Ok(Event::Text(t)) if capturing => {
                return t.unescape().ok().map(|s| s.into_owned());
            }
            Ok(Event::End(e)) if local_name_matches(e.name().as_ref(), tag) => {
                capturing = false;
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn extract_all_tags(xml: &str, tag: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text = true;
    let mut buf = Vec::new();
    let mut capturing = false;
    let mut out = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if local_name_matches(e.name().as_ref(), tag) => {
                capturing = true;
            }
            Ok(Event::Text(t)) if capturing => {
                if let Ok(s) = t.unescape() {
                    out.push(s.into_owned());
                }
                capturing = false;
            }
            Ok(Event::Eof) => return out,
            Err(_) => return out,
            _ => {}
        }
        buf.clear();
    }
}

fn local_name_matches(qname: &[u8], tag: &str) -> bool {
    let s = std::str::from_utf8(qname).unwrap_or("");
    s == tag || s.rsplit(':').next() == Some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_simple_tag() {
        let xml = r#"<root><vim25:key>abc123</vim25:key></root>"#;
        assert_eq!(extract_tag(xml, "key").as_deref(), Some("abc123"));
    }

    #[test]
    fn extracts_all_matching_tags() {
        let xml = r#"<a><ipAddress>10.0.0.1</ipAddress><ipAddress>10.0.0.2</ipAddress></a>"#;
        assert_eq!(extract_all_tags(xml, "ipAddress"), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn missing_tag_returns_none() {
        let xml = r#"<root><other>x</other></root>"#;
        assert_eq!(extract_tag(xml, "key"), None);
    }
}
