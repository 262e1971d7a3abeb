//! `Describe`: power-state projection and guest
//! IP filtering, plus a well-formed `providerRawJson`.

use serde::Serialize;

use crate::resilience::Result;
use crate::rpc::backend::DescribeOutcome;

use super::client::{HypervisorClient, MoRef, VmSummary};

/// Projects a vSphere-native power state onto the canonical triple. Suspended is treated as Off; anything else unknown is empty.
pub fn project_power_state(raw: &str) -> &'static str {
    match raw {
        "poweredOn" => "On",
        "poweredOff" | "suspended" => "Off",
        _ => "",
    }
}

/// `true` for loopback and link-local addresses that must never appear in a
/// VM's reported IP list.
pub fn is_filtered_ip(ip: &str) -> bool {
    ip == "127.0.0.1"
        || ip == "::1"
        || ip.starts_with("169.254.")
        || ip.starts_with("fe80:")
}

#[derive(Serialize)]
struct ProviderRaw<'a> {
    guest_full_name: &'a str,
    hostname: &'a str,
    guest_tools_status: &'a str,
    guest_tools_version: &'a str,
    connection_state: &'a str,
    num_cpu: i32,
    memory_mb: i32,
    overall_cpu_usage_mhz: i32,
    guest_memory_usage_mb: i32,
    uptime_seconds: i64,
    boot_time: &'a Option<String>,
}

pub async fn describe(client: &dyn HypervisorClient, vm: &MoRef) -> Result<DescribeOutcome> {
    // Missing VM -> exists=false, never an error.
    let summary: VmSummary = match client.summary(vm).await {
        Ok(s) => s,
        Err(e) if e.kind == crate::resilience::ErrorKind::NotFound => {
            return Ok(DescribeOutcome::default())
        }
        Err(e) => return Err(e),
    };

    let mut ips: Vec<String> = Vec::new();
    for nic in &summary.nics {
        for ip in &nic.ip_addresses {
            if !is_filtered_ip(ip) {
                ips.push(ip.clone());
            }
        }
    }

    let raw = ProviderRaw {
        guest_full_name: &summary.guest_full_name,
        hostname: &summary.hostname,
        guest_tools_status: &summary.guest_tools_status,
        guest_tools_version: &summary.guest_tools_version,
        connection_state: &summary.connection_state,
        num_cpu: summary.num_cpu,
        memory_mb: summary.memory_mb,
        overall_cpu_usage_mhz: summary.overall_cpu_usage_mhz,
        guest_memory_usage_mb: summary.guest_memory_usage_mb,
        uptime_seconds: summary.uptime_seconds,
        boot_time: &summary.boot_time,
    };
    let provider_raw_json = serde_json::to_string(&raw)
        .map_err(|e| crate::resilience::Error::retryable(format!("failed to serialize provider raw detail: {e}")))?;

    Ok(DescribeOutcome {
        exists: true,
        power_state: project_power_state(&summary.power_state).to_string(),
        ips,
        console_url: String::new(),
        provider_raw_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_known_states() {
        assert_eq!(project_power_state("poweredOn"), "On");
        assert_eq!(project_power_state("poweredOff"), "Off");
        assert_eq!(project_power_state("suspended"), "Off");
        assert_eq!(project_power_state("invalid"), "");
    }

    #[test]
    fn filters_loopback_and_link_local() {
        assert!(is_filtered_ip("127.0.0.1"));
        assert!(is_filtered_ip("::1"));
        assert!(is_filtered_ip("169.254.1.5"));
        assert!(is_filtered_ip("fe80::1"));
        assert!(!is_filtered_ip("10.0.0.5"));
    }
}
