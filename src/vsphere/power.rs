//! Power operations and the graceful-shutdown protocol.

use std::time::Duration;

use tracing::{info, warn};

use crate::resilience::{Error, Result};
use crate::rpc::backend::PowerOp;

use super::client::{HypervisorClient, MoRef, TaskHandle};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_GRACEFUL_TIMEOUT_SECS: u32 = 60;

/// Guest-tools statuses that make a graceful shutdown attempt worthwhile
///.
fn tools_usable(status: &str) -> bool {
    matches!(status, "toolsOk" | "toolsOld")
}

/// An empty `task_ref` means the call already completed synchronously.
pub struct PowerOutcome {
    pub task_ref: String,
}

pub async fn apply(
    client: &dyn HypervisorClient,
    vm: &MoRef,
    op: PowerOp,
    graceful_timeout_seconds: u32,
) -> Result<PowerOutcome> {
    match op {
        PowerOp::On => {
            let task = client.power_on(vm).await?;
            Ok(PowerOutcome { task_ref: task.task_ref().to_string() })
        }
        PowerOp::Off => {
            let task = client.power_off(vm).await?;
            Ok(PowerOutcome { task_ref: task.task_ref().to_string() })
        }
        PowerOp::Reboot => {
            client.reboot_guest(vm).await?;
            Ok(PowerOutcome { task_ref: String::new() })
        }
        PowerOp::ShutdownGraceful => graceful_shutdown(client, vm, graceful_timeout_seconds).await,
    }
}

async fn graceful_shutdown(
    client: &dyn HypervisorClient,
    vm: &MoRef,
    graceful_timeout_seconds: u32,
) -> Result<PowerOutcome> {
    let timeout = if graceful_timeout_seconds == 0 {
        Duration::from_secs(DEFAULT_GRACEFUL_TIMEOUT_SECS as u64)
    } else {
        Duration::from_secs(graceful_timeout_seconds as u64)
    };

    let tools_status = client.guest_tools_status(vm).await?;
    if !tools_usable(&tools_status) {
        info!(vm = %vm.id(), tools_status, "guest tools unusable, falling back to hard power-off");
        return hard_power_off_and_wait(client, vm).await;
    }

    if let Err(e) = client.shutdown_guest(vm).await {
        warn!(vm = %vm.id(), error = %e, "ShutdownGuest failed to initiate, falling back to hard power-off");
        return hard_power_off_and_wait(client, vm).await;
    }

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let state = client.power_state_raw(vm).await?;
        if state == "poweredOff" {
            return Ok(PowerOutcome { task_ref: String::new() });
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(vm = %vm.id(), "graceful shutdown timed out, falling back to hard power-off");
            return hard_power_off_and_wait(client, vm).await;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// The provider never reports a graceful-shutdown fallback as a failure when
/// it succeeds — only the final hard power-off error, if any,
/// propagates.
async fn hard_power_off_and_wait(client: &dyn HypervisorClient, vm: &MoRef) -> Result<PowerOutcome> {
    let _task: TaskHandle = client.power_off(vm).await?;
    Ok(PowerOutcome { task_ref: String::new() })
}
