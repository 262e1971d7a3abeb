//! Harness configuration loaded from the environment.

use std::time::Duration;

use serde::Deserialize;

use crate::resilience::ResilienceConfig;

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Provider-CRD-sourced defaults passed down to the process.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderDefaults {
    #[serde(default)]
    pub datastore: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub resource_pool: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// Everything a provider process reads from its environment and filesystem
/// at startup. Rotation requires a pod restart, so this is
/// loaded once and never refreshed.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub provider_endpoint: String,
    pub tls_insecure_skip_verify: bool,
    pub defaults: ProviderDefaults,
    pub grpc_listen_addr: String,
    pub admin_listen_addr: String,
    pub resilience: ResilienceConfig,
    pub provider_type: String,
    pub provider_name: String,
}

impl HarnessConfig {
    /// Loads from the process environment. `PROVIDER_ENDPOINT` is mandatory;
    /// everything else falls back to a sane default so a minimally-configured
    /// process still starts.
    pub fn from_env() -> crate::error::Result<Self> {
        let provider_endpoint = env_string("PROVIDER_ENDPOINT")
            .ok_or_else(|| crate::error::Error::Config("PROVIDER_ENDPOINT is required".into()))?;

        Ok(HarnessConfig {
            provider_endpoint,
            tls_insecure_skip_verify: env_bool("TLS_INSECURE_SKIP_VERIFY", false),
            defaults: ProviderDefaults {
                datastore: env_string("PROVIDER_DEFAULT_DATASTORE"),
                cluster: env_string("PROVIDER_DEFAULT_CLUSTER"),
                folder: env_string("PROVIDER_DEFAULT_FOLDER"),
                resource_pool: env_string("PROVIDER_DEFAULT_RESOURCE_POOL"),
                network: env_string("PROVIDER_DEFAULT_NETWORK"),
            },
            grpc_listen_addr: env_string("GRPC_LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:9443".to_string()),
            admin_listen_addr: env_string("ADMIN_LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            resilience: ResilienceConfig::from_env(),
            provider_type: env_string("PROVIDER_TYPE").unwrap_or_else(|| "vsphere".to_string()),
            provider_name: env_string("PROVIDER_NAME").unwrap_or_else(|| "default".to_string()),
        })
    }

    pub fn describe_timeout(&self) -> Duration {
        Duration::from_secs(20)
    }

    pub fn mutating_op_timeout(&self) -> Duration {
        Duration::from_secs(300)
    }

    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_endpoint_is_a_config_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("PROVIDER_ENDPOINT");
        assert!(HarnessConfig::from_env().is_err());
    }

    #[test]
    fn defaults_are_filled_when_endpoint_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("PROVIDER_ENDPOINT", "https://vcenter.example.com/sdk");
        std::env::remove_var("TLS_INSECURE_SKIP_VERIFY");
        let config = HarnessConfig::from_env().unwrap();
        assert!(!config.tls_insecure_skip_verify);
        assert_eq!(config.grpc_listen_addr, "0.0.0.0:9443");
        std::env::remove_var("PROVIDER_ENDPOINT");
    }
}
