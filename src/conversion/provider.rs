//! `Provider` conversion: identical shape on both sides, so this is a
//! straight structural copy with no lossy cases.

use super::{FromHub, Result, ToHub};
use crate::types::provider::{v1alpha1, v1beta1};

impl ToHub for v1alpha1::ProviderSpec {
    type Hub = v1beta1::ProviderSpec;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::ProviderSpec {
            type_: self.type_.clone(),
            endpoint: self.endpoint.clone(),
            credential_secret_ref: self.credential_secret_ref.clone(),
            insecure_skip_verify: self.insecure_skip_verify,
            defaults: self.defaults.clone(),
            rate_limit: self.rate_limit.clone(),
            runtime: self.runtime.clone(),
            health_check: self.health_check.clone(),
            connection_pool: self.connection_pool.clone(),
        })
    }
}

impl FromHub for v1alpha1::ProviderSpec {
    type Hub = v1beta1::ProviderSpec;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::ProviderSpec {
            type_: hub.type_.clone(),
            endpoint: hub.endpoint.clone(),
            credential_secret_ref: hub.credential_secret_ref.clone(),
            insecure_skip_verify: hub.insecure_skip_verify,
            defaults: hub.defaults.clone(),
            rate_limit: hub.rate_limit.clone(),
            runtime: hub.runtime.clone(),
            health_check: hub.health_check.clone(),
            connection_pool: hub.connection_pool.clone(),
        })
    }
}

impl ToHub for v1alpha1::ProviderStatus {
    type Hub = v1beta1::ProviderStatus;

    fn to_hub(&self) -> Result<Self::Hub> {
        Ok(v1beta1::ProviderStatus {
            healthy: self.healthy,
            last_health_check_time: self.last_health_check_time,
            runtime: self.runtime.clone(),
            capabilities: self.capabilities.clone(),
            version: self.version.clone(),
            conditions: self.conditions.clone(),
            observed_generation: self.observed_generation,
        })
    }
}

impl FromHub for v1alpha1::ProviderStatus {
    type Hub = v1beta1::ProviderStatus;

    fn from_hub(hub: &Self::Hub) -> Result<Self> {
        Ok(v1alpha1::ProviderStatus {
            healthy: hub.healthy,
            last_health_check_time: hub.last_health_check_time,
            runtime: hub.runtime.clone(),
            capabilities: hub.capabilities.clone(),
            version: hub.version.clone(),
            conditions: hub.conditions.clone(),
            observed_generation: hub.observed_generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::provider::{HealthCheckSpec, ProviderDefaults, ProviderType, RuntimeMode, RuntimeSpec};

    fn sample() -> v1alpha1::ProviderSpec {
        v1alpha1::ProviderSpec {
            type_: ProviderType::Vsphere,
            endpoint: "https://vcenter.example.com".into(),
            credential_secret_ref: "vsphere-creds".into(),
            insecure_skip_verify: false,
            defaults: ProviderDefaults {
                datastore: Some("ds1".into()),
                ..Default::default()
            },
            rate_limit: None,
            runtime: RuntimeSpec {
                mode: RuntimeMode::Remote,
                image: Some("virtrigaud/vsphere-provider:latest".into()),
                ..Default::default()
            },
            health_check: HealthCheckSpec::default(),
            connection_pool: None,
        }
    }

    #[test]
    fn round_trips_through_hub() {
        let alpha = sample();
        let hub = alpha.to_hub().unwrap();
        let back = v1alpha1::ProviderSpec::from_hub(&hub).unwrap();
        assert_eq!(alpha, back);
    }
}
