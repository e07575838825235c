use alloy_primitives::U256;
use config::{
    ConfigError, ExposurePolicy, NetworkConfig, NetworkType, ProtocolParameters,
    ProtocolParametersBuilder,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network preset the protocol parameters start from
    #[serde(default = "default_network")]
    pub network: NetworkType,

    /// Per-field overrides of the preset's protocol parameters
    #[serde(default)]
    pub protocol: ProtocolOverrides,

    /// Bridge state file, created on first use
    pub state_path: PathBuf,

    /// Seconds between keeper cycles
    #[serde(default = "default_keeper_interval")]
    pub keeper_interval_secs: u64,

    /// Prometheus exporter port, disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Log actions without executing them
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolOverrides {
    pub fee_percentage: Option<u64>,
    pub minimum_bond: Option<U256>,
    pub challenge_duration: Option<u64>,
    pub exposure_policy: Option<ExposurePolicy>,
}

const fn default_network() -> NetworkType {
    NetworkType::Local
}

const fn default_keeper_interval() -> u64 {
    30
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    pub const fn network_config(&self) -> NetworkConfig {
        NetworkConfig::from_network_type(self.network)
    }

    /// Preset parameters for the network with the overrides applied.
    pub fn protocol_parameters(&self) -> Result<ProtocolParameters, ConfigError> {
        let mut builder = ProtocolParametersBuilder::from_params(self.network_config().protocol);

        if let Some(bps) = self.protocol.fee_percentage {
            builder = builder.fee_percentage(bps);
        }
        if let Some(amount) = self.protocol.minimum_bond {
            builder = builder.minimum_bond(amount);
        }
        if let Some(secs) = self.protocol.challenge_duration {
            builder = builder.challenge_duration(secs);
        }
        if let Some(policy) = self.protocol.exposure_policy {
            builder = builder.exposure_policy(policy);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_local_preset() {
        let config: Config = toml::from_str(r#"state_path = "state.json""#).unwrap();

        assert_eq!(config.network, NetworkType::Local);
        assert_eq!(config.keeper_interval_secs, 30);
        assert_eq!(config.metrics_port, None);
        assert!(!config.dry_run);
        assert_eq!(config.protocol_parameters().unwrap(), ProtocolParameters::local());
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let config: Config = toml::from_str(
            r#"
            network = "mainnet"
            state_path = "/var/lib/bridge/state.json"
            metrics_port = 9090

            [protocol]
            fee_percentage = 50
            exposure_policy = "collateralized"
            "#,
        )
        .unwrap();

        let params = config.protocol_parameters().unwrap();
        assert_eq!(params.fee_percentage, 50);
        assert_eq!(params.exposure_policy, ExposurePolicy::Collateralized);
        assert_eq!(
            params.challenge_duration,
            ProtocolParameters::mainnet().challenge_duration
        );
        assert_eq!(config.metrics_port, Some(9090));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let config: Config = toml::from_str(
            r#"
            state_path = "state.json"

            [protocol]
            challenge_duration = 0
            "#,
        )
        .unwrap();

        assert_eq!(
            config.protocol_parameters(),
            Err(ConfigError::ZeroChallengeDuration)
        );
    }
}
