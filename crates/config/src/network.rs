//! Network presets for the bridge.
//!
//! Each network pairs a chain with the protocol parameters the bridge is
//! deployed with there.

use crate::protocol::ProtocolParameters;
use serde::{Deserialize, Serialize};

/// Network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Mainnet,
    Testnet,
    Local,
}

/// Complete network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type
    pub network_type: NetworkType,
    /// Chain ID the bridge settles on
    pub chain_id: u64,
    /// Protocol parameters for this deployment
    pub protocol: ProtocolParameters,
}

impl NetworkConfig {
    /// Arbitrum One configuration.
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain_id: 42161,
            protocol: ProtocolParameters::mainnet(),
        }
    }

    /// Arbitrum Sepolia testnet configuration.
    pub const fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            chain_id: 421614,
            protocol: ProtocolParameters::testnet(),
        }
    }

    /// Local development chain (hardhat/anvil default chain id).
    pub const fn local() -> Self {
        Self {
            network_type: NetworkType::Local,
            chain_id: 31337,
            protocol: ProtocolParameters::local(),
        }
    }

    /// Create configuration from network type.
    pub const fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::sepolia(),
            NetworkType::Local => Self::local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_config() {
        let config = NetworkConfig::mainnet();
        assert_eq!(config.chain_id, 42161);
        assert_eq!(config.network_type, NetworkType::Mainnet);
        assert_eq!(config.protocol.challenge_duration, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_sepolia_config() {
        let config = NetworkConfig::sepolia();
        assert_eq!(config.chain_id, 421614);
        assert_eq!(config.network_type, NetworkType::Testnet);
    }

    #[test]
    fn test_from_network_type() {
        for network_type in [NetworkType::Mainnet, NetworkType::Testnet, NetworkType::Local] {
            let config = NetworkConfig::from_network_type(network_type);
            assert_eq!(config.network_type, network_type);
            assert!(config.protocol.validate().is_ok());
        }
    }

    #[test]
    fn test_network_type_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            network: NetworkType,
        }

        let parsed: Wrapper = toml::from_str(r#"network = "testnet""#).unwrap();
        assert_eq!(parsed.network, NetworkType::Testnet);
    }
}
