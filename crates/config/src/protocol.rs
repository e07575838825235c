//! Protocol parameters.
//!
//! Set once at initialization and read by every component afterwards. User
//! flows never mutate them.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-point base `fee_percentage` is expressed in (basis points).
pub const BPS_SCALE: u64 = 10_000;

/// 1 ETH in wei.
const ONE_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// 0.1 ETH in wei.
const TENTH_ETHER: U256 = U256::from_limbs([100_000_000_000_000_000, 0, 0, 0]);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Fee rate above 100%
    #[error("fee percentage {0} bp exceeds {max} bp", max = BPS_SCALE)]
    FeeOutOfRange(u64),

    /// Challenge window of zero seconds
    #[error("challenge duration must be greater than zero")]
    ZeroChallengeDuration,
}

/// How LP bonds relate to the principal an LP has advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposurePolicy {
    /// Eligibility is `bond >= minimum_bond`, nothing else.
    #[default]
    Binary,
    /// The bond must also cover all advanced, unfinalized principal.
    Collateralized,
}

/// Process-wide protocol parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameters {
    /// Fee rate in basis points of the requested amount
    pub fee_percentage: u64,
    /// Minimum collateral an LP must hold to advance funds
    pub minimum_bond: U256,
    /// Seconds between an advance and the earliest finalization
    pub challenge_duration: u64,
    /// Bond coverage rule
    #[serde(default)]
    pub exposure_policy: ExposurePolicy,
}

impl ProtocolParameters {
    /// Mainnet parameters: 0.3% fee, 1 ETH bond, 7 day challenge window.
    pub const fn mainnet() -> Self {
        Self {
            fee_percentage: 30,
            minimum_bond: ONE_ETHER,
            challenge_duration: 7 * 24 * 60 * 60,
            exposure_policy: ExposurePolicy::Binary,
        }
    }

    /// Testnet parameters: 1% fee, 0.1 ETH bond, 1 hour challenge window.
    pub const fn testnet() -> Self {
        Self {
            fee_percentage: 100,
            minimum_bond: TENTH_ETHER,
            challenge_duration: 60 * 60,
            exposure_policy: ExposurePolicy::Binary,
        }
    }

    /// Local development parameters: 1% fee, 1000 wei bond, 1 minute window.
    pub const fn local() -> Self {
        Self {
            fee_percentage: 100,
            minimum_bond: U256::from_limbs([1_000, 0, 0, 0]),
            challenge_duration: 60,
            exposure_policy: ExposurePolicy::Binary,
        }
    }

    /// Check the parameters are usable.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.fee_percentage > BPS_SCALE {
            return Err(ConfigError::FeeOutOfRange(self.fee_percentage));
        }
        if self.challenge_duration == 0 {
            return Err(ConfigError::ZeroChallengeDuration);
        }
        Ok(())
    }
}

/// Builder for custom protocol parameters.
#[derive(Debug, Clone)]
pub struct ProtocolParametersBuilder {
    params: ProtocolParameters,
}

impl ProtocolParametersBuilder {
    /// Start with mainnet defaults.
    pub const fn mainnet() -> Self {
        Self {
            params: ProtocolParameters::mainnet(),
        }
    }

    /// Start with testnet defaults.
    pub const fn testnet() -> Self {
        Self {
            params: ProtocolParameters::testnet(),
        }
    }

    /// Start with local defaults.
    pub const fn local() -> Self {
        Self {
            params: ProtocolParameters::local(),
        }
    }

    /// Start from existing parameters.
    pub const fn from_params(params: ProtocolParameters) -> Self {
        Self { params }
    }

    /// Override the fee rate (basis points).
    pub const fn fee_percentage(mut self, bps: u64) -> Self {
        self.params.fee_percentage = bps;
        self
    }

    /// Override the minimum bond.
    pub const fn minimum_bond(mut self, amount: U256) -> Self {
        self.params.minimum_bond = amount;
        self
    }

    /// Override the challenge duration (seconds).
    pub const fn challenge_duration(mut self, secs: u64) -> Self {
        self.params.challenge_duration = secs;
        self
    }

    /// Override the exposure policy.
    pub const fn exposure_policy(mut self, policy: ExposurePolicy) -> Self {
        self.params.exposure_policy = policy;
        self
    }

    /// Build and validate the parameters.
    pub fn build(self) -> Result<ProtocolParameters, ConfigError> {
        self.params.validate()?;
        Ok(self.params)
    }
}
