//! Configuration types for the fast-withdrawal bridge.
//!
//! This crate provides:
//! - Network presets (mainnet, Arbitrum Sepolia testnet, local)
//! - Protocol parameters (fee rate, minimum LP bond, challenge duration)
//! - Parameter validation

pub mod network;
pub mod protocol;

pub use network::{NetworkConfig, NetworkType};
pub use protocol::{
    ConfigError, ExposurePolicy, ProtocolParameters, ProtocolParametersBuilder, BPS_SCALE,
};
