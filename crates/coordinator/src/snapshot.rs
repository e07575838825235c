//! Persisted bridge state.
//!
//! One JSON document holds the protocol parameters, the request table, the
//! bond table, the escrow book and the vault balances.

use alloy_primitives::{Address, U256};
use balance::Balance;
use bond::LpBond;
use config::ProtocolParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use withdrawal::{WithdrawalId, WithdrawalRequest};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(String),

    #[error("snapshot decode error: {0}")]
    Json(String),

    /// Snapshot decoded but its parts disagree
    #[error("invalid snapshot: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    pub params: ProtocolParameters,
    pub requests: Vec<WithdrawalRequest>,
    pub bonds: Vec<(Address, LpBond)>,
    pub escrow: Vec<(WithdrawalId, U256)>,
    pub balances: Vec<Balance>,
}

impl BridgeSnapshot {
    /// Empty state for `params`.
    pub const fn empty(params: ProtocolParameters) -> Self {
        Self {
            params,
            requests: Vec::new(),
            bonds: Vec::new(),
            escrow: Vec::new(),
            balances: Vec::new(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&contents)?;

        Ok(snapshot)
    }

    /// Write the snapshot to `path`, replacing it atomically.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }
}
