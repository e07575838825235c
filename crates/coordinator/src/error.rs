use crate::snapshot::SnapshotError;
use alloy_primitives::{Address, U256};
use balance::{EscrowError, TransferError};
use bond::BondError;
use config::ConfigError;
use thiserror::Error;
use withdrawal::{WithdrawalError, WithdrawalId};

/// Every way a bridge operation can be rejected.
///
/// None of these leave a partially applied operation behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("withdrawal request {0} not found")]
    NotFound(WithdrawalId),

    #[error("withdrawal request {0} already advanced")]
    AlreadyAdvanced(WithdrawalId),

    #[error("withdrawal request {0} not advanced")]
    NotAdvanced(WithdrawalId),

    #[error("withdrawal request {0} already finalized")]
    AlreadyFinalized(WithdrawalId),

    #[error("challenge period for request {id} active, {remaining} seconds remaining")]
    ChallengePeriodActive { id: WithdrawalId, remaining: u64 },

    #[error("{0} is not eligible to provide liquidity")]
    IneligibleLP(Address),

    #[error("insufficient bond for {lp}: withdrawable {withdrawable}, requested {requested}")]
    InsufficientBond {
        lp: Address,
        withdrawable: U256,
        requested: U256,
    },

    #[error("transfer failed: {0}")]
    TransferFailed(#[source] TransferError),

    /// Custody records disagree with the ledger
    #[error("escrow for request {0} does not match the ledger")]
    EscrowMismatch(WithdrawalId),

    #[error("invalid protocol parameters: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Discriminant of [`BridgeError`], for branching and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAmount,
    NotFound,
    AlreadyAdvanced,
    NotAdvanced,
    AlreadyFinalized,
    ChallengePeriodActive,
    IneligibleLP,
    InsufficientBond,
    TransferFailed,
    EscrowMismatch,
    Config,
    Snapshot,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "invalid_amount",
            Self::NotFound => "not_found",
            Self::AlreadyAdvanced => "already_advanced",
            Self::NotAdvanced => "not_advanced",
            Self::AlreadyFinalized => "already_finalized",
            Self::ChallengePeriodActive => "challenge_period_active",
            Self::IneligibleLP => "ineligible_lp",
            Self::InsufficientBond => "insufficient_bond",
            Self::TransferFailed => "transfer_failed",
            Self::EscrowMismatch => "escrow_mismatch",
            Self::Config => "config",
            Self::Snapshot => "snapshot",
        }
    }
}

impl BridgeError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount => ErrorKind::InvalidAmount,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyAdvanced(_) => ErrorKind::AlreadyAdvanced,
            Self::NotAdvanced(_) => ErrorKind::NotAdvanced,
            Self::AlreadyFinalized(_) => ErrorKind::AlreadyFinalized,
            Self::ChallengePeriodActive { .. } => ErrorKind::ChallengePeriodActive,
            Self::IneligibleLP(_) => ErrorKind::IneligibleLP,
            Self::InsufficientBond { .. } => ErrorKind::InsufficientBond,
            Self::TransferFailed(_) => ErrorKind::TransferFailed,
            Self::EscrowMismatch(_) => ErrorKind::EscrowMismatch,
            Self::Config(_) => ErrorKind::Config,
            Self::Snapshot(_) => ErrorKind::Snapshot,
        }
    }
}

impl From<WithdrawalError> for BridgeError {
    fn from(err: WithdrawalError) -> Self {
        match err {
            WithdrawalError::InvalidAmount => Self::InvalidAmount,
            WithdrawalError::NotFound(id) => Self::NotFound(id),
            WithdrawalError::AlreadyAdvanced(id) => Self::AlreadyAdvanced(id),
            WithdrawalError::NotAdvanced(id) => Self::NotAdvanced(id),
            WithdrawalError::AlreadyFinalized(id) => Self::AlreadyFinalized(id),
            WithdrawalError::ChallengePeriodActive { id, remaining } => {
                Self::ChallengePeriodActive { id, remaining }
            }
            err @ (WithdrawalError::OutOfSequence { .. } | WithdrawalError::Inconsistent(_)) => {
                Self::Snapshot(SnapshotError::Invalid(err.to_string()))
            }
        }
    }
}

impl From<BondError> for BridgeError {
    fn from(err: BondError) -> Self {
        match err {
            BondError::InvalidAmount => Self::InvalidAmount,
            BondError::InsufficientBond {
                lp,
                withdrawable,
                requested,
            } => Self::InsufficientBond {
                lp,
                withdrawable,
                requested,
            },
            BondError::Ineligible(lp) => Self::IneligibleLP(lp),
            BondError::Transfer(err) => Self::TransferFailed(err),
        }
    }
}

impl From<TransferError> for BridgeError {
    fn from(err: TransferError) -> Self {
        Self::TransferFailed(err)
    }
}

impl From<EscrowError> for BridgeError {
    fn from(err: EscrowError) -> Self {
        match err {
            EscrowError::AlreadyHeld(id) | EscrowError::NotHeld(id) => Self::EscrowMismatch(id),
            EscrowError::Transfer(err) => Self::TransferFailed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance::Account;

    #[test]
    fn test_component_errors_keep_their_kind() {
        let cases: Vec<(BridgeError, ErrorKind)> = vec![
            (WithdrawalError::InvalidAmount.into(), ErrorKind::InvalidAmount),
            (WithdrawalError::NotFound(1).into(), ErrorKind::NotFound),
            (WithdrawalError::AlreadyAdvanced(1).into(), ErrorKind::AlreadyAdvanced),
            (WithdrawalError::NotAdvanced(1).into(), ErrorKind::NotAdvanced),
            (WithdrawalError::AlreadyFinalized(1).into(), ErrorKind::AlreadyFinalized),
            (
                WithdrawalError::ChallengePeriodActive { id: 1, remaining: 5 }.into(),
                ErrorKind::ChallengePeriodActive,
            ),
            (BondError::InvalidAmount.into(), ErrorKind::InvalidAmount),
            (BondError::Ineligible(Address::ZERO).into(), ErrorKind::IneligibleLP),
            (
                BondError::InsufficientBond {
                    lp: Address::ZERO,
                    withdrawable: U256::ZERO,
                    requested: U256::from(1),
                }
                .into(),
                ErrorKind::InsufficientBond,
            ),
            (
                TransferError::Rejected(Account::Custody).into(),
                ErrorKind::TransferFailed,
            ),
            (
                EscrowError::Transfer(TransferError::Rejected(Account::Custody)).into(),
                ErrorKind::TransferFailed,
            ),
            (EscrowError::NotHeld(3).into(), ErrorKind::EscrowMismatch),
            (WithdrawalError::Inconsistent(3).into(), ErrorKind::Snapshot),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn test_kind_labels_are_distinct() {
        let kinds = [
            ErrorKind::InvalidAmount,
            ErrorKind::NotFound,
            ErrorKind::AlreadyAdvanced,
            ErrorKind::NotAdvanced,
            ErrorKind::AlreadyFinalized,
            ErrorKind::ChallengePeriodActive,
            ErrorKind::IneligibleLP,
            ErrorKind::InsufficientBond,
            ErrorKind::TransferFailed,
            ErrorKind::EscrowMismatch,
            ErrorKind::Config,
            ErrorKind::Snapshot,
        ];
        let labels: std::collections::HashSet<_> = kinds.iter().map(ErrorKind::as_str).collect();
        assert_eq!(labels.len(), kinds.len());
    }
}
