//! Withdrawal requests and their lifecycle.
//!
//! This crate provides:
//! - The [`WithdrawalRequest`] record and its `Requested → Advanced → Finalized` lifecycle
//! - [`FeePolicy`], converting a requested amount into the protocol fee
//! - [`ChallengeClock`], the challenge-period arithmetic over a request
//! - [`WithdrawalLedger`], the authoritative store of requests
//! - A scanner for requests a client can act on

pub mod clock;
pub mod fee;
pub mod ledger;
pub mod state;
pub mod types;

pub use clock::{ChallengeClock, Clock, ManualClock, SystemClock};
pub use fee::FeePolicy;
pub use ledger::{LedgerEntry, WithdrawalLedger};
pub use state::{PendingWithdrawal, WithdrawalScanner};
pub use types::{WithdrawalId, WithdrawalRequest, WithdrawalStatus};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    /// Amounts must be positive
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

    /// Restored request table does not start at 0 or has gaps
    #[error("request table out of sequence: expected id {expected}, found {found}")]
    OutOfSequence {
        expected: WithdrawalId,
        found: WithdrawalId,
    },

    /// Restored request violates the lifecycle invariants
    #[error("withdrawal request {0} has inconsistent lifecycle fields")]
    Inconsistent(WithdrawalId),
}
