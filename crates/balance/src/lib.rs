//! Value custody for the bridge.
//!
//! This crate provides the value-transfer primitive the bridge moves funds
//! with, an in-memory [`Vault`] implementing it, and the per-request
//! [`EscrowBook`] that records which principal sits in custody for which
//! withdrawal.

pub mod escrow;
pub mod vault;

pub use escrow::{EscrowBook, EscrowError};
pub use vault::Vault;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A place value can be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum Account {
    /// A user or LP balance outside the bridge
    External(Address),
    /// Escrowed withdrawal principal
    Custody,
    /// LP bonds
    BondCustody,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External(address) => write!(f, "{address}"),
            Self::Custody => f.write_str("custody"),
            Self::BondCustody => f.write_str("bond-custody"),
        }
    }
}

/// Balance of one account at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The account holding the balance
    pub holder: Account,
    /// The balance amount
    pub amount: U256,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Source account cannot cover the transfer
    #[error("insufficient balance in {account}: available {available}, required {required}")]
    InsufficientBalance {
        account: Account,
        available: U256,
        required: U256,
    },

    /// The counterparty refused the transfer
    #[error("transfer rejected by {0}")]
    Rejected(Account),
}

/// Moves value between accounts.
///
/// A failed transfer moves nothing. Transferring zero always succeeds.
pub trait Transfer: Send + Sync {
    /// Move `amount` from `from` to `to`.
    fn transfer(&self, from: Account, to: Account, amount: U256) -> Result<(), TransferError>;

    /// Current balance of `account`.
    fn balance_of(&self, account: Account) -> U256;
}

impl<T: Transfer + ?Sized> Transfer for std::sync::Arc<T> {
    fn transfer(&self, from: Account, to: Account, amount: U256) -> Result<(), TransferError> {
        (**self).transfer(from, to, amount)
    }

    fn balance_of(&self, account: Account) -> U256 {
        (**self).balance_of(account)
    }
}
