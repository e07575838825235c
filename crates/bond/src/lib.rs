//! Liquidity provider bonding.
//!
//! Tracks the collateral each LP has deposited with the bridge and decides
//! whether an LP may advance funds.

pub mod registry;

pub use registry::{BondRegistry, LpBond};

use alloy_primitives::{Address, U256};
use balance::TransferError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BondError {
    /// Deposits must be positive
    #[error("bond amount must be greater than zero")]
    InvalidAmount,

    /// Withdrawal exceeds what the LP may take out
    #[error("insufficient bond for {lp}: withdrawable {withdrawable}, requested {requested}")]
    InsufficientBond {
        lp: Address,
        withdrawable: U256,
        requested: U256,
    },

    /// LP does not hold enough bond to take on the advance
    #[error("{0} is not eligible to provide liquidity")]
    Ineligible(Address),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}
