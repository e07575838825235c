//! Per-request escrow accounting.
//!
//! Every unit of value in [`Account::Custody`] belongs to exactly one
//! withdrawal request. The book records that mapping once the principal is
//! in custody, and pays each entry out at most once.

use crate::{Account, Transfer, TransferError};
use alloy_primitives::U256;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// Principal for this request was already escrowed
    #[error("escrow for request {0} already held")]
    AlreadyHeld(u64),

    /// No principal is held for this request
    #[error("no escrow held for request {0}")]
    NotHeld(u64),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Escrowed principal keyed by request id.
#[derive(Debug, Default)]
pub struct EscrowBook {
    held: Mutex<BTreeMap<u64, U256>>,
}

impl EscrowBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the book from captured `(request id, amount)` entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (u64, U256)>) -> Self {
        Self {
            held: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Record `amount`, already moved into custody, as the principal of
    /// request `id`.
    pub fn record(&self, id: u64, amount: U256) -> Result<(), EscrowError> {
        let mut held = self.held.lock();
        if held.contains_key(&id) {
            return Err(EscrowError::AlreadyHeld(id));
        }
        held.insert(id, amount);

        debug!(request_id = id, amount = %amount, "Escrow held");
        Ok(())
    }

    /// Pay the principal of request `id` out of custody to `recipient`.
    ///
    /// The entry is removed only once the transfer succeeded, so a failed
    /// release can be retried.
    pub fn release<T: Transfer + ?Sized>(
        &self,
        transfer: &T,
        id: u64,
        recipient: Account,
    ) -> Result<U256, EscrowError> {
        let mut held = self.held.lock();
        let amount = *held.get(&id).ok_or(EscrowError::NotHeld(id))?;

        transfer.transfer(Account::Custody, recipient, amount)?;
        held.remove(&id);

        debug!(request_id = id, recipient = %recipient, amount = %amount, "Escrow released");
        Ok(amount)
    }

    /// Principal currently held for request `id`.
    pub fn held(&self, id: u64) -> Option<U256> {
        self.held.lock().get(&id).copied()
    }

    /// Sum of all held principal.
    pub fn total(&self) -> U256 {
        self.held
            .lock()
            .values()
            .fold(U256::ZERO, |acc, amount| acc.saturating_add(*amount))
    }

    /// All entries, ordered by request id.
    pub fn entries(&self) -> Vec<(u64, U256)> {
        self.held
            .lock()
            .iter()
            .map(|(id, amount)| (*id, *amount))
            .collect()
    }
}
