use crate::{Account, Balance, Transfer, TransferError};
use alloy_primitives::U256;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    balances: BTreeMap<Account, U256>,
    rejecting: BTreeSet<Account>,
}

/// In-memory value store implementing [`Transfer`].
#[derive(Debug, Default)]
pub struct Vault {
    inner: Mutex<Inner>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a vault from previously captured balances.
    pub fn from_balances(balances: impl IntoIterator<Item = Balance>) -> Self {
        let vault = Self::new();
        {
            let mut inner = vault.inner.lock();
            for balance in balances {
                if !balance.amount.is_zero() {
                    inner.balances.insert(balance.holder, balance.amount);
                }
            }
        }
        vault
    }

    /// Add funds to an account from outside the system.
    pub fn credit(&self, account: Account, amount: U256) {
        debug!(account = %account, amount = %amount, "Crediting account");
        let mut inner = self.inner.lock();
        let entry = inner.balances.entry(account).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Make every transfer into or out of `account` fail with
    /// [`TransferError::Rejected`].
    pub fn reject(&self, account: Account) {
        self.inner.lock().rejecting.insert(account);
    }

    /// Undo [`Vault::reject`].
    pub fn accept(&self, account: Account) {
        self.inner.lock().rejecting.remove(&account);
    }

    /// All non-zero balances, ordered by account.
    pub fn balances(&self) -> Vec<Balance> {
        self.inner
            .lock()
            .balances
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(holder, amount)| Balance {
                holder: *holder,
                amount: *amount,
            })
            .collect()
    }
}

impl Transfer for Vault {
    fn transfer(&self, from: Account, to: Account, amount: U256) -> Result<(), TransferError> {
        if amount.is_zero() {
            return Ok(());
        }

        let mut inner = self.inner.lock();

        for account in [from, to] {
            if inner.rejecting.contains(&account) {
                return Err(TransferError::Rejected(account));
            }
        }

        let available = inner.balances.get(&from).copied().unwrap_or_default();
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                account: from,
                available,
                required: amount,
            });
        }

        inner.balances.insert(from, available - amount);
        let credited = inner.balances.entry(to).or_default();
        *credited = credited.saturating_add(amount);

        debug!(from = %from, to = %to, amount = %amount, "Transferred");
        Ok(())
    }

    fn balance_of(&self, account: Account) -> U256 {
        self.inner
            .lock()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }
}
