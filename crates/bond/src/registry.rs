//! LP bond registry.
//!
//! Bond balances live in [`Account::BondCustody`]; the registry records how
//! much of it belongs to which LP. Every mutation of one LP's entry happens
//! under that entry's map lock, so concurrent deposits and withdrawals for
//! the same LP never lose updates while different LPs proceed independently.

use crate::BondError;
use alloy_primitives::{Address, U256};
use balance::{Account, Transfer};
use config::ExposurePolicy;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Bond state for one LP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpBond {
    /// Collateral deposited by the LP
    pub bonded_amount: U256,
    /// Principal the LP has advanced that is not yet finalized
    pub exposure: U256,
}

impl LpBond {
    /// Amount the LP may withdraw under `policy`.
    pub fn withdrawable(&self, policy: ExposurePolicy) -> U256 {
        match policy {
            ExposurePolicy::Binary => self.bonded_amount,
            ExposurePolicy::Collateralized => self.bonded_amount.saturating_sub(self.exposure),
        }
    }
}

pub struct BondRegistry {
    bonds: DashMap<Address, LpBond>,
    minimum_bond: U256,
    policy: ExposurePolicy,
}

impl BondRegistry {
    pub fn new(minimum_bond: U256, policy: ExposurePolicy) -> Self {
        Self {
            bonds: DashMap::new(),
            minimum_bond,
            policy,
        }
    }

    /// Rebuild a registry from captured entries.
    pub fn from_entries(
        minimum_bond: U256,
        policy: ExposurePolicy,
        entries: impl IntoIterator<Item = (Address, LpBond)>,
    ) -> Self {
        Self {
            bonds: entries.into_iter().collect(),
            minimum_bond,
            policy,
        }
    }

    pub const fn minimum_bond(&self) -> U256 {
        self.minimum_bond
    }

    pub const fn policy(&self) -> ExposurePolicy {
        self.policy
    }

    /// Deposit `value` from the LP's external balance into bond custody.
    ///
    /// Returns the LP's new bonded amount.
    pub fn deposit<T: Transfer + ?Sized>(
        &self,
        transfer: &T,
        lp: Address,
        value: U256,
    ) -> Result<U256, BondError> {
        if value.is_zero() {
            return Err(BondError::InvalidAmount);
        }

        let mut entry = self.bonds.entry(lp).or_default();
        transfer.transfer(Account::External(lp), Account::BondCustody, value)?;
        entry.bonded_amount = entry.bonded_amount.saturating_add(value);

        info!(lp = %lp, value = %value, bonded = %entry.bonded_amount, "Bond deposited");
        Ok(entry.bonded_amount)
    }

    /// Withdraw `value` from bond custody back to the LP.
    ///
    /// Requires `0 < value <= withdrawable`. Returns the LP's new bonded
    /// amount.
    pub fn withdraw<T: Transfer + ?Sized>(
        &self,
        transfer: &T,
        lp: Address,
        value: U256,
    ) -> Result<U256, BondError> {
        let Some(mut entry) = self.bonds.get_mut(&lp) else {
            return Err(BondError::InsufficientBond {
                lp,
                withdrawable: U256::ZERO,
                requested: value,
            });
        };

        let withdrawable = entry.withdrawable(self.policy);
        if value.is_zero() || value > withdrawable {
            return Err(BondError::InsufficientBond {
                lp,
                withdrawable,
                requested: value,
            });
        }

        transfer.transfer(Account::BondCustody, Account::External(lp), value)?;
        entry.bonded_amount -= value;

        info!(lp = %lp, value = %value, bonded = %entry.bonded_amount, "Bond withdrawn");
        Ok(entry.bonded_amount)
    }

    /// Whether the LP holds at least the minimum bond.
    pub fn is_eligible(&self, lp: Address) -> bool {
        self.balance_of(lp) >= self.minimum_bond
    }

    /// Bonded amount of `lp`, zero if it never deposited.
    pub fn balance_of(&self, lp: Address) -> U256 {
        self.bonds
            .get(&lp)
            .map(|bond| bond.bonded_amount)
            .unwrap_or_default()
    }

    /// Amount `lp` may withdraw now under the registry's policy.
    pub fn withdrawable(&self, lp: Address) -> U256 {
        self.bonds
            .get(&lp)
            .map(|bond| bond.withdrawable(self.policy))
            .unwrap_or_default()
    }

    /// Whether [`Self::reserve`] would accept `amount` for `lp` now.
    pub fn can_cover(&self, lp: Address, amount: U256) -> bool {
        let bond = self.bonds.get(&lp).map(|bond| bond.clone()).unwrap_or_default();
        self.covers(&bond, amount)
    }

    fn covers(&self, bond: &LpBond, amount: U256) -> bool {
        if bond.bonded_amount < self.minimum_bond {
            return false;
        }
        match self.policy {
            ExposurePolicy::Binary => true,
            ExposurePolicy::Collateralized => {
                bond.bonded_amount >= bond.exposure.saturating_add(amount)
            }
        }
    }

    /// Advanced, unfinalized principal attributed to `lp`.
    pub fn exposure_of(&self, lp: Address) -> U256 {
        self.bonds
            .get(&lp)
            .map(|bond| bond.exposure)
            .unwrap_or_default()
    }

    /// Check the LP may advance `amount` and record it as exposure.
    ///
    /// Under [`ExposurePolicy::Binary`] only the minimum bond is checked.
    /// Under [`ExposurePolicy::Collateralized`] the bond must also cover the
    /// existing exposure plus `amount`.
    pub fn reserve(&self, lp: Address, amount: U256) -> Result<(), BondError> {
        let mut entry = self.bonds.entry(lp).or_default();

        if !self.covers(&entry, amount) {
            debug!(
                lp = %lp,
                bonded = %entry.bonded_amount,
                exposure = %entry.exposure,
                amount = %amount,
                "Bond does not cover advance"
            );
            return Err(BondError::Ineligible(lp));
        }

        entry.exposure = entry.exposure.saturating_add(amount);
        Ok(())
    }

    /// Drop `amount` from the LP's exposure once the advance settled (or was
    /// rolled back).
    pub fn release(&self, lp: Address, amount: U256) {
        if let Some(mut entry) = self.bonds.get_mut(&lp) {
            entry.exposure = entry.exposure.saturating_sub(amount);
        }
    }

    /// Sum of all bonded amounts.
    pub fn total_bonded(&self) -> U256 {
        self.bonds
            .iter()
            .fold(U256::ZERO, |acc, bond| acc.saturating_add(bond.bonded_amount))
    }

    /// All entries, ordered by LP address.
    pub fn entries(&self) -> Vec<(Address, LpBond)> {
        let mut entries: Vec<_> = self
            .bonds
            .iter()
            .map(|bond| (*bond.key(), bond.value().clone()))
            .collect();
        entries.sort_by_key(|(lp, _)| *lp);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use balance::{TransferError, Vault};

    const LP: Address = address!("0000000000000000000000000000000000001111");

    fn funded_vault(amount: u64) -> Vault {
        let vault = Vault::new();
        vault.credit(Account::External(LP), U256::from(amount));
        vault
    }

    #[test]
    fn test_deposit_creates_entry() {
        let vault = funded_vault(500);
        let registry = BondRegistry::new(U256::from(100), ExposurePolicy::Binary);

        assert_eq!(registry.balance_of(LP), U256::ZERO);
        assert!(!registry.is_eligible(LP));

        let bonded = registry.deposit(&vault, LP, U256::from(100)).unwrap();

        assert_eq!(bonded, U256::from(100));
        assert!(registry.is_eligible(LP));
        assert_eq!(vault.balance_of(Account::BondCustody), U256::from(100));
        assert_eq!(vault.balance_of(Account::External(LP)), U256::from(400));
    }

    #[test]
    fn test_deposit_zero_rejected() {
        let vault = funded_vault(10);
        let registry = BondRegistry::new(U256::from(1), ExposurePolicy::Binary);
        assert_eq!(
            registry.deposit(&vault, LP, U256::ZERO),
            Err(BondError::InvalidAmount)
        );
    }

    #[test]
    fn test_deposit_transfer_failure_leaves_bond_untouched() {
        let vault = funded_vault(10);
        let registry = BondRegistry::new(U256::from(1), ExposurePolicy::Binary);

        let err = registry.deposit(&vault, LP, U256::from(11)).unwrap_err();
        assert!(matches!(
            err,
            BondError::Transfer(TransferError::InsufficientBalance { .. })
        ));
        assert_eq!(registry.balance_of(LP), U256::ZERO);
    }

    #[test]
    fn test_withdraw_decreases_by_exact_value() {
        let vault = funded_vault(1_000);
        let registry = BondRegistry::new(U256::from(1), ExposurePolicy::Binary);
        registry.deposit(&vault, LP, U256::from(600)).unwrap();

        for value in [1u64, 99, 250] {
            let before = registry.balance_of(LP);
            registry.withdraw(&vault, LP, U256::from(value)).unwrap();
            assert_eq!(registry.balance_of(LP), before - U256::from(value));
        }
        assert_eq!(vault.balance_of(Account::BondCustody), U256::from(250));
    }

    #[test]
    fn test_withdraw_more_than_bonded_rejected() {
        let vault = funded_vault(100);
        let registry = BondRegistry::new(U256::from(1), ExposurePolicy::Binary);
        registry.deposit(&vault, LP, U256::from(50)).unwrap();

        let err = registry.withdraw(&vault, LP, U256::from(51)).unwrap_err();
        assert_eq!(
            err,
            BondError::InsufficientBond {
                lp: LP,
                withdrawable: U256::from(50),
                requested: U256::from(51),
            }
        );
        assert_eq!(registry.balance_of(LP), U256::from(50));

        // unknown LP and zero value
        let stranger = address!("0000000000000000000000000000000000002222");
        assert!(registry.withdraw(&vault, stranger, U256::from(1)).is_err());
        assert!(registry.withdraw(&vault, LP, U256::ZERO).is_err());
    }

    #[test]
    fn test_binary_reserve_ignores_exposure() {
        let vault = funded_vault(100);
        let registry = BondRegistry::new(U256::from(10), ExposurePolicy::Binary);
        registry.deposit(&vault, LP, U256::from(10)).unwrap();

        registry.reserve(LP, U256::from(1_000)).unwrap();
        registry.reserve(LP, U256::from(1_000)).unwrap();
        assert_eq!(registry.exposure_of(LP), U256::from(2_000));

        // binary policy lets the whole bond go regardless of exposure
        registry.withdraw(&vault, LP, U256::from(10)).unwrap();
        assert_eq!(registry.reserve(LP, U256::from(1)), Err(BondError::Ineligible(LP)));
    }

    #[test]
    fn test_collateralized_reserve_and_withdraw() {
        let vault = funded_vault(1_000);
        let registry = BondRegistry::new(U256::from(10), ExposurePolicy::Collateralized);
        registry.deposit(&vault, LP, U256::from(500)).unwrap();

        registry.reserve(LP, U256::from(300)).unwrap();
        assert_eq!(
            registry.reserve(LP, U256::from(201)),
            Err(BondError::Ineligible(LP))
        );
        assert_eq!(registry.exposure_of(LP), U256::from(300));

        let err = registry.withdraw(&vault, LP, U256::from(201)).unwrap_err();
        assert!(matches!(err, BondError::InsufficientBond { .. }));
        registry.withdraw(&vault, LP, U256::from(200)).unwrap();

        registry.release(LP, U256::from(300));
        assert_eq!(registry.exposure_of(LP), U256::ZERO);
        registry.withdraw(&vault, LP, U256::from(300)).unwrap();
        assert_eq!(registry.balance_of(LP), U256::ZERO);
    }

    #[test]
    fn test_queries_match_reserve_and_withdraw() {
        let vault = funded_vault(2_000);
        let registry = BondRegistry::new(U256::from(500), ExposurePolicy::Collateralized);
        assert!(!registry.can_cover(LP, U256::from(1)));
        assert_eq!(registry.withdrawable(LP), U256::ZERO);

        registry.deposit(&vault, LP, U256::from(1_000)).unwrap();
        assert!(registry.can_cover(LP, U256::from(1_000)));
        assert!(!registry.can_cover(LP, U256::from(1_001)));

        registry.reserve(LP, U256::from(1_000)).unwrap();
        assert!(!registry.can_cover(LP, U256::from(1)));
        assert_eq!(registry.reserve(LP, U256::from(1)), Err(BondError::Ineligible(LP)));
        assert_eq!(registry.withdrawable(LP), U256::ZERO);
        assert!(registry.withdraw(&vault, LP, U256::from(500)).is_err());

        registry.release(LP, U256::from(400));
        assert_eq!(registry.withdrawable(LP), U256::from(400));
        assert!(registry.can_cover(LP, U256::from(400)));
        registry.withdraw(&vault, LP, registry.withdrawable(LP)).unwrap();

        // binary ignores exposure for both
        let binary = BondRegistry::new(U256::from(500), ExposurePolicy::Binary);
        binary.deposit(&vault, LP, U256::from(500)).unwrap();
        binary.reserve(LP, U256::from(10_000)).unwrap();
        assert!(binary.can_cover(LP, U256::from(10_000)));
        assert_eq!(binary.withdrawable(LP), U256::from(500));
    }

    #[test]
    fn test_concurrent_deposits_do_not_lose_updates() {
        let vault = funded_vault(10_000);
        let registry = BondRegistry::new(U256::from(1), ExposurePolicy::Binary);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        registry.deposit(&vault, LP, U256::from(1)).unwrap();
                    }
                });
            }
        });

        assert_eq!(registry.balance_of(LP), U256::from(800));
        assert_eq!(vault.balance_of(Account::BondCustody), U256::from(800));
        assert_eq!(registry.total_bonded(), U256::from(800));
    }
}
