//! Executable bridge actions.
//!
//! Each action wraps one coordinator operation behind a common
//! check-then-execute interface, so the CLI and the keeper can ask whether
//! an operation would go through before attempting it.

pub mod advance;
pub mod bond;
pub mod finalize;
pub mod request;

pub use advance::AdvanceAction;
pub use bond::{BondAction, BondDirection};
pub use finalize::FinalizeAction;
pub use request::RequestAction;

use alloy_primitives::{Address, U256};
use coordinator::{Advance, Finalization};
use withdrawal::WithdrawalId;

/// Trait for executable bridge actions.
pub trait Action: Send + Sync {
    /// Check to see if the action is ready to be executed.
    ///
    /// Returns true if all preconditions are met.
    fn is_ready(&self) -> eyre::Result<bool>;

    /// Check if the action has already been completed.
    ///
    /// Returns true if the action was already executed successfully.
    fn is_completed(&self) -> eyre::Result<bool>;

    /// Execute the action.
    fn execute(&mut self) -> eyre::Result<Outcome>;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

/// Result of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Requested { id: WithdrawalId, amount: U256 },
    Advanced(Advance),
    Finalized(Finalization),
    /// Bond deposit or withdrawal, with the LP's new bonded amount
    Bonded { lp: Address, bonded: U256 },
}

#[cfg(test)]
pub(crate) mod test_utils {
    use alloy_primitives::{address, Address, U256};
    use balance::{Account, Vault};
    use config::{ExposurePolicy, ProtocolParameters};
    use coordinator::BridgeCoordinator;
    use std::sync::Arc;
    use withdrawal::ManualClock;

    pub const OWNER: Address = address!("00000000000000000000000000000000000a11ce");
    pub const LP: Address = address!("0000000000000000000000000000000000001111");

    pub type TestBridge = BridgeCoordinator<Vault, Arc<ManualClock>>;

    /// Bridge at t=1000 with 100 bp fee, 1000 wei minimum bond and a 60 s
    /// challenge window. OWNER and LP hold 10_000 wei each.
    pub fn bridge() -> TestBridge {
        bridge_with(ExposurePolicy::default())
    }

    pub fn bridge_with(exposure_policy: ExposurePolicy) -> TestBridge {
        let vault = Vault::new();
        vault.credit(Account::External(OWNER), U256::from(10_000));
        vault.credit(Account::External(LP), U256::from(10_000));

        let params = ProtocolParameters {
            fee_percentage: 100,
            minimum_bond: U256::from(1_000),
            challenge_duration: 60,
            exposure_policy,
        };
        BridgeCoordinator::new(params, vault, Arc::new(ManualClock::new(1_000))).unwrap()
    }
}
