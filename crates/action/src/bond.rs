use crate::{Action, Outcome};
use alloy_primitives::{Address, U256};
use balance::{Account, Transfer};
use coordinator::BridgeCoordinator;
use tracing::info;
use withdrawal::Clock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BondDirection {
    Deposit,
    Withdraw,
}

/// Bond input data.
#[derive(Clone, Copy, Debug)]
pub struct Bond {
    pub lp: Address,
    pub value: U256,
    pub direction: BondDirection,
}

/// Action to deposit into or withdraw from an LP bond.
pub struct BondAction<'a, T, C> {
    bridge: &'a BridgeCoordinator<T, C>,
    action: Bond,
    executed: bool,
}

impl<'a, T, C> BondAction<'a, T, C>
where
    T: Transfer,
    C: Clock,
{
    pub const fn new(bridge: &'a BridgeCoordinator<T, C>, action: Bond) -> Self {
        Self {
            bridge,
            action,
            executed: false,
        }
    }
}

impl<T, C> Action for BondAction<'_, T, C>
where
    T: Transfer,
    C: Clock,
{
    fn is_ready(&self) -> eyre::Result<bool> {
        if self.action.value.is_zero() {
            return Ok(false);
        }

        let lp = self.action.lp;
        let available = match self.action.direction {
            BondDirection::Deposit => self.bridge.transfer().balance_of(Account::External(lp)),
            BondDirection::Withdraw => self.bridge.withdrawable_bond(lp),
        };
        Ok(available >= self.action.value)
    }

    fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.executed)
    }

    fn execute(&mut self) -> eyre::Result<Outcome> {
        if self.executed {
            eyre::bail!("Bond action already executed")
        }

        let Bond {
            lp,
            value,
            direction,
        } = self.action;
        let bonded = match direction {
            BondDirection::Deposit => self.bridge.deposit_bond(lp, value)?,
            BondDirection::Withdraw => self.bridge.withdraw_bond(lp, value)?,
        };
        self.executed = true;

        info!(lp = %lp, value = %value, ?direction, bonded = %bonded, "Bond action executed");
        Ok(Outcome::Bonded { lp, bonded })
    }

    fn description(&self) -> String {
        let verb = match self.action.direction {
            BondDirection::Deposit => "Depositing",
            BondDirection::Withdraw => "Withdrawing",
        };
        format!("{verb} {} wei of bond for {}", self.action.value, self.action.lp)
    }
}
