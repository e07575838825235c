//! Advance withdrawal action.
//!
//! An LP pays the owner of an open request the net amount from its own
//! funds, starting the challenge period.

use crate::{Action, Outcome};
use alloy_primitives::Address;
use balance::{Account, Transfer};
use coordinator::BridgeCoordinator;
use tracing::info;
use withdrawal::{Clock, WithdrawalId};

/// Input data for advancing a withdrawal.
#[derive(Clone, Debug)]
pub struct Advance {
    pub id: WithdrawalId,
    /// LP paying the owner
    pub liquidity_provider: Address,
}

/// Action to advance an open withdrawal request.
pub struct AdvanceAction<'a, T, C> {
    bridge: &'a BridgeCoordinator<T, C>,
    action: Advance,
}

impl<'a, T, C> AdvanceAction<'a, T, C>
where
    T: Transfer,
    C: Clock,
{
    pub const fn new(bridge: &'a BridgeCoordinator<T, C>, action: Advance) -> Self {
        Self { bridge, action }
    }

    pub const fn id(&self) -> WithdrawalId {
        self.action.id
    }
}

impl<T, C> Action for AdvanceAction<'_, T, C>
where
    T: Transfer,
    C: Clock,
{
    fn is_ready(&self) -> eyre::Result<bool> {
        let request = self.bridge.get_withdrawal(self.action.id)?;
        if !request.is_open() {
            return Ok(false);
        }

        let lp = self.action.liquidity_provider;
        if !self.bridge.can_advance(lp, request.amount) {
            return Ok(false);
        }

        // LP must be able to pay the owner out of pocket
        let fee = self.bridge.calculate_fee(request.amount)?;
        let balance = self.bridge.transfer().balance_of(Account::External(lp));
        Ok(balance >= request.amount - fee)
    }

    fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.bridge.get_withdrawal(self.action.id)?.is_advanced)
    }

    fn execute(&mut self) -> eyre::Result<Outcome> {
        if self.is_completed()? {
            eyre::bail!("Withdrawal {} already advanced", self.action.id)
        }

        info!(
            request_id = self.action.id,
            lp = %self.action.liquidity_provider,
            "Advancing withdrawal"
        );

        let advance = self
            .bridge
            .provide_liquidity(self.action.liquidity_provider, self.action.id)?;
        Ok(Outcome::Advanced(advance))
    }

    fn description(&self) -> String {
        format!(
            "Advancing withdrawal {} from {}",
            self.action.id, self.action.liquidity_provider
        )
    }
}
