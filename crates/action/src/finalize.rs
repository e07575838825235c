//! Finalize withdrawal action.
//!
//! Releases the escrowed principal of an advanced request to its LP once the
//! challenge period elapsed.

use crate::{Action, Outcome};
use balance::Transfer;
use coordinator::BridgeCoordinator;
use tracing::info;
use withdrawal::{ChallengeClock, Clock, WithdrawalId};

/// Action to finalize an advanced withdrawal.
pub struct FinalizeAction<'a, T, C> {
    bridge: &'a BridgeCoordinator<T, C>,
    id: WithdrawalId,
}

impl<'a, T, C> FinalizeAction<'a, T, C>
where
    T: Transfer,
    C: Clock,
{
    pub const fn new(bridge: &'a BridgeCoordinator<T, C>, id: WithdrawalId) -> Self {
        Self { bridge, id }
    }

    pub const fn id(&self) -> WithdrawalId {
        self.id
    }
}

impl<T, C> Action for FinalizeAction<'_, T, C>
where
    T: Transfer,
    C: Clock,
{
    fn is_ready(&self) -> eyre::Result<bool> {
        let request = self.bridge.get_withdrawal(self.id)?;

        // Not ready if already finalized
        if request.is_finalized {
            return Ok(false);
        }

        Ok(ChallengeClock::is_ready(&request, self.bridge.clock().now()))
    }

    fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.bridge.get_withdrawal(self.id)?.is_finalized)
    }

    fn execute(&mut self) -> eyre::Result<Outcome> {
        if self.is_completed()? {
            eyre::bail!("Withdrawal {} already finalized", self.id)
        }

        let finalization = self.bridge.finalize_withdrawal(self.id)?;

        info!(
            request_id = self.id,
            lp = %finalization.liquidity_provider,
            amount = %finalization.amount,
            "Finalize action executed"
        );

        Ok(Outcome::Finalized(finalization))
    }

    fn description(&self) -> String {
        format!("Finalizing withdrawal {}", self.id)
    }
}
