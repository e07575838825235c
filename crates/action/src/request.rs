use crate::{Action, Outcome};
use alloy_primitives::{Address, U256};
use balance::{Account, Transfer};
use coordinator::BridgeCoordinator;
use tracing::info;
use withdrawal::{Clock, WithdrawalId};

/// Request input data.
#[derive(Clone, Debug)]
pub struct Request {
    pub owner: Address,
    pub amount: U256,
}

pub struct RequestAction<'a, T, C> {
    bridge: &'a BridgeCoordinator<T, C>,
    action: Request,
    /// Set once the request was created
    id: Option<WithdrawalId>,
}

impl<'a, T, C> RequestAction<'a, T, C>
where
    T: Transfer,
    C: Clock,
{
    pub const fn new(bridge: &'a BridgeCoordinator<T, C>, action: Request) -> Self {
        Self {
            bridge,
            action,
            id: None,
        }
    }

    /// Id of the created request, once executed.
    pub const fn id(&self) -> Option<WithdrawalId> {
        self.id
    }
}

impl<T, C> Action for RequestAction<'_, T, C>
where
    T: Transfer,
    C: Clock,
{
    fn is_ready(&self) -> eyre::Result<bool> {
        if self.action.amount.is_zero() {
            return Ok(false);
        }

        let balance = self
            .bridge
            .transfer()
            .balance_of(Account::External(self.action.owner));
        Ok(balance >= self.action.amount)
    }

    fn is_completed(&self) -> eyre::Result<bool> {
        Ok(self.id.is_some())
    }

    fn execute(&mut self) -> eyre::Result<Outcome> {
        if self.is_completed()? {
            eyre::bail!("Withdrawal already requested")
        }

        let id = self
            .bridge
            .request_withdrawal(self.action.owner, self.action.amount)?;
        self.id = Some(id);

        info!(
            request_id = id,
            owner = %self.action.owner,
            amount = %self.action.amount,
            "Request action executed"
        );

        Ok(Outcome::Requested {
            id,
            amount: self.action.amount,
        })
    }

    fn description(&self) -> String {
        format!(
            "Requesting withdrawal of {} wei for {}",
            self.action.amount, self.action.owner
        )
    }
}
