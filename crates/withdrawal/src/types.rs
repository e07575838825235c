use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Sequential request id, starting at 0.
pub type WithdrawalId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Requested,
    Advanced { challenge_period_end: u64 },
    Finalized,
}

/// A user's request to withdraw `amount` ahead of slow settlement.
///
/// `owner`, `amount` and `requested_at` never change. `liquidity_provider`,
/// `challenge_period_end` and `fee` are set together, exactly once, when the
/// request is advanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub owner: Address,
    /// Principal escrowed by the owner
    pub amount: U256,
    /// Creation timestamp (unix seconds)
    pub requested_at: u64,
    pub liquidity_provider: Option<Address>,
    pub challenge_period_end: Option<u64>,
    pub fee: Option<U256>,
    pub is_advanced: bool,
    pub is_finalized: bool,
}

impl WithdrawalRequest {
    pub const fn new(id: WithdrawalId, owner: Address, amount: U256, requested_at: u64) -> Self {
        Self {
            id,
            owner,
            amount,
            requested_at,
            liquidity_provider: None,
            challenge_period_end: None,
            fee: None,
            is_advanced: false,
            is_finalized: false,
        }
    }

    pub const fn status(&self) -> WithdrawalStatus {
        match (self.is_finalized, self.challenge_period_end) {
            (true, _) => WithdrawalStatus::Finalized,
            (false, Some(challenge_period_end)) if self.is_advanced => {
                WithdrawalStatus::Advanced {
                    challenge_period_end,
                }
            }
            _ => WithdrawalStatus::Requested,
        }
    }

    /// Amount paid to the owner when advanced (`amount - fee`).
    pub fn net_amount(&self) -> Option<U256> {
        self.fee.map(|fee| self.amount.saturating_sub(fee))
    }

    /// Open for an LP to advance.
    pub const fn is_open(&self) -> bool {
        !self.is_advanced && !self.is_finalized && self.liquidity_provider.is_none()
    }

    /// Lifecycle invariants hold for this record.
    pub const fn is_consistent(&self) -> bool {
        let finalized_implies_advanced = !self.is_finalized || self.is_advanced;
        let lp_iff_advanced = self.liquidity_provider.is_some() == self.is_advanced;
        let advance_fields_set = self.challenge_period_end.is_some() == self.is_advanced
            && self.fee.is_some() == self.is_advanced;
        finalized_implies_advanced && lp_iff_advanced && advance_fields_set
    }
}
