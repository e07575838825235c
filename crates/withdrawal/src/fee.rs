//! Protocol fee computation.

use crate::WithdrawalError;
use alloy_primitives::U256;
use config::BPS_SCALE;

/// Converts a requested amount into the fee charged when it is advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    fee_percentage: u64,
}

impl FeePolicy {
    /// `fee_percentage` is in basis points and must not exceed [`BPS_SCALE`]
    /// (checked by `ProtocolParameters::validate`).
    pub const fn new(fee_percentage: u64) -> Self {
        Self { fee_percentage }
    }

    pub const fn fee_percentage(&self) -> u64 {
        self.fee_percentage
    }

    /// `floor(amount * fee_percentage / BPS_SCALE)`.
    ///
    /// Computed as `q * rate + r * rate / SCALE` with `amount = q * SCALE + r`,
    /// which is exact and cannot overflow for any `U256` amount.
    pub fn fee(&self, amount: U256) -> Result<U256, WithdrawalError> {
        if amount.is_zero() {
            return Err(WithdrawalError::InvalidAmount);
        }

        let scale = U256::from(BPS_SCALE);
        let rate = U256::from(self.fee_percentage.min(BPS_SCALE));
        let (quotient, remainder) = amount.div_rem(scale);

        Ok(quotient * rate + remainder * rate / scale)
    }
}
