//! Time sources and challenge-period arithmetic.

use crate::{WithdrawalError, WithdrawalRequest};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// Source of the current time in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Wall clock that never runs backwards.
///
/// Readings are clamped to the highest value returned so far, so a system
/// clock adjustment cannot shorten or reopen a challenge window.
#[derive(Debug, Default)]
pub struct SystemClock {
    high_water: AtomicU64,
}

impl SystemClock {
    pub const fn new() -> Self {
        Self {
            high_water: AtomicU64::new(0),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let previous = self.high_water.fetch_max(wall, Ordering::AcqRel);
        previous.max(wall)
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub const fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Challenge-period arithmetic over a request.
pub struct ChallengeClock;

impl ChallengeClock {
    /// Seconds until the request may be finalized.
    ///
    /// Fails with [`WithdrawalError::NotAdvanced`] if no challenge period was
    /// started.
    pub fn time_remaining(request: &WithdrawalRequest, now: u64) -> Result<u64, WithdrawalError> {
        match request.challenge_period_end {
            Some(end) if request.is_advanced => Ok(end.saturating_sub(now)),
            _ => Err(WithdrawalError::NotAdvanced(request.id)),
        }
    }

    /// Advanced and the challenge period has elapsed.
    pub fn is_ready(request: &WithdrawalRequest, now: u64) -> bool {
        matches!(Self::time_remaining(request, now), Ok(0))
    }

    /// Challenge period end for an advance made at `advanced_at`.
    pub const fn period_end(advanced_at: u64, challenge_duration: u64) -> u64 {
        advanced_at.saturating_add(challenge_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    fn advanced(end: u64) -> WithdrawalRequest {
        let mut request = WithdrawalRequest::new(7, Address::ZERO, U256::from(1), 0);
        request.is_advanced = true;
        request.liquidity_provider = Some(Address::ZERO);
        request.fee = Some(U256::ZERO);
        request.challenge_period_end = Some(end);
        request
    }

    #[test]
    fn test_time_remaining_counts_down() {
        let request = advanced(1_000);
        assert_eq!(ChallengeClock::time_remaining(&request, 400).unwrap(), 600);
        assert_eq!(ChallengeClock::time_remaining(&request, 999).unwrap(), 1);
        assert_eq!(ChallengeClock::time_remaining(&request, 1_000).unwrap(), 0);
        assert_eq!(ChallengeClock::time_remaining(&request, 5_000).unwrap(), 0);
    }

    #[test]
    fn test_ready_exactly_at_end() {
        let request = advanced(1_000);
        assert!(!ChallengeClock::is_ready(&request, 999));
        assert!(ChallengeClock::is_ready(&request, 1_000));
        assert!(ChallengeClock::is_ready(&request, 1_001));
    }

    #[test]
    fn test_not_advanced() {
        let request = WithdrawalRequest::new(7, Address::ZERO, U256::from(1), 0);
        assert_eq!(
            ChallengeClock::time_remaining(&request, 0),
            Err(WithdrawalError::NotAdvanced(7))
        );
        assert!(!ChallengeClock::is_ready(&request, u64::MAX));
    }

    #[test]
    fn test_period_end_saturates() {
        assert_eq!(ChallengeClock::period_end(100, 60), 160);
        assert_eq!(ChallengeClock::period_end(u64::MAX - 1, 60), u64::MAX);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now(), 15);
        clock.set(3);
        assert_eq!(clock.now(), 3);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
        assert!(first > 0);
    }
}
