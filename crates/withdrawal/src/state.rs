use crate::{
    clock::ChallengeClock,
    ledger::WithdrawalLedger,
    types::{WithdrawalId, WithdrawalStatus},
};
use alloy_primitives::{Address, U256};
use std::ops::Range;
use tracing::debug;

/// Scans the ledger for requests a client can act on.
pub struct WithdrawalScanner<'a> {
    ledger: &'a WithdrawalLedger,
}

/// A request that has not been finalized yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWithdrawal {
    pub id: WithdrawalId,
    pub owner: Address,
    pub amount: U256,
    pub liquidity_provider: Option<Address>,
    pub status: WithdrawalStatus,
    /// Seconds until finalization is allowed, `None` while not advanced
    pub time_remaining: Option<u64>,
}

impl PendingWithdrawal {
    /// Advanced and past its challenge period.
    pub const fn is_ready(&self) -> bool {
        matches!(self.time_remaining, Some(0))
    }
}

impl<'a> WithdrawalScanner<'a> {
    pub const fn new(ledger: &'a WithdrawalLedger) -> Self {
        Self { ledger }
    }

    /// Every unfinalized request with an id in `range`, with its status as of
    /// `now`.
    ///
    /// The upper bound is clamped to the ledger's count, so `0..u64::MAX`
    /// scans everything.
    pub fn pending_withdrawals(
        &self,
        range: Range<WithdrawalId>,
        now: u64,
    ) -> Vec<PendingWithdrawal> {
        let end = range.end.min(self.ledger.count());
        let start = range.start.min(end);

        debug!(from = start, to = end, "Scanning for pending withdrawals");

        let mut pending = Vec::new();
        for id in start..end {
            // ids below count always exist
            let Ok(request) = self.ledger.get(id) else {
                continue;
            };

            // Skip finalized requests - nothing to do
            if request.is_finalized {
                continue;
            }

            pending.push(PendingWithdrawal {
                id,
                owner: request.owner,
                amount: request.amount,
                liquidity_provider: request.liquidity_provider,
                status: request.status(),
                time_remaining: ChallengeClock::time_remaining(&request, now).ok(),
            });
        }

        debug!(count = pending.len(), "Pending withdrawals after filtering");
        pending
    }

    /// Requests still waiting for an LP.
    pub fn pending_advances(&self, now: u64) -> Vec<WithdrawalId> {
        self.pending_withdrawals(0..WithdrawalId::MAX, now)
            .into_iter()
            .filter(|pending| pending.status == WithdrawalStatus::Requested)
            .map(|pending| pending.id)
            .collect()
    }

    /// Advanced requests whose challenge period elapsed, for any LP.
    pub fn ready_to_finalize(&self, now: u64) -> Vec<WithdrawalId> {
        self.pending_withdrawals(0..WithdrawalId::MAX, now)
            .into_iter()
            .filter(PendingWithdrawal::is_ready)
            .map(|pending| pending.id)
            .collect()
    }

    /// Requests advanced by `lp` that it can finalize now.
    pub fn finalizable_for(&self, lp: Address, now: u64) -> Vec<WithdrawalId> {
        self.pending_withdrawals(0..WithdrawalId::MAX, now)
            .into_iter()
            .filter(|pending| pending.liquidity_provider == Some(lp) && pending.is_ready())
            .map(|pending| pending.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const OWNER: Address = address!("00000000000000000000000000000000000a11ce");
    const LP_A: Address = address!("000000000000000000000000000000000000000a");
    const LP_B: Address = address!("000000000000000000000000000000000000000b");

    /// 0: open, 1: advanced by A ending at 100, 2: advanced by B ending at 200,
    /// 3: finalized (A), 4: open
    fn populated_ledger() -> WithdrawalLedger {
        let ledger = WithdrawalLedger::new();
        for _ in 0..5 {
            ledger.create(OWNER, U256::from(1_000), 0).unwrap();
        }
        ledger.mark_advanced(1, LP_A, U256::from(10), 100).unwrap();
        ledger.mark_advanced(2, LP_B, U256::from(10), 200).unwrap();
        ledger.mark_advanced(3, LP_A, U256::from(10), 50).unwrap();
        ledger.mark_finalized(3).unwrap();
        ledger
    }

    #[test]
    fn test_pending_skips_finalized() {
        let ledger = populated_ledger();
        let scanner = WithdrawalScanner::new(&ledger);

        let pending = scanner.pending_withdrawals(0..u64::MAX, 150);
        let ids: Vec<_> = pending.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 4]);

        assert_eq!(pending[0].time_remaining, None);
        assert_eq!(pending[1].time_remaining, Some(0));
        assert_eq!(pending[2].time_remaining, Some(50));
    }

    #[test]
    fn test_range_is_clamped() {
        let ledger = populated_ledger();
        let scanner = WithdrawalScanner::new(&ledger);

        assert_eq!(scanner.pending_withdrawals(1..3, 0).len(), 2);
        assert!(scanner.pending_withdrawals(10..20, 0).is_empty());
        assert!(scanner.pending_withdrawals(Range { start: 3, end: 1 }, 0).is_empty());
    }

    #[test]
    fn test_pending_advances() {
        let ledger = populated_ledger();
        let scanner = WithdrawalScanner::new(&ledger);
        assert_eq!(scanner.pending_advances(0), vec![0, 4]);
    }

    #[test]
    fn test_ready_to_finalize_follows_clock() {
        let ledger = populated_ledger();
        let scanner = WithdrawalScanner::new(&ledger);

        assert!(scanner.ready_to_finalize(99).is_empty());
        assert_eq!(scanner.ready_to_finalize(100), vec![1]);
        assert_eq!(scanner.ready_to_finalize(200), vec![1, 2]);
    }

    #[test]
    fn test_finalizable_for_lp() {
        let ledger = populated_ledger();
        let scanner = WithdrawalScanner::new(&ledger);

        assert_eq!(scanner.finalizable_for(LP_A, 500), vec![1]);
        assert_eq!(scanner.finalizable_for(LP_B, 500), vec![2]);
        assert!(scanner.finalizable_for(LP_B, 199).is_empty());
        assert!(scanner.finalizable_for(OWNER, 500).is_empty());
    }
}
