//! Authoritative store of withdrawal requests.
//!
//! Requests live in a table indexed by their sequential id. Each request has
//! its own lock: a state transition on one id never waits on another, and all
//! checks and writes of one transition happen under a single acquisition of
//! that lock. The table lock is held only to append or to look up an entry.

use crate::{
    types::{WithdrawalId, WithdrawalRequest},
    WithdrawalError,
};
use alloy_primitives::{Address, U256};
use parking_lot::{Mutex, RwLock};
use std::{ops::Deref, sync::Arc};
use tracing::debug;

/// A request under its entry lock.
///
/// Read access to every field, write access only through the lifecycle
/// transitions.
#[derive(Debug)]
pub struct LedgerEntry(WithdrawalRequest);

impl Deref for LedgerEntry {
    type Target = WithdrawalRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl LedgerEntry {
    /// `Requested → Advanced`: assign the LP, fee and challenge end.
    pub fn mark_advanced(
        &mut self,
        lp: Address,
        fee: U256,
        challenge_period_end: u64,
    ) -> Result<(), WithdrawalError> {
        if self.0.is_advanced {
            return Err(WithdrawalError::AlreadyAdvanced(self.0.id));
        }

        self.0.liquidity_provider = Some(lp);
        self.0.fee = Some(fee);
        self.0.challenge_period_end = Some(challenge_period_end);
        self.0.is_advanced = true;
        Ok(())
    }

    /// `Advanced → Finalized`.
    pub fn mark_finalized(&mut self) -> Result<(), WithdrawalError> {
        if !self.0.is_advanced {
            return Err(WithdrawalError::NotAdvanced(self.0.id));
        }
        if self.0.is_finalized {
            return Err(WithdrawalError::AlreadyFinalized(self.0.id));
        }

        self.0.is_finalized = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct WithdrawalLedger {
    requests: RwLock<Vec<Arc<Mutex<LedgerEntry>>>>,
}

impl WithdrawalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a captured request table.
    ///
    /// Ids must run `0, 1, 2, …` without gaps and every record must satisfy
    /// the lifecycle invariants.
    pub fn from_requests(
        requests: impl IntoIterator<Item = WithdrawalRequest>,
    ) -> Result<Self, WithdrawalError> {
        let mut table = Vec::new();
        for (expected, request) in requests.into_iter().enumerate() {
            let expected = expected as WithdrawalId;
            if request.id != expected {
                return Err(WithdrawalError::OutOfSequence {
                    expected,
                    found: request.id,
                });
            }
            if !request.is_consistent() {
                return Err(WithdrawalError::Inconsistent(request.id));
            }
            table.push(Arc::new(Mutex::new(LedgerEntry(request))));
        }

        Ok(Self {
            requests: RwLock::new(table),
        })
    }

    /// Store a new request and return its id.
    pub fn create(
        &self,
        owner: Address,
        amount: U256,
        requested_at: u64,
    ) -> Result<WithdrawalId, WithdrawalError> {
        self.create_with(owner, amount, requested_at, |_| Ok(()))
    }

    /// Store a new request once `commit` accepted its id.
    ///
    /// `commit` runs with the table locked, so the id it sees is the id the
    /// request gets. If it fails nothing is stored and the id stays unused.
    /// Every lookup waits while it runs: keep it to local bookkeeping.
    pub fn create_with<E, F>(
        &self,
        owner: Address,
        amount: U256,
        requested_at: u64,
        commit: F,
    ) -> Result<WithdrawalId, E>
    where
        E: From<WithdrawalError>,
        F: FnOnce(WithdrawalId) -> Result<(), E>,
    {
        if amount.is_zero() {
            return Err(WithdrawalError::InvalidAmount.into());
        }

        let mut requests = self.requests.write();
        let id = requests.len() as WithdrawalId;

        commit(id)?;

        requests.push(Arc::new(Mutex::new(LedgerEntry(WithdrawalRequest::new(
            id,
            owner,
            amount,
            requested_at,
        )))));

        debug!(request_id = id, owner = %owner, amount = %amount, "Request stored");
        Ok(id)
    }

    fn entry(&self, id: WithdrawalId) -> Result<Arc<Mutex<LedgerEntry>>, WithdrawalError> {
        let requests = self.requests.read();
        usize::try_from(id)
            .ok()
            .and_then(|index| requests.get(index))
            .cloned()
            .ok_or(WithdrawalError::NotFound(id))
    }

    /// Copy of the request.
    pub fn get(&self, id: WithdrawalId) -> Result<WithdrawalRequest, WithdrawalError> {
        let entry = self.entry(id)?;
        let guard = entry.lock();
        Ok(guard.0.clone())
    }

    /// Run `f` with exclusive access to request `id`.
    ///
    /// Concurrent transactions on the same id are serialized; whatever `f`
    /// observes stays true until it returns.
    pub fn transact<T, E, F>(&self, id: WithdrawalId, f: F) -> Result<T, E>
    where
        E: From<WithdrawalError>,
        F: FnOnce(&mut LedgerEntry) -> Result<T, E>,
    {
        let entry = self.entry(id)?;
        let mut guard = entry.lock();
        f(&mut *guard)
    }

    pub fn mark_advanced(
        &self,
        id: WithdrawalId,
        lp: Address,
        fee: U256,
        challenge_period_end: u64,
    ) -> Result<(), WithdrawalError> {
        self.transact(id, |entry| entry.mark_advanced(lp, fee, challenge_period_end))
    }

    pub fn mark_finalized(&self, id: WithdrawalId) -> Result<(), WithdrawalError> {
        self.transact(id, |entry| entry.mark_finalized())
    }

    /// Number of requests ever created; also the next id.
    pub fn count(&self) -> u64 {
        self.requests.read().len() as u64
    }

    /// Copies of every request, ordered by id.
    pub fn requests(&self) -> Vec<WithdrawalRequest> {
        let entries: Vec<_> = self.requests.read().iter().cloned().collect();
        entries.iter().map(|entry| entry.lock().0.clone()).collect()
    }
}
