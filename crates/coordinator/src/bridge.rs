use crate::{
    snapshot::{BridgeSnapshot, SnapshotError},
    BridgeError, Result,
};
use alloy_primitives::{Address, U256};
use balance::{Account, EscrowBook, Transfer, Vault};
use bond::{BondRegistry, LpBond};
use config::ProtocolParameters;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use withdrawal::{
    ChallengeClock, Clock, FeePolicy, WithdrawalId, WithdrawalLedger, WithdrawalRequest,
    WithdrawalScanner, WithdrawalStatus,
};

/// Outcome of a successful advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub id: WithdrawalId,
    pub liquidity_provider: Address,
    pub fee: U256,
    /// Paid by the LP to the owner (`amount - fee`)
    pub net_amount: U256,
    pub challenge_period_end: u64,
}

/// Outcome of a successful finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalization {
    pub id: WithdrawalId,
    pub liquidity_provider: Address,
    /// Escrowed principal released to the LP
    pub amount: U256,
}

/// Façade over the ledger, bond registry and custody.
///
/// Each operation on a request runs under that request's ledger lock and
/// validates every precondition before any value moves; a failed transfer
/// leaves no ledger, bond or escrow change behind. Operations on different
/// requests do not contend.
///
/// Mutating operations share `quiesce`; [`BridgeCoordinator::snapshot`] takes
/// it exclusively, so a snapshot never observes half of an operation.
pub struct BridgeCoordinator<T, C> {
    quiesce: RwLock<()>,
    params: ProtocolParameters,
    fee_policy: FeePolicy,
    ledger: WithdrawalLedger,
    bonds: BondRegistry,
    escrow: EscrowBook,
    transfer: T,
    clock: C,
}

impl<T, C> BridgeCoordinator<T, C>
where
    T: Transfer,
    C: Clock,
{
    pub fn new(params: ProtocolParameters, transfer: T, clock: C) -> Result<Self> {
        params.validate()?;

        info!(
            fee_percentage = params.fee_percentage,
            minimum_bond = %params.minimum_bond,
            challenge_duration = params.challenge_duration,
            exposure_policy = ?params.exposure_policy,
            "Bridge coordinator initialized"
        );

        Ok(Self {
            quiesce: RwLock::new(()),
            fee_policy: FeePolicy::new(params.fee_percentage),
            ledger: WithdrawalLedger::new(),
            bonds: BondRegistry::new(params.minimum_bond, params.exposure_policy),
            escrow: EscrowBook::new(),
            params,
            transfer,
            clock,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Mutating operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Escrow `amount` from `owner` and open a withdrawal request.
    ///
    /// The principal reaches custody before the request table is locked. A
    /// failed transfer stores nothing; a request that cannot be stored is
    /// refunded.
    pub fn request_withdrawal(&self, owner: Address, amount: U256) -> Result<WithdrawalId> {
        let _quiesce = self.quiesce.read();
        if amount.is_zero() {
            return Err(BridgeError::InvalidAmount);
        }
        let now = self.clock.now();

        self.transfer
            .transfer(Account::External(owner), Account::Custody, amount)?;

        let stored = self.ledger.create_with(owner, amount, now, |id| {
            self.escrow.record(id, amount).map_err(BridgeError::from)
        });
        let id = match stored {
            Ok(id) => id,
            Err(err) => {
                if let Err(refund) =
                    self.transfer
                        .transfer(Account::Custody, Account::External(owner), amount)
                {
                    warn!(owner = %owner, amount = %amount, error = %refund, "Escrow refund failed");
                }
                return Err(err);
            }
        };

        info!(request_id = id, owner = %owner, amount = %amount, "Withdrawal requested");
        Ok(id)
    }

    /// Advance request `id`: the LP pays the owner `amount - fee` from its
    /// own funds and the challenge period starts.
    ///
    /// Exactly one LP can advance a request; every other caller gets
    /// [`BridgeError::AlreadyAdvanced`].
    pub fn provide_liquidity(&self, lp: Address, id: WithdrawalId) -> Result<Advance> {
        let _quiesce = self.quiesce.read();
        self.ledger.transact(id, |entry| {
            if entry.is_advanced {
                return Err(BridgeError::AlreadyAdvanced(id));
            }
            if !self.bonds.is_eligible(lp) {
                return Err(BridgeError::IneligibleLP(lp));
            }

            let amount = entry.amount;
            let owner = entry.owner;
            let fee = self.fee_policy.fee(amount)?;
            let net_amount = amount - fee;

            self.bonds.reserve(lp, amount)?;
            if let Err(err) =
                self.transfer
                    .transfer(Account::External(lp), Account::External(owner), net_amount)
            {
                self.bonds.release(lp, amount);
                return Err(err.into());
            }

            let challenge_period_end =
                ChallengeClock::period_end(self.clock.now(), self.params.challenge_duration);
            entry.mark_advanced(lp, fee, challenge_period_end)?;

            info!(
                request_id = id,
                lp = %lp,
                owner = %owner,
                fee = %fee,
                net_amount = %net_amount,
                challenge_period_end,
                "Liquidity provided"
            );

            Ok(Advance {
                id,
                liquidity_provider: lp,
                fee,
                net_amount,
                challenge_period_end,
            })
        })
    }

    /// Release the escrowed principal of request `id` to its LP once the
    /// challenge period elapsed. Anyone may call this on the LP's behalf.
    ///
    /// Succeeds at most once per request.
    pub fn finalize_withdrawal(&self, id: WithdrawalId) -> Result<Finalization> {
        let _quiesce = self.quiesce.read();
        self.ledger.transact(id, |entry| {
            if !entry.is_advanced {
                return Err(BridgeError::NotAdvanced(id));
            }
            if entry.is_finalized {
                return Err(BridgeError::AlreadyFinalized(id));
            }

            let remaining = ChallengeClock::time_remaining(entry, self.clock.now())?;
            if remaining > 0 {
                return Err(BridgeError::ChallengePeriodActive { id, remaining });
            }

            let lp = entry
                .liquidity_provider
                .ok_or(BridgeError::NotAdvanced(id))?;
            let amount = self
                .escrow
                .release(&self.transfer, id, Account::External(lp))?;
            entry.mark_finalized()?;
            self.bonds.release(lp, entry.amount);

            info!(request_id = id, lp = %lp, amount = %amount, "Withdrawal finalized");

            Ok(Finalization {
                id,
                liquidity_provider: lp,
                amount,
            })
        })
    }

    /// Add `value` to the LP's bond. Returns the new bonded amount.
    pub fn deposit_bond(&self, lp: Address, value: U256) -> Result<U256> {
        let _quiesce = self.quiesce.read();
        Ok(self.bonds.deposit(&self.transfer, lp, value)?)
    }

    /// Take `value` out of the LP's bond. Returns the new bonded amount.
    pub fn withdraw_bond(&self, lp: Address, value: U256) -> Result<U256> {
        let _quiesce = self.quiesce.read();
        Ok(self.bonds.withdraw(&self.transfer, lp, value)?)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn get_withdrawal(&self, id: WithdrawalId) -> Result<WithdrawalRequest> {
        Ok(self.ledger.get(id)?)
    }

    /// Seconds until request `id` may be finalized; zero once it may.
    pub fn get_time_remaining(&self, id: WithdrawalId) -> Result<u64> {
        let request = self.ledger.get(id)?;
        Ok(ChallengeClock::time_remaining(&request, self.clock.now())?)
    }

    pub fn status(&self, id: WithdrawalId) -> Result<WithdrawalStatus> {
        Ok(self.ledger.get(id)?.status())
    }

    /// Fee that advancing `amount` would cost the owner.
    pub fn calculate_fee(&self, amount: U256) -> Result<U256> {
        Ok(self.fee_policy.fee(amount)?)
    }

    pub fn can_provide_liquidity(&self, lp: Address) -> bool {
        self.bonds.is_eligible(lp)
    }

    /// Whether `lp` may advance a request of `amount` right now, exposure
    /// policy included.
    pub fn can_advance(&self, lp: Address, amount: U256) -> bool {
        self.bonds.can_cover(lp, amount)
    }

    /// Number of requests ever created; valid ids are `0..withdrawal_counter()`.
    pub fn withdrawal_counter(&self) -> u64 {
        self.ledger.count()
    }

    pub const fn minimum_bond(&self) -> U256 {
        self.params.minimum_bond
    }

    pub const fn fee_percentage(&self) -> u64 {
        self.params.fee_percentage
    }

    pub const fn challenge_duration(&self) -> u64 {
        self.params.challenge_duration
    }

    pub const fn params(&self) -> &ProtocolParameters {
        &self.params
    }

    pub fn lp_bond(&self, lp: Address) -> U256 {
        self.bonds.balance_of(lp)
    }

    /// Largest bond withdrawal `lp` may make right now.
    pub fn withdrawable_bond(&self, lp: Address) -> U256 {
        self.bonds.withdrawable(lp)
    }

    /// Principal advanced by `lp` that is not finalized yet.
    pub fn outstanding_exposure(&self, lp: Address) -> U256 {
        self.bonds.exposure_of(lp)
    }

    /// Principal held in custody for request `id`.
    pub fn escrowed(&self, id: WithdrawalId) -> Option<U256> {
        self.escrow.held(id)
    }

    pub fn total_escrowed(&self) -> U256 {
        self.escrow.total()
    }

    pub fn total_bonded(&self) -> U256 {
        self.bonds.total_bonded()
    }

    /// Requests waiting for an LP.
    pub fn pending_advances(&self) -> Vec<WithdrawalId> {
        WithdrawalScanner::new(&self.ledger).pending_advances(self.clock.now())
    }

    /// Advanced requests past their challenge period.
    pub fn ready_to_finalize(&self) -> Vec<WithdrawalId> {
        WithdrawalScanner::new(&self.ledger).ready_to_finalize(self.clock.now())
    }

    /// Requests `lp` advanced that it can finalize now.
    pub fn finalizable_for(&self, lp: Address) -> Vec<WithdrawalId> {
        WithdrawalScanner::new(&self.ledger).finalizable_for(lp, self.clock.now())
    }

    /// Every request, ordered by id.
    pub fn withdrawals(&self) -> Vec<WithdrawalRequest> {
        self.ledger.requests()
    }

    pub const fn transfer(&self) -> &T {
        &self.transfer
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> BridgeCoordinator<Vault, C> {
    /// Capture the complete state.
    ///
    /// Waits for in-flight operations to finish and holds new ones off until
    /// every part is read.
    pub fn snapshot(&self) -> BridgeSnapshot {
        let _quiesce = self.quiesce.write();
        BridgeSnapshot {
            params: self.params.clone(),
            requests: self.ledger.requests(),
            bonds: self.bonds.entries(),
            escrow: self.escrow.entries(),
            balances: self.transfer.balances(),
        }
    }

    /// Rebuild a coordinator from a snapshot, checking that its ledger, bond
    /// table, escrow book and balances agree.
    pub fn restore(snapshot: BridgeSnapshot, clock: C) -> Result<Self> {
        let BridgeSnapshot {
            params,
            requests,
            bonds,
            escrow,
            balances,
        } = snapshot;

        params.validate()?;
        check_escrow(&requests, &escrow)?;
        check_exposure(&requests, &bonds)?;

        let vault = Vault::from_balances(balances);
        let escrow = EscrowBook::from_entries(escrow);
        let bonds = BondRegistry::from_entries(params.minimum_bond, params.exposure_policy, bonds);

        if vault.balance_of(Account::Custody) != escrow.total() {
            return Err(invalid("custody balance differs from escrow total"));
        }
        if vault.balance_of(Account::BondCustody) != bonds.total_bonded() {
            return Err(invalid("bond custody balance differs from bonded total"));
        }

        let ledger = WithdrawalLedger::from_requests(requests)?;

        debug!(
            requests = ledger.count(),
            escrowed = %escrow.total(),
            bonded = %bonds.total_bonded(),
            "Bridge state restored"
        );

        Ok(Self {
            quiesce: RwLock::new(()),
            fee_policy: FeePolicy::new(params.fee_percentage),
            ledger,
            bonds,
            escrow,
            params,
            transfer: vault,
            clock,
        })
    }
}

fn invalid(reason: impl Into<String>) -> BridgeError {
    BridgeError::Snapshot(SnapshotError::Invalid(reason.into()))
}

/// Unfinalized requests hold exactly their amount in escrow, finalized ones
/// hold nothing.
fn check_escrow(requests: &[WithdrawalRequest], escrow: &[(WithdrawalId, U256)]) -> Result<()> {
    let held: BTreeMap<_, _> = escrow.iter().copied().collect();
    if held.len() != escrow.len() {
        return Err(invalid("duplicate escrow entries"));
    }

    let mut expected = 0usize;
    for request in requests.iter().filter(|request| !request.is_finalized) {
        expected += 1;
        if held.get(&request.id) != Some(&request.amount) {
            return Err(invalid(format!(
                "escrow for request {} does not match its amount",
                request.id
            )));
        }
    }

    if expected != held.len() {
        return Err(invalid("escrow holds entries for finalized or unknown requests"));
    }
    Ok(())
}

/// One bond entry per LP, and each LP's recorded exposure equals the
/// principal of its advanced, unfinalized requests.
fn check_exposure(requests: &[WithdrawalRequest], bonds: &[(Address, LpBond)]) -> Result<()> {
    let lps: BTreeSet<_> = bonds.iter().map(|(lp, _)| *lp).collect();
    if lps.len() != bonds.len() {
        return Err(invalid("duplicate bond entries"));
    }

    let mut exposure: BTreeMap<Address, U256> = BTreeMap::new();
    for request in requests
        .iter()
        .filter(|request| request.is_advanced && !request.is_finalized)
    {
        if let Some(lp) = request.liquidity_provider {
            let entry = exposure.entry(lp).or_default();
            *entry = entry.saturating_add(request.amount);
        }
    }

    for (lp, bond) in bonds {
        let expected = exposure.remove(lp).unwrap_or_default();
        if bond.exposure != expected {
            return Err(invalid(format!("exposure of {lp} does not match its advances")));
        }
    }

    if exposure.values().any(|amount| !amount.is_zero()) {
        return Err(invalid("advances recorded for LPs without a bond entry"));
    }
    Ok(())
}
