pub mod config;
pub mod metrics;

use crate::{config::Config, metrics::Metrics};

use action::{Action, FinalizeAction, Outcome};
use alloy_primitives::U256;
use balance::{Transfer, Vault};
use coordinator::{BridgeCoordinator, BridgeError, BridgeSnapshot, ErrorKind, Finalization};
use std::{path::Path, time::Instant};
use tracing::{debug, info, warn};
use withdrawal::{Clock, WithdrawalId, WithdrawalStatus};

/// Load the bridge from `config.state_path`, or start an empty one with the
/// configured parameters when the file does not exist yet.
///
/// A persisted state keeps the parameters it was created with.
pub fn load_state<C: Clock>(config: &Config, clock: C) -> eyre::Result<BridgeCoordinator<Vault, C>> {
    let params = config.protocol_parameters()?;
    let path = &config.state_path;

    if !path.exists() {
        info!(path = %path.display(), "No state file, starting empty bridge");
        return Ok(BridgeCoordinator::new(params, Vault::new(), clock)?);
    }

    let snapshot = BridgeSnapshot::from_file(path).map_err(BridgeError::from)?;
    if snapshot.params != params {
        warn!(
            persisted = ?snapshot.params,
            configured = ?params,
            "Configured protocol parameters differ from the state file, keeping persisted ones"
        );
    }

    let bridge = BridgeCoordinator::restore(snapshot, clock)?;
    info!(
        path = %path.display(),
        requests = bridge.withdrawal_counter(),
        "Loaded bridge state"
    );
    Ok(bridge)
}

pub fn save_state<C: Clock>(
    bridge: &BridgeCoordinator<Vault, C>,
    path: impl AsRef<Path>,
) -> eyre::Result<()> {
    let path = path.as_ref();
    bridge
        .snapshot()
        .write_file(path)
        .map_err(BridgeError::from)?;

    debug!(path = %path.display(), "Saved bridge state");
    Ok(())
}

/// Result of one keeper cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub finalized: Vec<Finalization>,
    pub failed: Vec<(WithdrawalId, ErrorKind)>,
    /// Ready requests left alone in dry-run mode
    pub skipped: Vec<WithdrawalId>,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Finalize every request whose challenge period elapsed.
///
/// A failure on one request does not stop the others. Losing a race to
/// another finalizer shows up as [`ErrorKind::AlreadyFinalized`].
pub fn finalize_ready<T, C>(
    bridge: &BridgeCoordinator<T, C>,
    dry_run: bool,
    metrics: &Metrics,
) -> CycleReport
where
    T: Transfer,
    C: Clock,
{
    let ready = bridge.ready_to_finalize();
    debug!(count = ready.len(), "Requests ready to finalize");

    let mut report = CycleReport::default();
    for id in ready {
        let mut action = FinalizeAction::new(bridge, id);

        if dry_run {
            info!("[DRY-RUN] Would execute: {}", action.description());
            report.skipped.push(id);
            continue;
        }

        match action.execute() {
            Ok(Outcome::Finalized(finalization)) => {
                metrics.record_finalization(wei(finalization.amount));
                report.finalized.push(finalization);
            }
            Ok(outcome) => {
                warn!(request_id = id, ?outcome, "Unexpected finalize outcome");
            }
            Err(err) => {
                // the action bails on its own only for finalized requests
                let kind = err
                    .downcast_ref::<BridgeError>()
                    .map_or(ErrorKind::AlreadyFinalized, BridgeError::kind);
                warn!(request_id = id, kind = kind.as_str(), error = %err, "Finalization failed");
                metrics.record_finalization_failure(kind.as_str());
                report.failed.push((id, kind));
            }
        }
    }

    report
}

/// Publish request counts by status and the custody totals.
pub fn record_state<T, C>(bridge: &BridgeCoordinator<T, C>, metrics: &Metrics)
where
    T: Transfer,
    C: Clock,
{
    let (mut requested, mut advanced, mut finalized) = (0, 0, 0);
    for request in bridge.withdrawals() {
        match request.status() {
            WithdrawalStatus::Requested => requested += 1,
            WithdrawalStatus::Advanced { .. } => advanced += 1,
            WithdrawalStatus::Finalized => finalized += 1,
        }
    }

    metrics.set_withdrawals("requested", requested);
    metrics.set_withdrawals("advanced", advanced);
    metrics.set_withdrawals("finalized", finalized);
    metrics.set_escrowed(wei(bridge.total_escrowed()));
    metrics.set_bonded(wei(bridge.total_bonded()));
}

/// One keeper pass: finalize what is ready, then refresh the gauges.
pub fn run_cycle<T, C>(
    bridge: &BridgeCoordinator<T, C>,
    dry_run: bool,
    metrics: &Metrics,
) -> CycleReport
where
    T: Transfer,
    C: Clock,
{
    let start = Instant::now();

    let report = finalize_ready(bridge, dry_run, metrics);
    record_state(bridge, metrics);
    metrics.record_cycle(report.is_success(), start.elapsed());

    info!(
        finalized = report.finalized.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "Keeper cycle complete"
    );
    report
}

fn wei(amount: U256) -> u128 {
    u128::try_from(amount).unwrap_or(u128::MAX)
}
