//! Prometheus metrics for the bridge keeper.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Aggregated metrics for the keeper.
///
/// Metrics are registered with the global metrics registry on creation.
/// Without an installed recorder every call is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Cycle metrics
        describe_counter!(
            "bridge_keeper_cycles_total",
            "Total number of keeper cycles executed"
        );
        describe_counter!(
            "bridge_keeper_cycles_success_total",
            "Total number of keeper cycles without a failed finalization"
        );
        describe_counter!(
            "bridge_keeper_cycles_failure_total",
            "Total number of keeper cycles with at least one failed finalization"
        );
        describe_histogram!(
            "bridge_keeper_cycle_duration_seconds",
            "Duration of each keeper cycle in seconds"
        );

        // Finalization metrics
        describe_counter!(
            "bridge_finalizations_total",
            "Total number of withdrawals finalized by the keeper"
        );
        describe_counter!(
            "bridge_finalized_amount_wei_total",
            "Total principal released to LPs in wei"
        );
        describe_counter!(
            "bridge_finalization_failures_total",
            "Total failed finalizations by error kind"
        );

        // State gauges
        describe_gauge!(
            "bridge_withdrawals",
            "Number of withdrawal requests by status"
        );
        describe_gauge!(
            "bridge_escrowed_wei",
            "Principal currently held in custody in wei"
        );
        describe_gauge!("bridge_bonded_wei", "Total LP bonds in wei");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Cycle metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a completed cycle.
    pub fn record_cycle(&self, success: bool, duration: Duration) {
        counter!("bridge_keeper_cycles_total").increment(1);
        histogram!("bridge_keeper_cycle_duration_seconds").record(duration.as_secs_f64());

        if success {
            counter!("bridge_keeper_cycles_success_total").increment(1);
        } else {
            counter!("bridge_keeper_cycles_failure_total").increment(1);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Finalization metrics
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn record_finalization(&self, amount_wei: u128) {
        counter!("bridge_finalizations_total").increment(1);
        counter!("bridge_finalized_amount_wei_total")
            .increment(u64::try_from(amount_wei).unwrap_or(u64::MAX));
    }

    pub fn record_finalization_failure(&self, kind: &'static str) {
        counter!("bridge_finalization_failures_total", "kind" => kind).increment(1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // State gauges
    // ─────────────────────────────────────────────────────────────────────────────

    /// Set the count of withdrawals by status.
    pub fn set_withdrawals(&self, status: &'static str, count: usize) {
        gauge!("bridge_withdrawals", "status" => status).set(count as f64);
    }

    pub fn set_escrowed(&self, amount_wei: u128) {
        gauge!("bridge_escrowed_wei").set(amount_wei as f64);
    }

    pub fn set_bonded(&self, amount_wei: u128) {
        gauge!("bridge_bonded_wei").set(amount_wei as f64);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
