//! The monitor loop — cycle scheduling, probe fan-out, and reporting.

use std::time::Duration;

use reqwest::Client;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use upwatch_config::Endpoint;

use crate::domain::extract_domain;
use crate::probe::check_endpoint;
use crate::report::render_report;
use crate::stats::StatsRegistry;

/// Fixed wait between probe fan-out and the cycle's report.
const GRACE_PERIOD: Duration = Duration::from_secs(3);
/// Fixed cycle length, measured from cycle start.
const CYCLE_PERIOD: Duration = Duration::from_secs(15);

/// Cycle timing. Production values are fixed constants; tests shorten them.
#[derive(Debug, Clone, Copy)]
pub struct MonitorTiming {
    pub grace_period: Duration,
    pub cycle_period: Duration,
}

impl Default for MonitorTiming {
    fn default() -> Self {
        Self {
            grace_period: GRACE_PERIOD,
            cycle_period: CYCLE_PERIOD,
        }
    }
}

impl MonitorTiming {
    /// Custom periods (for testing).
    pub fn with_periods(grace_period: Duration, cycle_period: Duration) -> Self {
        Self {
            grace_period,
            cycle_period,
        }
    }
}

/// Owns the probe schedule for a fixed endpoint list.
pub struct Monitor {
    endpoints: Vec<Endpoint>,
    registry: StatsRegistry,
    client: Client,
    timing: MonitorTiming,
}

impl Monitor {
    /// Create a monitor with production timing.
    pub fn new(endpoints: Vec<Endpoint>, registry: StatsRegistry, client: Client) -> Self {
        Self {
            endpoints,
            registry,
            client,
            timing: MonitorTiming::default(),
        }
    }

    /// Override cycle timing.
    pub fn with_timing(mut self, timing: MonitorTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Run cycles until the shutdown signal fires.
    ///
    /// Each cycle fans out one detached probe task per endpoint, waits the
    /// grace period, prints the availability report, then sleeps out the
    /// remainder of the cycle. Probes still in flight when the report is
    /// printed (or when the loop stops) are neither joined nor aborted;
    /// their counter updates land in a later report. Both waits race the
    /// shutdown channel, and the flag is re-checked at the top of each
    /// cycle.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        // Pre-seed every configured domain so the first report is complete
        // even before any probe finishes.
        for endpoint in &self.endpoints {
            self.registry.ensure(&extract_domain(&endpoint.url)).await;
        }

        info!(endpoints = self.endpoints.len(), "monitor started");

        loop {
            if *shutdown.borrow() {
                info!("stopping monitoring service");
                return;
            }

            let cycle_start = Instant::now();

            for endpoint in &self.endpoints {
                let endpoint = endpoint.clone();
                let registry = self.registry.clone();
                let client = self.client.clone();
                tokio::spawn(async move {
                    check_endpoint(&client, &endpoint, &registry).await;
                });
            }
            debug!(probes = self.endpoints.len(), "probe fan-out dispatched");

            tokio::select! {
                _ = tokio::time::sleep(self.timing.grace_period) => {}
                _ = shutdown.changed() => {
                    info!("stopping monitoring service");
                    return;
                }
            }

            let snapshot = self.registry.snapshot().await;
            println!("{}", render_report(&snapshot));

            let remaining = self.timing.cycle_period.saturating_sub(cycle_start.elapsed());
            tokio::select! {
                _ = tokio::time::sleep(remaining) => {}
                _ = shutdown.changed() => {
                    info!("stopping monitoring service");
                    return;
                }
            }
        }
    }
}
