//! upwatch-monitor — the polling-and-aggregation core of upwatch.
//!
//! Each cycle the [`Monitor`] fans out one detached probe task per
//! configured endpoint. A probe issues a single bounded-duration request,
//! classifies the outcome against transport, status-code, and latency
//! criteria, and records it in the shared [`StatsRegistry`]. Once per cycle
//! the registry is snapshotted and rendered into the availability report.
//!
//! The registry is the only shared mutable state: a cloneable handle around
//! a lock-guarded map of atomic counters, safe for the concurrent probe
//! burst and the reporter.

pub mod domain;
pub mod monitor;
pub mod probe;
pub mod report;
pub mod stats;

pub use domain::extract_domain;
pub use monitor::{Monitor, MonitorTiming};
pub use probe::{PROBE_TIMEOUT, ProbeOutcome, check_endpoint, probe_client};
pub use report::render_report;
pub use stats::{DomainCounts, DomainStats, StatsRegistry};
