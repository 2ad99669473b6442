//! Availability report rendering.

use crate::stats::DomainCounts;

const REPORT_HEADER: &str = "----- AVAILABILITY REPORT -----";
const REPORT_FOOTER: &str = "--------------------------------";

/// Render a registry snapshot as the per-cycle console report.
///
/// One line per known domain, between fixed header and footer lines. Pure
/// rendering; the monitor loop owns printing.
pub fn render_report(snapshot: &[(String, DomainCounts)]) -> String {
    let mut out = String::new();
    out.push_str(REPORT_HEADER);
    out.push('\n');
    for (domain, counts) in snapshot {
        out.push_str(&format!(
            "{} - {}% availability\n",
            domain,
            counts.availability_pct()
        ));
    }
    out.push_str(REPORT_FOOTER);
    out
}
