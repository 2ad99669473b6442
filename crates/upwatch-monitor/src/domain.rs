//! Domain label extraction.

use http::Uri;

/// Derive the grouping key for an endpoint address.
///
/// A structured URI parse wins when it yields a host (no port, no scheme).
/// Addresses the parser cannot make sense of fall back to a textual
/// heuristic — everything after the first `//` up to the next `/` — so any
/// input produces some label, however degenerate.
pub fn extract_domain(raw_url: &str) -> String {
    if let Ok(uri) = raw_url.parse::<Uri>() {
        if let Some(host) = uri.host() {
            return host.to_string();
        }
    }

    let after_scheme = match raw_url.split_once("//") {
        Some((_, rest)) => rest,
        None => raw_url,
    };
    match after_scheme.split_once('/') {
        Some((host, _)) => host.to_string(),
        None => after_scheme.to_string(),
    }
}
