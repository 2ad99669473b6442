//! Probe execution and classification.
//!
//! One probe is one bounded-duration request against one endpoint. Every
//! attempt counts against the endpoint's domain `total`; only a 2xx
//! response inside the latency budget counts as a success. Failures are
//! logged and absorbed here — nothing propagates to the scheduler.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use tokio::time::Instant;
use tracing::warn;

use upwatch_config::Endpoint;

use crate::domain::extract_domain;
use crate::stats::StatsRegistry;

/// Per-probe deadline, measured from send to full response, connection
/// setup included. Doubles as the latency budget for classification.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Classification of one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx within the latency budget.
    Success,
    /// The request could not be constructed (bad method, URL, or header).
    BuildFailed,
    /// Transport-level failure, timeout included.
    TransportError,
    /// A response arrived with a status outside 200–299.
    NonSuccessStatus(u16),
    /// A 2xx response that exceeded the latency budget.
    Slow(Duration),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }
}

/// Build the shared probe client with the fixed timeout applied.
pub fn probe_client() -> reqwest::Result<Client> {
    Client::builder().timeout(PROBE_TIMEOUT).build()
}

/// Run one probe against an endpoint and record it in the registry.
pub async fn check_endpoint(
    client: &Client,
    endpoint: &Endpoint,
    registry: &StatsRegistry,
) -> ProbeOutcome {
    let domain = extract_domain(&endpoint.url);
    let stats = registry.ensure(&domain).await;

    let request = match build_request(client, endpoint) {
        Ok(request) => request,
        Err(e) => {
            // A request that cannot be built still counts as an attempt.
            stats.record_total();
            warn!(endpoint = %endpoint.name, error = %e, "failed to build probe request");
            return ProbeOutcome::BuildFailed;
        }
    };

    let start = Instant::now();
    let response = client.execute(request).await;
    let elapsed = start.elapsed();

    stats.record_total();

    match response {
        Err(e) => {
            warn!(endpoint = %endpoint.name, error = %e, "probe request failed");
            ProbeOutcome::TransportError
        }
        Ok(resp) => {
            let outcome = classify_response(resp.status(), elapsed);
            match &outcome {
                ProbeOutcome::Success => stats.record_success(),
                ProbeOutcome::NonSuccessStatus(status) => {
                    warn!(endpoint = %endpoint.name, status, "non-2xx probe response");
                }
                ProbeOutcome::Slow(elapsed) => {
                    warn!(
                        endpoint = %endpoint.name,
                        elapsed_ms = elapsed.as_millis() as u64,
                        budget_ms = PROBE_TIMEOUT.as_millis() as u64,
                        "slow probe response"
                    );
                }
                _ => {}
            }
            outcome
        }
    }
}

/// Classify a received response against status and latency criteria.
fn classify_response(status: StatusCode, elapsed: Duration) -> ProbeOutcome {
    if !status.is_success() {
        ProbeOutcome::NonSuccessStatus(status.as_u16())
    } else if elapsed > PROBE_TIMEOUT {
        ProbeOutcome::Slow(elapsed)
    } else {
        ProbeOutcome::Success
    }
}

/// Assemble one request from an endpoint record.
///
/// Method, URL, and headers are taken verbatim from the record; an absent
/// body is sent as empty. Any invalid piece fails the whole construction.
fn build_request(client: &Client, endpoint: &Endpoint) -> anyhow::Result<reqwest::Request> {
    let method = Method::from_bytes(endpoint.method.as_bytes())?;
    let url = Url::parse(&endpoint.url)?;

    let mut headers = HeaderMap::new();
    for (key, value) in &endpoint.headers {
        let name: HeaderName = key.parse()?;
        let value: HeaderValue = value.parse()?;
        headers.insert(name, value);
    }

    let body = endpoint.body.clone().unwrap_or_default();
    let request = client.request(method, url).headers(headers).body(body).build()?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::stats::DomainCounts;

    fn endpoint(name: &str, url: &str) -> Endpoint {
        Endpoint {
            name: name.to_string(),
            url: url.to_string(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: None,
        }
    }

    async fn counts(registry: &StatsRegistry, domain: &str) -> DomainCounts {
        registry.ensure(domain).await.counts()
    }

    #[tokio::test]
    async fn ok_response_counts_as_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let registry = StatsRegistry::new();
        let client = probe_client().unwrap();
        let ep = endpoint("ok", &format!("{}/healthz", server.uri()));

        let outcome = check_endpoint(&client, &ep, &registry).await;
        assert!(outcome.is_success());
        assert_eq!(
            counts(&registry, "127.0.0.1").await,
            DomainCounts { success: 1, total: 1 }
        );
    }

    #[tokio::test]
    async fn non_2xx_counts_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry = StatsRegistry::new();
        let client = probe_client().unwrap();
        let ep = endpoint("missing", &server.uri());

        let outcome = check_endpoint(&client, &ep, &registry).await;
        assert_eq!(outcome, ProbeOutcome::NonSuccessStatus(404));
        assert_eq!(
            counts(&registry, "127.0.0.1").await,
            DomainCounts { success: 0, total: 1 }
        );
    }

    #[tokio::test]
    async fn connection_refused_counts_as_transport_error() {
        let registry = StatsRegistry::new();
        let client = probe_client().unwrap();
        // Port 1 is not listening.
        let ep = endpoint("refused", "http://127.0.0.1:1/healthz");

        let outcome = check_endpoint(&client, &ep, &registry).await;
        assert_eq!(outcome, ProbeOutcome::TransportError);
        assert_eq!(
            counts(&registry, "127.0.0.1").await,
            DomainCounts { success: 0, total: 1 }
        );
    }

    #[tokio::test]
    async fn response_past_deadline_counts_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(PROBE_TIMEOUT + Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let registry = StatsRegistry::new();
        let client = probe_client().unwrap();
        let ep = endpoint("slow", &server.uri());

        // The client deadline fires first, so this surfaces as a timeout.
        let outcome = check_endpoint(&client, &ep, &registry).await;
        assert_eq!(outcome, ProbeOutcome::TransportError);
        assert_eq!(
            counts(&registry, "127.0.0.1").await,
            DomainCounts { success: 0, total: 1 }
        );
    }

    #[tokio::test]
    async fn invalid_method_fails_construction_but_counts_attempt() {
        let registry = StatsRegistry::new();
        let client = probe_client().unwrap();
        let mut ep = endpoint("bad-method", "http://example.com");
        ep.method = "NOT A METHOD".to_string();

        let outcome = check_endpoint(&client, &ep, &registry).await;
        assert_eq!(outcome, ProbeOutcome::BuildFailed);
        assert_eq!(
            counts(&registry, "example.com").await,
            DomainCounts { success: 0, total: 1 }
        );
    }

    #[tokio::test]
    async fn invalid_url_fails_construction_but_counts_attempt() {
        let registry = StatsRegistry::new();
        let client = probe_client().unwrap();
        let ep = endpoint("bad-url", "http://");

        let outcome = check_endpoint(&client, &ep, &registry).await;
        assert_eq!(outcome, ProbeOutcome::BuildFailed);

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].1, DomainCounts { success: 0, total: 1 });
    }

    #[tokio::test]
    async fn headers_method_and_body_are_applied() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(header("x-probe", "upwatch"))
            .and(body_string("ping"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let registry = StatsRegistry::new();
        let client = probe_client().unwrap();
        let ep = Endpoint {
            name: "submit".to_string(),
            url: format!("{}/submit", server.uri()),
            method: "POST".to_string(),
            headers: HashMap::from([("x-probe".to_string(), "upwatch".to_string())]),
            body: Some("ping".to_string()),
        };

        // 204 is inside the 2xx range.
        let outcome = check_endpoint(&client, &ep, &registry).await;
        assert!(outcome.is_success());
    }

    #[test]
    fn classification_priority() {
        let fast = Duration::from_millis(40);
        let slow = Duration::from_millis(600);

        assert_eq!(classify_response(StatusCode::OK, fast), ProbeOutcome::Success);
        assert_eq!(
            classify_response(StatusCode::NOT_FOUND, fast),
            ProbeOutcome::NonSuccessStatus(404)
        );
        // Non-2xx wins over slowness.
        assert_eq!(
            classify_response(StatusCode::INTERNAL_SERVER_ERROR, slow),
            ProbeOutcome::NonSuccessStatus(500)
        );
        // 2xx but over budget is still a failure.
        assert_eq!(classify_response(StatusCode::OK, slow), ProbeOutcome::Slow(slow));
        // Range boundaries.
        assert_eq!(
            classify_response(StatusCode::from_u16(299).unwrap(), fast),
            ProbeOutcome::Success
        );
        assert_eq!(
            classify_response(StatusCode::from_u16(300).unwrap(), fast),
            ProbeOutcome::NonSuccessStatus(300)
        );
    }
}
