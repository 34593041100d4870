//! Metrics definitions shared by every service.
//!
//! All metrics follow Prometheus naming conventions (`_total` counters,
//! `_seconds` histograms). Each process sets a global `service` label when it
//! installs the recorder, so names are not prefixed per service.
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `method`: HTTP methods
//! - `endpoint`: the parameterized route table below, everything else is `/other`
//! - `status`: success, error, timeout
//! - `peer`, `operation`: fixed by call sites
//! - `policy`: required, best_effort
//! - `outcome`: bounded by code

use crate::peer::CallPolicy;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle for `/metrics`.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns an error if the recorder cannot be installed (e.g., already installed).
pub fn init_metrics_recorder(service: &str) -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .add_global_label("service", service)
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Peer calls are bounded by their client timeouts (2s gateway, 5s default)
        .set_buckets_for_metric(
            Matcher::Full("peer_call_duration_seconds".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set peer call buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `http_requests_total`, `http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let endpoint = normalize_endpoint(path);
    let status = categorize_status_code(status_code);

    histogram!("http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Map a request path onto its route template.
#[must_use]
pub fn normalize_endpoint(path: &str) -> &'static str {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match segments.as_slice() {
        [""] => "/",
        ["health"] => "/health",
        ["metrics"] => "/metrics",
        ["auth", "health"] => "/auth/health",
        ["auth", "register"] => "/auth/register",
        ["auth", "login"] => "/auth/login",
        ["auth", "user", _] => "/auth/user/{id}",
        ["profile"] => "/profile",
        ["profile", "health"] => "/profile/health",
        ["profile", _] => "/profile/{id}",
        ["feed", "health"] => "/feed/health",
        ["feed", "publications"] => "/feed/publications",
        ["feed", "publications", _] => "/feed/publications/{id}",
        ["feed", "comments"] => "/feed/comments",
        ["feed", "comments", _] => "/feed/comments/{id}",
        ["feed", "user", "publications"] => "/feed/user/publications",
        _ => "/other",
    }
}

// ============================================================================
// Peer Call Metrics
// ============================================================================

/// Record a synchronous call to a peer service.
///
/// Metric: `peer_calls_total`, `peer_call_duration_seconds`
/// Labels: `peer`, `operation`, `policy`, `outcome`
///
/// `outcome` is `"success"` or a [`crate::peer::PeerError::kind`] value.
pub fn record_peer_call(
    peer: &'static str,
    operation: &'static str,
    policy: CallPolicy,
    outcome: &'static str,
    duration: Duration,
) {
    histogram!("peer_call_duration_seconds",
        "peer" => peer,
        "operation" => operation
    )
    .record(duration.as_secs_f64());

    counter!("peer_calls_total",
        "peer" => peer,
        "operation" => operation,
        "policy" => policy.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Compensation Metrics
// ============================================================================

/// Record a compensating action (an undo after a later step failed) or a
/// best-effort cascade.
///
/// Metric: `compensations_total`
/// Labels: `operation`, `outcome` (`"success"`, `"failed"`)
pub fn record_compensation(operation: &'static str, outcome: &'static str) {
    counter!("compensations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Gateway Metrics
// ============================================================================

/// Record the gateway's authentication decision for a protected request.
///
/// Metric: `gateway_auth_decisions_total`
/// Labels: `outcome` (e.g. `"allowed"`, `"missing_token"`, `"expired"`, `"user_not_found"`)
pub fn record_auth_decision(outcome: &'static str) {
    counter!("gateway_auth_decisions_total", "outcome" => outcome).increment(1);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

    fn counter_value(snapshotter: &Snapshotter, name: &str, label: (&str, &str)) -> Option<u64> {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find_map(|(key, _, _, value)| {
                let matches = key.key().name() == name
                    && key
                        .key()
                        .labels()
                        .any(|l| l.key() == label.0 && l.value() == label.1);
                match (matches, value) {
                    (true, DebugValue::Counter(v)) => Some(v),
                    _ => None,
                }
            })
    }

    #[test]
    fn test_normalize_endpoint_parameterizes_ids() {
        assert_eq!(normalize_endpoint("/auth/user/8b1f"), "/auth/user/{id}");
        assert_eq!(normalize_endpoint("/profile/8b1f"), "/profile/{id}");
        assert_eq!(
            normalize_endpoint("/feed/publications/8b1f"),
            "/feed/publications/{id}"
        );
        assert_eq!(normalize_endpoint("/feed/comments/8b1f"), "/feed/comments/{id}");
    }

    #[test]
    fn test_normalize_endpoint_static_paths() {
        assert_eq!(normalize_endpoint("/"), "/");
        assert_eq!(normalize_endpoint("/profile"), "/profile");
        assert_eq!(normalize_endpoint("/profile/health"), "/profile/health");
        assert_eq!(
            normalize_endpoint("/feed/user/publications"),
            "/feed/user/publications"
        );
        assert_eq!(normalize_endpoint("/wp-admin/setup.php"), "/other");
        assert_eq!(normalize_endpoint("/auth/user/1/extra"), "/other");
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(201), "success");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
        assert_eq!(categorize_status_code(502), "error");
        assert_eq!(categorize_status_code(401), "error");
    }

    #[test]
    fn test_record_peer_call_labels_policy() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_peer_call(
                "feed",
                "list_user_publications",
                CallPolicy::BestEffort,
                "transport",
                Duration::from_millis(5),
            );
        });

        let value = counter_value(
            &snapshotter,
            "peer_calls_total",
            ("policy", "best_effort"),
        );
        assert_eq!(value, Some(1));
    }

    #[test]
    fn test_record_compensation_counts_outcomes() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_compensation("register_rollback", "success");
            record_compensation("register_rollback", "success");
        });

        let value = counter_value(
            &snapshotter,
            "compensations_total",
            ("outcome", "success"),
        );
        assert_eq!(value, Some(2));
    }

    #[test]
    fn test_record_auth_decision() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_auth_decision("user_not_found");
        });

        let value = counter_value(
            &snapshotter,
            "gateway_auth_decisions_total",
            ("outcome", "user_not_found"),
        );
        assert_eq!(value, Some(1));
    }
}
