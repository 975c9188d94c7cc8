//! # Request Metrics
//!
//! Counts requests and labels every error response by its wire code, read
//! back through `GET /v1/metrics`. Handlers and middleware tag their error
//! responses with [`ErrorCode`]; responses without a tag (axum's own 404
//! and 405, for instance) are labelled `HTTP_<status>`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use parking_lot::Mutex;

use crate::error::ErrorCode;

/// Shared metrics state.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    requests: Arc<AtomicU64>,
    errors_by_code: Arc<Mutex<BTreeMap<String, u64>>>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub errors_by_code: BTreeMap<String, u64>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let errors_by_code = self.errors_by_code.lock().clone();
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            errors: errors_by_code.values().sum(),
            errors_by_code,
        }
    }

    fn record(&self, response: &Response) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        if !(status.is_client_error() || status.is_server_error()) {
            return;
        }
        let label = match response.extensions().get::<ErrorCode>() {
            Some(ErrorCode(code)) => (*code).to_string(),
            None => format!("HTTP_{}", status.as_u16()),
        };
        *self.errors_by_code.lock().entry(label).or_insert(0) += 1;
    }
}

/// Middleware that counts each response once it has been produced.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let response = next.run(request).await;
    if let Some(metrics) = metrics {
        metrics.record(&response);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use surety_ledger::LedgerError;
    use tower::ServiceExt;

    #[tokio::test]
    async fn errors_are_labelled_by_code() {
        let metrics = ApiMetrics::new();
        let app = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route(
                "/paused",
                get(|| async { Err::<(), _>(AppError::from(LedgerError::NotOperational)) }),
            )
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .layer(from_fn(metrics_middleware))
            .layer(axum::Extension(metrics.clone()));

        for uri in ["/ok", "/paused", "/teapot", "/paused", "/ok"] {
            let req = axum::http::Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            app.clone().oneshot(req).await.unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 5);
        assert_eq!(snapshot.errors, 3);
        assert_eq!(snapshot.errors_by_code["NOT_OPERATIONAL"], 2);
        assert_eq!(snapshot.errors_by_code["HTTP_418"], 1);
        assert!(!snapshot.errors_by_code.contains_key("HTTP_503"));
    }

    #[test]
    fn fresh_counters_are_empty() {
        let snapshot = ApiMetrics::new().snapshot();
        assert_eq!(snapshot.requests, 0);
        assert_eq!(snapshot.errors, 0);
        assert!(snapshot.errors_by_code.is_empty());
    }
}
