//! # surety-api: HTTP Service for the Consortium Ledger
//!
//! Exposes the airline registry, insurance escrow, claims settlement, and
//! audit journal of [`surety_ledger`] over JSON/HTTP.
//!
//! ## API Surface
//!
//! | Prefix                        | Module                   |
//! |-------------------------------|--------------------------|
//! | `/v1/ledger*`, `/v1/consortium`, `/v1/metrics` | [`routes::ledger`] |
//! | `/v1/airlines/*`              | [`routes::airlines`]     |
//! | `/v1/flights/*`, `/v1/passengers/*`, `/v1/payouts` | [`routes::insurance`] |
//! | `/v1/audit/*`                 | [`routes::audit`]        |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → RateLimitMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated with utoipa and served at `/openapi.json`.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    app_with_rate_limit(state, RateLimitConfig::default())
}

/// [`app`] with an explicit rate limit.
pub fn app_with_rate_limit(state: AppState, rate_limit: RateLimitConfig) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let limiter = RateLimiter::new(rate_limit);

    let api = Router::new()
        .merge(routes::ledger::router())
        .merge(routes::airlines::router())
        .merge(routes::insurance::router())
        .merge(routes::audit::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .layer(axum::Extension(limiter))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
async fn readiness() -> &'static str {
    "ready"
}
