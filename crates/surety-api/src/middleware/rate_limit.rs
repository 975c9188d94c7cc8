//! # Per-Account Rate Limiting
//!
//! Fixed-window counter keyed by the account named in `X-Account-Id`.
//! The header is parsed as an [`AccountId`], so differently-cased spellings
//! of one account share a window. A missing or malformed header falls into
//! the shared `"anonymous"` window.
//!
//! A rejected request gets `429` with a `Retry-After` header giving the
//! whole seconds left in its window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use parking_lot::Mutex;
use surety_core::AccountId;

use crate::error::error_response;

pub const RATE_LIMIT_HEADER: &str = "x-account-id";

/// Bucket count above which expired windows are swept on insert.
const SWEEP_THRESHOLD: usize = 4096;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 1000,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BucketKey {
    Account(AccountId),
    Anonymous,
}

impl BucketKey {
    fn from_request(request: &Request) -> Self {
        request
            .headers()
            .get(RATE_LIMIT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| AccountId::parse(v).ok())
            .map_or(Self::Anonymous, Self::Account)
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(id) => write!(f, "{id}"),
            Self::Anonymous => f.write_str("anonymous"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    started: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<BucketKey, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request against `key`. Once the window is spent, returns
    /// the time until it reopens.
    fn admit(&self, key: BucketKey, now: Instant) -> Result<(), Duration> {
        let window_len = self.config.window();
        let mut windows = self.windows.lock();

        if windows.len() >= SWEEP_THRESHOLD && !windows.contains_key(&key) {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
        }

        let window = windows.entry(key).or_insert(Window {
            count: 0,
            started: now,
        });
        let elapsed = now.duration_since(window.started);
        if elapsed >= window_len {
            *window = Window {
                count: 0,
                started: now,
            };
        }

        if window.count >= self.config.max_requests {
            Err(window_len.saturating_sub(now.duration_since(window.started)))
        } else {
            window.count += 1;
            Ok(())
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.windows.lock().len()
    }
}

/// Middleware that enforces per-account rate limits.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let Some(limiter) = request.extensions().get::<RateLimiter>().cloned() else {
        return next.run(request).await;
    };

    let key = BucketKey::from_request(&request);
    match limiter.admit(key.clone(), Instant::now()) {
        Ok(()) => next.run(request).await,
        Err(retry_in) => {
            let retry_secs = retry_in.as_secs().max(1);
            tracing::warn!(key = %key, retry_secs, "rate limit exceeded");
            let mut response =
                error_response(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", "rate limit exceeded");
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_secs));
            response
        }
    }
}
