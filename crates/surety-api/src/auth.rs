//! # Bearer Token Authentication
//!
//! A single shared secret gates the `/v1` surface. The token authenticates
//! the client application only; the account acting on the ledger is named
//! in each request (`caller`, `requestor`, or the path), and the ledger's
//! own guards decide whether that account may act.
//!
//! ```text
//! Authorization: Bearer {secret}
//! ```

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::error::error_response;

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer tokens.
///
/// A length mismatch still performs one comparison so the early return
/// does not stand out.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Reject the request unless it carries the configured bearer token.
///
/// When `AuthConfig.token` is `None` every request passes.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|cfg| cfg.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let verdict = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| constant_time_token_eq(token, &expected));

    match verdict {
        Some(true) => next.run(request).await,
        Some(false) => unauthorized_response("invalid bearer token"),
        None => unauthorized_response("missing bearer token"),
    }
}

fn unauthorized_response(message: &str) -> Response {
    tracing::debug!(reason = message, "request rejected by auth middleware");
    error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn guarded(token: Option<&str>) -> Router {
        Router::new()
            .route("/probe", get(|| async { "through" }))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig {
                token: token.map(str::to_string),
            }))
    }

    fn probe(auth: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/probe");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn token_comparison() {
        assert!(constant_time_token_eq("abc", "abc"));
        assert!(!constant_time_token_eq("abd", "abc"));
        assert!(!constant_time_token_eq("abcd", "abc"));
        assert!(!constant_time_token_eq("", "abc"));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = AuthConfig {
            token: Some("hunter2".to_string()),
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn disabled_auth_lets_everything_through() {
        let resp = guarded(None).oneshot(probe(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_and_wrong_tokens_are_rejected() {
        let resp = guarded(Some("s3cret")).oneshot(probe(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = guarded(Some("s3cret"))
            .oneshot(probe(Some("Bearer wrong")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = guarded(Some("s3cret"))
            .oneshot(probe(Some("Basic s3cret")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn correct_token_passes() {
        let resp = guarded(Some("s3cret"))
            .oneshot(probe(Some("Bearer s3cret")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
