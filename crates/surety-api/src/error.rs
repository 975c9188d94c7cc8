//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Ledger rejections keep their own machine-readable kind as the error
//! code; everything else maps onto a fixed set of HTTP categories.
//! Internal failures are logged and never described to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use surety_ledger::LedgerError;
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_OPERATIONAL", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Wire code of an error response, attached as a response extension so the
/// metrics middleware can label it without parsing the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

/// A JSON error response tagged with its [`ErrorCode`].
pub fn error_response(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let mut response = (status, Json(ErrorBody::new(code, message))).into_response();
    response.extensions_mut().insert(ErrorCode(code));
    response
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A ledger call rejected by its guards or by the payout rail.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Ledger(err) => (ledger_status(err), err.kind()),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Ledger(LedgerError::Canonicalization(_))
        )
    }
}

fn ledger_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotOwner { .. } | LedgerError::NotActiveMember { .. } => StatusCode::FORBIDDEN,
        LedgerError::NotOperational => StatusCode::SERVICE_UNAVAILABLE,
        LedgerError::InsufficientFee { .. } | LedgerError::Arithmetic(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerError::SelfVote { .. } => StatusCode::CONFLICT,
        LedgerError::TransferFailed { .. } => StatusCode::BAD_GATEWAY,
        LedgerError::UnknownAirline { .. } => StatusCode::NOT_FOUND,
        LedgerError::Canonicalization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let code = if self.is_internal() { "INTERNAL_ERROR" } else { code };

        error_response(status, code, message)
    }
}

impl From<surety_core::ValidationError> for AppError {
    fn from(err: surety_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use surety_core::{AccountId, Amount, ArithmeticError};

    fn account(n: u8) -> AccountId {
        AccountId::from_bytes([n; 20])
    }

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn plain_categories() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }

    #[test]
    fn ledger_rejections_map_to_status() {
        let cases = [
            (LedgerError::NotOwner { caller: account(1) }, StatusCode::FORBIDDEN),
            (
                LedgerError::NotActiveMember { account: account(1) },
                StatusCode::FORBIDDEN,
            ),
            (LedgerError::NotOperational, StatusCode::SERVICE_UNAVAILABLE),
            (
                LedgerError::InsufficientFee {
                    required: Amount::new(10),
                    attached: Amount::new(1),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (LedgerError::SelfVote { account: account(1) }, StatusCode::CONFLICT),
            (
                LedgerError::TransferFailed {
                    recipient: account(1),
                    amount: Amount::new(1),
                    reason: "rail offline".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                LedgerError::UnknownAirline { account: account(1) },
                StatusCode::NOT_FOUND,
            ),
            (
                LedgerError::Arithmetic(ArithmeticError::Overflow {
                    op: "add",
                    lhs: u128::MAX,
                    rhs: 1,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, status) in cases {
            let kind = err.kind();
            assert_eq!(AppError::from(err).status_and_code(), (status, kind));
        }
    }

    #[tokio::test]
    async fn ledger_kind_is_the_wire_code() {
        let (status, body) = response_parts(AppError::from(LedgerError::NotOperational)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error.code, "NOT_OPERATIONAL");
        assert!(body.error.details.is_none());
    }

    #[test]
    fn responses_carry_their_code() {
        let response = AppError::from(LedgerError::SelfVote { account: account(1) }).into_response();
        assert_eq!(
            response.extensions().get::<ErrorCode>(),
            Some(&ErrorCode("SELF_VOTE"))
        );
        let hidden = AppError::Internal("x".into()).into_response();
        assert_eq!(
            hidden.extensions().get::<ErrorCode>(),
            Some(&ErrorCode("INTERNAL_ERROR"))
        );
    }

    #[tokio::test]
    async fn internal_message_is_hidden() {
        let (status, body) = response_parts(AppError::Internal("lock poisoned".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("lock poisoned"));
    }

    #[test]
    fn validation_error_converts() {
        let err = AccountId::parse("0x12").unwrap_err();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Validation(_)));
    }
}
