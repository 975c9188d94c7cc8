//! # Custom Extractors & Validation
//!
//! The [`Validate`] trait for request DTOs, JSON body helpers, and parsers
//! for the account and flight path segments.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use surety_core::{AccountId, FlightKey};

use crate::error::AppError;

/// Request types with business rules beyond what serde checks.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Parse an `{account}` path segment.
pub fn account_param(raw: &str) -> Result<AccountId, AppError> {
    Ok(AccountId::parse(raw)?)
}

/// Parse a `{flight}` path segment.
pub fn flight_param(raw: &str) -> Result<FlightKey, AppError> {
    Ok(FlightKey::new(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(String);

    impl Validate for Named {
        fn validate(&self) -> Result<(), String> {
            if self.0.is_empty() {
                Err("name must not be empty".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn validated_json_rejects_rule_violations() {
        let err = extract_validated_json(Ok(Json(Named(String::new())))).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("empty")));
        assert!(extract_validated_json(Ok(Json(Named("Air".into())))).is_ok());
    }

    #[test]
    fn path_params() {
        let id = account_param("0x0101010101010101010101010101010101010101").unwrap();
        assert_eq!(id, AccountId::from_bytes([1; 20]));
        assert!(matches!(account_param("nope"), Err(AppError::Validation(_))));

        assert_eq!(flight_param("ND1309").unwrap().as_str(), "ND1309");
        assert!(matches!(flight_param("   "), Err(AppError::Validation(_))));
    }
}
