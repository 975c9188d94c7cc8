//! # Airline Registry API
//!
//! Registration, funding, and multi-party approval of consortium airlines.
//! Every write names the acting account; the ledger decides whether that
//! account is an active member.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount};
use surety_ledger::Airline;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{account_param, extract_validated_json, Validate};
use crate::state::AppState;

const MAX_AIRLINE_NAME_LEN: usize = 256;

/// Register an airline.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterAirlineRequest {
    pub name: String,
    #[schema(value_type = String)]
    pub airline: AccountId,
    /// Active member sponsoring the registration.
    #[schema(value_type = String)]
    pub requestor: AccountId,
}

impl Validate for RegisterAirlineRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.name.len() > MAX_AIRLINE_NAME_LEN {
            return Err(format!("name must not exceed {MAX_AIRLINE_NAME_LEN} bytes"));
        }
        Ok(())
    }
}

/// Attach funds to an airline.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FundAirlineRequest {
    /// Base units, as a decimal string or integer.
    #[schema(value_type = String)]
    pub amount: Amount,
}

impl Validate for FundAirlineRequest {
    fn validate(&self) -> Result<(), String> {
        if self.amount.is_zero() {
            return Err("amount must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Cast a vote for a pending airline.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveAirlineRequest {
    #[schema(value_type = String)]
    pub requestor: AccountId,
}

impl Validate for ApproveAirlineRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Airline record as seen by clients.
///
/// Unknown accounts come back as the empty projection: blank name,
/// pending, unfunded, zero everywhere.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AirlineView {
    #[schema(value_type = String)]
    pub account: AccountId,
    pub name: String,
    /// `PENDING_APPROVAL` or `REGISTERED`.
    pub state: String,
    pub is_funded: bool,
    pub min_required_votes: u64,
    pub positive_received_votes: u64,
    #[schema(value_type = String)]
    pub balance: Amount,
    pub active: bool,
}

impl AirlineView {
    fn new(account: AccountId, airline: Airline) -> Self {
        Self {
            account,
            active: airline.is_active(),
            state: airline.state.as_str().to_string(),
            name: airline.name,
            is_funded: airline.is_funded,
            min_required_votes: airline.min_required_votes,
            positive_received_votes: airline.positive_received_votes,
            balance: airline.balance,
        }
    }
}

/// Active-member check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActiveView {
    #[schema(value_type = String)]
    pub account: AccountId,
    pub active: bool,
}

/// Build the airline registry router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/airlines", post(register_airline))
        .route("/v1/airlines/{account}", get(get_airline))
        .route("/v1/airlines/{account}/active", get(is_active))
        .route("/v1/airlines/{account}/funding", post(fund_airline))
        .route("/v1/airlines/{account}/approvals", post(approve_airline))
}

/// POST /v1/airlines: Register an airline.
///
/// Below the founding threshold the airline is registered immediately;
/// from then on it waits for votes.
#[utoipa::path(
    post,
    path = "/v1/airlines",
    request_body = RegisterAirlineRequest,
    responses(
        (status = 201, description = "Airline recorded", body = AirlineView),
        (status = 403, description = "Requestor is not an active member", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "airlines"
)]
pub async fn register_airline(
    State(state): State<AppState>,
    body: Result<Json<RegisterAirlineRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AirlineView>), AppError> {
    let req = extract_validated_json(body)?;
    let airline = state
        .ledger
        .with(|ledger| ledger.register_airline(req.name.trim(), req.airline, req.requestor))?;
    Ok((StatusCode::CREATED, Json(AirlineView::new(req.airline, airline))))
}

/// GET /v1/airlines/{account}: Airline status projection.
#[utoipa::path(
    get,
    path = "/v1/airlines/{account}",
    params(("account" = String, Path, description = "Airline account, 0x-prefixed hex")),
    responses(
        (status = 200, description = "Airline status", body = AirlineView),
        (status = 422, description = "Malformed account", body = crate::error::ErrorBody),
    ),
    tag = "airlines"
)]
pub async fn get_airline(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<AirlineView>, AppError> {
    let account = account_param(&account)?;
    let airline = state.ledger.read(|ledger| ledger.fetch_airline_status(&account));
    Ok(Json(AirlineView::new(account, airline)))
}

/// GET /v1/airlines/{account}/active: Whether the account is an active member.
#[utoipa::path(
    get,
    path = "/v1/airlines/{account}/active",
    params(("account" = String, Path, description = "Airline account, 0x-prefixed hex")),
    responses(
        (status = 200, description = "Membership check", body = ActiveView),
        (status = 422, description = "Malformed account", body = crate::error::ErrorBody),
    ),
    tag = "airlines"
)]
pub async fn is_active(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<ActiveView>, AppError> {
    let account = account_param(&account)?;
    let active = state.ledger.read(|ledger| ledger.is_active(&account));
    Ok(Json(ActiveView { account, active }))
}

/// POST /v1/airlines/{account}/funding: Attach funds to an airline.
#[utoipa::path(
    post,
    path = "/v1/airlines/{account}/funding",
    params(("account" = String, Path, description = "Airline account, 0x-prefixed hex")),
    request_body = FundAirlineRequest,
    responses(
        (status = 200, description = "Funding recorded", body = AirlineView),
        (status = 404, description = "No such airline", body = crate::error::ErrorBody),
        (status = 422, description = "Below the membership fee", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "airlines"
)]
pub async fn fund_airline(
    State(state): State<AppState>,
    Path(account): Path<String>,
    body: Result<Json<FundAirlineRequest>, JsonRejection>,
) -> Result<Json<AirlineView>, AppError> {
    let account = account_param(&account)?;
    let req = extract_validated_json(body)?;
    let airline = state
        .ledger
        .with(|ledger| ledger.fund_airline(account, req.amount))?;
    Ok(Json(AirlineView::new(account, airline)))
}

/// POST /v1/airlines/{account}/approvals: Vote for a pending airline.
#[utoipa::path(
    post,
    path = "/v1/airlines/{account}/approvals",
    params(("account" = String, Path, description = "Candidate airline account, 0x-prefixed hex")),
    request_body = ApproveAirlineRequest,
    responses(
        (status = 200, description = "Vote recorded", body = AirlineView),
        (status = 403, description = "Requestor is not an active member", body = crate::error::ErrorBody),
        (status = 404, description = "No such airline", body = crate::error::ErrorBody),
        (status = 409, description = "Airline voted for itself", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "airlines"
)]
pub async fn approve_airline(
    State(state): State<AppState>,
    Path(account): Path<String>,
    body: Result<Json<ApproveAirlineRequest>, JsonRejection>,
) -> Result<Json<AirlineView>, AppError> {
    let candidate = account_param(&account)?;
    let req = extract_validated_json(body)?;
    let airline = state
        .ledger
        .with(|ledger| ledger.approve_airline(candidate, req.requestor))?;
    Ok(Json(AirlineView::new(candidate, airline)))
}
