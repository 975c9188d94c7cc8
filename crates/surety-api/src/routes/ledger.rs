//! # Ledger Administration API
//!
//! Operational flag, contract holdings, consortium counters, and the
//! request counters kept by the metrics middleware.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Ledger-wide summary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerSummary {
    pub operational: bool,
    #[schema(value_type = String)]
    pub owner: AccountId,
    pub founding_threshold: u64,
    #[schema(value_type = String)]
    pub membership_fee: Amount,
    pub total_registered_airlines: u64,
    #[schema(value_type = String)]
    pub contract_balance: Amount,
    pub audit_events: u64,
    /// Head of the audit chain, `sha256:`-prefixed.
    pub audit_head: String,
}

/// Set the operational flag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OperationalRequest {
    /// Account making the call; must be the ledger owner.
    #[schema(value_type = String)]
    pub caller: AccountId,
    pub mode: bool,
}

impl Validate for OperationalRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Operational flag after a change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OperationalStatus {
    pub operational: bool,
}

/// Funds currently held by the ledger.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceView {
    #[schema(value_type = String)]
    pub contract_balance: Amount,
}

/// Consortium size and the votes a new registration would need.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConsortiumView {
    pub total_registered_airlines: u64,
    pub founding_threshold: u64,
    pub required_votes: u64,
    /// Airline records of any state, including pending candidates.
    pub known_airlines: u64,
}

/// Request counters since process start.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricsView {
    pub requests: u64,
    pub errors: u64,
    /// Error responses by wire code, e.g. `NOT_ACTIVE_MEMBER` or `HTTP_405`.
    pub errors_by_code: BTreeMap<String, u64>,
}

/// Build the ledger administration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/ledger", get(ledger_summary))
        .route("/v1/ledger/operational", put(set_operational))
        .route("/v1/ledger/balance", get(contract_balance))
        .route("/v1/consortium", get(consortium))
        .route("/v1/metrics", get(metrics))
}

/// GET /v1/ledger: Ledger-wide summary.
#[utoipa::path(
    get,
    path = "/v1/ledger",
    responses(
        (status = 200, description = "Ledger summary", body = LedgerSummary),
    ),
    tag = "ledger"
)]
pub async fn ledger_summary(State(state): State<AppState>) -> Json<LedgerSummary> {
    let summary = state.ledger.read(|ledger| {
        let store = ledger.store();
        LedgerSummary {
            operational: ledger.is_operational(),
            owner: store.owner(),
            founding_threshold: store.founding_threshold(),
            membership_fee: store.membership_fee(),
            total_registered_airlines: ledger.total_registered_airlines(),
            contract_balance: ledger.contract_balance(),
            audit_events: ledger.audit().len() as u64,
            audit_head: ledger.audit().head().to_string(),
        }
    });
    Json(summary)
}

/// PUT /v1/ledger/operational: Pause or resume the ledger.
#[utoipa::path(
    put,
    path = "/v1/ledger/operational",
    request_body = OperationalRequest,
    responses(
        (status = 200, description = "Flag updated", body = OperationalStatus),
        (status = 403, description = "Caller is not the owner", body = crate::error::ErrorBody),
    ),
    tag = "ledger"
)]
pub async fn set_operational(
    State(state): State<AppState>,
    body: Result<Json<OperationalRequest>, JsonRejection>,
) -> Result<Json<OperationalStatus>, AppError> {
    let req = extract_validated_json(body)?;
    let operational = state.ledger.with(|ledger| {
        ledger.set_operating_status(&req.caller, req.mode)?;
        Ok::<_, AppError>(ledger.is_operational())
    })?;
    Ok(Json(OperationalStatus { operational }))
}

/// GET /v1/ledger/balance: Funds held by the ledger.
#[utoipa::path(
    get,
    path = "/v1/ledger/balance",
    responses(
        (status = 200, description = "Contract balance", body = BalanceView),
    ),
    tag = "ledger"
)]
pub async fn contract_balance(State(state): State<AppState>) -> Json<BalanceView> {
    Json(BalanceView {
        contract_balance: state.ledger.read(|ledger| ledger.contract_balance()),
    })
}

/// GET /v1/consortium: Consortium counters.
#[utoipa::path(
    get,
    path = "/v1/consortium",
    responses(
        (status = 200, description = "Consortium counters", body = ConsortiumView),
    ),
    tag = "ledger"
)]
pub async fn consortium(State(state): State<AppState>) -> Json<ConsortiumView> {
    let view = state.ledger.read(|ledger| ConsortiumView {
        total_registered_airlines: ledger.total_registered_airlines(),
        founding_threshold: ledger.store().founding_threshold(),
        required_votes: ledger.required_votes(),
        known_airlines: ledger.store().airline_count() as u64,
    });
    Json(view)
}

/// GET /v1/metrics: Request counters.
#[utoipa::path(
    get,
    path = "/v1/metrics",
    responses(
        (status = 200, description = "Request counters", body = MetricsView),
    ),
    tag = "ledger"
)]
pub async fn metrics(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsView> {
    let snapshot = metrics.snapshot();
    Json(MetricsView {
        requests: snapshot.requests,
        errors: snapshot.errors,
        errors_by_code: snapshot.errors_by_code,
    })
}
