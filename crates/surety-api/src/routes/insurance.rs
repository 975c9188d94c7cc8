//! # Insurance Escrow and Claims API
//!
//! Premium purchases per flight, claim crediting, passenger balances,
//! and payouts through the configured payout rail.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use surety_core::{AccountId, Amount, FlightKey};
use surety_ledger::{CreditSummary, FlightStatus, PayoutReceipt, PurchaseReceipt};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{account_param, extract_validated_json, flight_param, Validate};
use crate::state::AppState;

/// Buy insurance for a flight.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyPolicyRequest {
    #[schema(value_type = String)]
    pub passenger: AccountId,
    /// Premium in base units, as a decimal string or integer.
    #[schema(value_type = String)]
    pub amount: Amount,
}

impl Validate for BuyPolicyRequest {
    fn validate(&self) -> Result<(), String> {
        if self.amount.is_zero() {
            return Err("amount must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Result of a purchase.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseView {
    #[schema(value_type = String)]
    pub passenger: AccountId,
    #[schema(value_type = String)]
    pub flight: FlightKey,
    #[schema(value_type = String)]
    pub premium: Amount,
    #[schema(value_type = String)]
    pub old_balance: Amount,
    #[schema(value_type = String)]
    pub new_balance: Amount,
    pub participant_count: u64,
}

impl From<PurchaseReceipt> for PurchaseView {
    fn from(r: PurchaseReceipt) -> Self {
        Self {
            passenger: r.passenger,
            flight: r.flight,
            premium: r.premium,
            old_balance: r.old_balance,
            new_balance: r.new_balance,
            participant_count: r.participant_count,
        }
    }
}

/// One passenger's outcome from a credit run.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreditView {
    #[schema(value_type = String)]
    pub passenger: AccountId,
    #[schema(value_type = String)]
    pub premium: Amount,
    #[schema(value_type = String)]
    pub balance: Amount,
    #[schema(value_type = String)]
    pub withdrawable_balance: Amount,
}

/// Result of crediting a flight's insurees.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreditSummaryView {
    #[schema(value_type = String)]
    pub flight: FlightKey,
    pub participant_count: u64,
    pub credits: Vec<CreditView>,
}

impl From<CreditSummary> for CreditSummaryView {
    fn from(s: CreditSummary) -> Self {
        Self {
            flight: s.flight,
            participant_count: s.participant_count,
            credits: s
                .credits
                .into_iter()
                .map(|c| CreditView {
                    passenger: c.passenger,
                    premium: c.premium,
                    balance: c.balance,
                    withdrawable_balance: c.withdrawable_balance,
                })
                .collect(),
        }
    }
}

/// A live policy position on a flight.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PositionView {
    #[schema(value_type = String)]
    pub passenger: AccountId,
    #[schema(value_type = String)]
    pub paid: Amount,
}

/// Live participants of a flight.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlightView {
    #[schema(value_type = String)]
    pub flight: FlightKey,
    pub participant_count: u64,
    pub positions: Vec<PositionView>,
}

impl From<FlightStatus> for FlightView {
    fn from(s: FlightStatus) -> Self {
        Self {
            flight: s.flight,
            participant_count: s.participant_count,
            positions: s
                .positions
                .into_iter()
                .map(|p| PositionView {
                    passenger: p.passenger,
                    paid: p.paid,
                })
                .collect(),
        }
    }
}

/// Passenger balances.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PassengerView {
    #[schema(value_type = String)]
    pub account: AccountId,
    /// Premiums paid and not yet released by a credit run.
    #[schema(value_type = String)]
    pub balance: Amount,
    #[schema(value_type = String)]
    pub withdrawable_balance: Amount,
}

/// A settled payout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PayoutView {
    pub reference: uuid::Uuid,
    #[schema(value_type = String)]
    pub recipient: AccountId,
    #[schema(value_type = String)]
    pub amount: Amount,
    /// RFC 3339, UTC, whole seconds.
    pub settled_at: String,
}

impl From<PayoutReceipt> for PayoutView {
    fn from(r: PayoutReceipt) -> Self {
        Self {
            reference: r.reference,
            recipient: r.recipient,
            amount: r.amount,
            settled_at: r.settled_at.to_canonical_string(),
        }
    }
}

/// Everything the in-process payout journal has disbursed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PayoutListView {
    pub count: usize,
    #[schema(value_type = String)]
    pub total_disbursed: Amount,
    pub payouts: Vec<PayoutView>,
}

/// Build the insurance router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/flights/{flight}", get(get_flight))
        .route("/v1/flights/{flight}/policies", post(buy_policy))
        .route("/v1/flights/{flight}/credit", post(credit_insurees))
        .route("/v1/passengers/{account}", get(get_passenger))
        .route("/v1/passengers/{account}/payout", post(pay_passenger))
        .route("/v1/payouts", get(list_payouts))
}

/// POST /v1/flights/{flight}/policies: Buy insurance for a flight.
#[utoipa::path(
    post,
    path = "/v1/flights/{flight}/policies",
    params(("flight" = String, Path, description = "Flight key")),
    request_body = BuyPolicyRequest,
    responses(
        (status = 201, description = "Premium collected", body = PurchaseView),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "insurance"
)]
pub async fn buy_policy(
    State(state): State<AppState>,
    Path(flight): Path<String>,
    body: Result<Json<BuyPolicyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PurchaseView>), AppError> {
    let flight = flight_param(&flight)?;
    let req = extract_validated_json(body)?;
    let receipt = state
        .ledger
        .with(|ledger| ledger.buy(req.passenger, &flight, req.amount))?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// POST /v1/flights/{flight}/credit: Credit every live insuree of a flight.
///
/// A flight nobody insured is a no-op with an empty summary.
#[utoipa::path(
    post,
    path = "/v1/flights/{flight}/credit",
    params(("flight" = String, Path, description = "Flight key")),
    responses(
        (status = 200, description = "Credit run summary", body = CreditSummaryView),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "insurance"
)]
pub async fn credit_insurees(
    State(state): State<AppState>,
    Path(flight): Path<String>,
) -> Result<Json<CreditSummaryView>, AppError> {
    let flight = flight_param(&flight)?;
    let summary = state.ledger.with(|ledger| ledger.credit_insurees(&flight))?;
    Ok(Json(summary.into()))
}

/// GET /v1/flights/{flight}: Live participants of a flight.
#[utoipa::path(
    get,
    path = "/v1/flights/{flight}",
    params(("flight" = String, Path, description = "Flight key")),
    responses(
        (status = 200, description = "Flight participants", body = FlightView),
        (status = 404, description = "Nobody insured this flight", body = crate::error::ErrorBody),
    ),
    tag = "insurance"
)]
pub async fn get_flight(
    State(state): State<AppState>,
    Path(flight): Path<String>,
) -> Result<Json<FlightView>, AppError> {
    let flight = flight_param(&flight)?;
    let status = state
        .ledger
        .read(|ledger| ledger.flight_status(&flight))
        .ok_or_else(|| AppError::NotFound(format!("flight {flight}")))?;
    Ok(Json(status.into()))
}

/// GET /v1/passengers/{account}: Passenger balances.
#[utoipa::path(
    get,
    path = "/v1/passengers/{account}",
    params(("account" = String, Path, description = "Passenger account, 0x-prefixed hex")),
    responses(
        (status = 200, description = "Passenger balances", body = PassengerView),
        (status = 422, description = "Malformed account", body = crate::error::ErrorBody),
    ),
    tag = "insurance"
)]
pub async fn get_passenger(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<PassengerView>, AppError> {
    let account = account_param(&account)?;
    let passenger = state.ledger.read(|ledger| ledger.passenger_status(&account));
    Ok(Json(PassengerView {
        account,
        balance: passenger.balance,
        withdrawable_balance: passenger.withdrawable_balance,
    }))
}

/// POST /v1/passengers/{account}/payout: Pay out a passenger's balance.
#[utoipa::path(
    post,
    path = "/v1/passengers/{account}/payout",
    params(("account" = String, Path, description = "Passenger account, 0x-prefixed hex")),
    responses(
        (status = 200, description = "Payout settled", body = PayoutView),
        (status = 502, description = "Payout rail refused the transfer", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger paused", body = crate::error::ErrorBody),
    ),
    tag = "insurance"
)]
pub async fn pay_passenger(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<PayoutView>, AppError> {
    let account = account_param(&account)?;
    let receipt = state.ledger.with(|ledger| ledger.pay(account))?;
    Ok(Json(receipt.into()))
}

/// GET /v1/payouts: Disbursements recorded by the payout journal.
#[utoipa::path(
    get,
    path = "/v1/payouts",
    responses(
        (status = 200, description = "Disbursements", body = PayoutListView),
    ),
    tag = "insurance"
)]
pub async fn list_payouts(State(state): State<AppState>) -> Json<PayoutListView> {
    let view = state.ledger.read(|ledger| {
        let journal = ledger.transport();
        let payouts: Vec<PayoutView> = journal
            .disbursements()
            .iter()
            .cloned()
            .map(PayoutView::from)
            .collect();
        PayoutListView {
            count: payouts.len(),
            total_disbursed: journal.total_disbursed(),
            payouts,
        }
    });
    Json(view)
}
