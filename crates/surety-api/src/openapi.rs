//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Flight Surety Consortium Ledger",
        version = "0.1.0",
        description = "Airline consortium registry with multi-party approval, flight insurance escrow, claim settlement, and a hash-chained audit journal.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Ledger
        crate::routes::ledger::ledger_summary,
        crate::routes::ledger::set_operational,
        crate::routes::ledger::contract_balance,
        crate::routes::ledger::consortium,
        crate::routes::ledger::metrics,
        // Airlines
        crate::routes::airlines::register_airline,
        crate::routes::airlines::get_airline,
        crate::routes::airlines::is_active,
        crate::routes::airlines::fund_airline,
        crate::routes::airlines::approve_airline,
        // Insurance
        crate::routes::insurance::buy_policy,
        crate::routes::insurance::credit_insurees,
        crate::routes::insurance::get_flight,
        crate::routes::insurance::get_passenger,
        crate::routes::insurance::pay_passenger,
        crate::routes::insurance::list_payouts,
        // Audit
        crate::routes::audit::list_events,
        crate::routes::audit::verify_chain,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::ledger::LedgerSummary,
        crate::routes::ledger::OperationalRequest,
        crate::routes::ledger::OperationalStatus,
        crate::routes::ledger::BalanceView,
        crate::routes::ledger::ConsortiumView,
        crate::routes::ledger::MetricsView,
        crate::routes::airlines::RegisterAirlineRequest,
        crate::routes::airlines::FundAirlineRequest,
        crate::routes::airlines::ApproveAirlineRequest,
        crate::routes::airlines::AirlineView,
        crate::routes::airlines::ActiveView,
        crate::routes::insurance::BuyPolicyRequest,
        crate::routes::insurance::PurchaseView,
        crate::routes::insurance::CreditView,
        crate::routes::insurance::CreditSummaryView,
        crate::routes::insurance::PositionView,
        crate::routes::insurance::FlightView,
        crate::routes::insurance::PassengerView,
        crate::routes::insurance::PayoutView,
        crate::routes::insurance::PayoutListView,
        crate::routes::audit::AuditRecordView,
        crate::routes::audit::AuditPage,
        crate::routes::audit::ChainReport,
    )),
    tags(
        (name = "ledger", description = "Operational flag and ledger-wide counters"),
        (name = "airlines", description = "Consortium registration, funding, and approvals"),
        (name = "insurance", description = "Premiums, claim crediting, and payouts"),
        (name = "audit", description = "Hash-chained event journal"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
