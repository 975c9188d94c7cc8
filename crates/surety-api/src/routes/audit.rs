//! # Audit Journal API
//!
//! Read access to the hash-chained journal of committed ledger events
//! and an on-demand chain verification.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use surety_ledger::AuditRecord;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::state::AppState;

/// Upper bound on records returned by one page.
const MAX_PAGE: usize = 500;

/// Journal page query.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Return records with sequence ≥ `since`.
    #[serde(default)]
    pub since: u64,
    /// Page size, capped at 500.
    pub limit: Option<usize>,
}

/// One sealed journal record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditRecordView {
    pub sequence: u64,
    /// Event name, e.g. `airline_registered`.
    pub event_type: String,
    /// Event payload as it was hashed.
    pub event: serde_json::Value,
    pub recorded_at: String,
    pub previous_digest: String,
    pub digest: String,
}

impl AuditRecordView {
    fn try_from_record(record: &AuditRecord) -> Result<Self, AppError> {
        let event = serde_json::to_value(&record.event)
            .map_err(|e| AppError::Internal(format!("event serialization: {e}")))?;
        Ok(Self {
            sequence: record.sequence,
            event_type: record.event.name().to_string(),
            event,
            recorded_at: record.recorded_at.to_canonical_string(),
            previous_digest: record.previous_digest.to_string(),
            digest: record.digest.to_string(),
        })
    }
}

/// A page of the journal.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditPage {
    pub total_events: u64,
    pub count: usize,
    /// Sequence to pass as `since` for the following page, if any.
    pub next: Option<u64>,
    pub records: Vec<AuditRecordView>,
}

/// Result of re-walking the chain.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChainReport {
    pub total_events: u64,
    pub chain_valid: bool,
    /// Sequences whose digest does not follow from their predecessor.
    pub broken_links: Vec<u64>,
    pub head: String,
}

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/audit/events", get(list_events))
        .route("/v1/audit/verify", get(verify_chain))
}

/// GET /v1/audit/events: Page through sealed journal records.
#[utoipa::path(
    get,
    path = "/v1/audit/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Journal page", body = AuditPage),
    ),
    tag = "audit"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<AuditPage>, AppError> {
    let limit = query.limit.unwrap_or(MAX_PAGE).clamp(1, MAX_PAGE);
    let (total_events, records) = state.ledger.read(|ledger| {
        let journal = ledger.audit();
        let page: Vec<AuditRecord> = journal
            .since(query.since)
            .iter()
            .take(limit)
            .cloned()
            .collect();
        (journal.len() as u64, page)
    });

    let records = records
        .iter()
        .map(AuditRecordView::try_from_record)
        .collect::<Result<Vec<_>, _>>()?;
    let next = records
        .last()
        .map(|r| r.sequence + 1)
        .filter(|next| *next < total_events);

    Ok(Json(AuditPage {
        total_events,
        count: records.len(),
        next,
        records,
    }))
}

/// GET /v1/audit/verify: Recompute every link of the chain.
#[utoipa::path(
    get,
    path = "/v1/audit/verify",
    responses(
        (status = 200, description = "Chain integrity report", body = ChainReport),
    ),
    tag = "audit"
)]
pub async fn verify_chain(State(state): State<AppState>) -> Json<ChainReport> {
    let report = state.ledger.read(|ledger| {
        let integrity = ledger.audit().verify();
        ChainReport {
            total_events: integrity.total_events,
            chain_valid: integrity.chain_valid,
            broken_links: integrity.broken_links,
            head: ledger.audit().head().to_string(),
        }
    });
    if !report.chain_valid {
        tracing::error!(broken = ?report.broken_links, "audit chain verification failed");
    }
    Json(report)
}
