//! HTTP API for the Payroll Engine.
//!
//! This module exposes the computation core over a small REST API using
//! the [`axum`](https://crates.io/crates/axum) framework.  Clients can
//! post payroll records directly for computation or aggregation, or
//! query the payrolls loaded from the configured data directory.

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::discount::{apply_cascade, CascadeOutcome};
use crate::engine::{compute_many, compute_payroll};
use crate::error::PayrollError;
use crate::models::{
    AggregationResult, DiscountRule, PayrollBreakdown, PayrollFilter, PayrollRecord, PayrollRow,
    PayrollSummary,
};
use crate::money::Money;
use crate::source::{JsonDirSource, PayrollSource};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::path::Path as FsPath;
use std::sync::Arc;
use tracing::{debug, info};

/// Application state shared across requests.
pub struct AppState {
    pub source: Arc<dyn PayrollSource>,
}

impl IntoResponse for PayrollError {
    fn into_response(self) -> Response {
        let status = match &self {
            PayrollError::NotFound { .. } => StatusCode::NOT_FOUND,
            PayrollError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            PayrollError::Io(_) | PayrollError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({"error": self.to_string()}));
        (status, body).into_response()
    }
}

/// Build the API router around an existing payroll source.
pub fn router(source: Arc<dyn PayrollSource>) -> Router {
    let state = Arc::new(AppState { source });
    Router::new()
        .route("/api/payroll/compute", post(compute_handler))
        .route("/api/payroll/aggregate", post(aggregate_handler))
        .route("/api/discounts/cascade", post(cascade_handler))
        .route("/api/payrolls", get(list_handler))
        .route("/api/payrolls/:user_id/:year/:month", get(payroll_handler))
        .with_state(state)
}

/// Build the API router, loading payrolls from the given directory.
pub fn build_router(data_dir: &FsPath) -> Result<Router> {
    let source = JsonDirSource::load(data_dir)?;
    info!(dir = %data_dir.display(), payrolls = source.len(), "payroll data loaded");
    Ok(router(Arc::new(source)))
}

/// Handler for POST /api/payroll/compute
async fn compute_handler(Json(record): Json<PayrollRecord>) -> Json<PayrollBreakdown> {
    debug!(user_id = %record.user_id, "computing payroll");
    Json(compute_payroll(&record))
}

/// Handler for POST /api/payroll/aggregate
async fn aggregate_handler(Json(records): Json<Vec<PayrollRecord>>) -> Json<AggregationResult> {
    debug!(rows = records.len(), "aggregating payrolls");
    Json(aggregate(&records))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CascadeRequest {
    base_amount: Money,
    #[serde(default)]
    rules: Vec<DiscountRule>,
}

/// Handler for POST /api/discounts/cascade
async fn cascade_handler(Json(request): Json<CascadeRequest>) -> Json<CascadeOutcome> {
    Json(apply_cascade(request.base_amount, &request.rules))
}

/// Handler for GET /api/payrolls/:user_id/:year/:month
async fn payroll_handler(
    State(app_state): State<Arc<AppState>>,
    Path((user_id, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<PayrollBreakdown>, PayrollError> {
    // Look up the stored payroll and recompute it live
    let record = app_state
        .source
        .by_user_and_month(&user_id, year, month)
        .ok_or(PayrollError::NotFound {
            user_id,
            year,
            month,
        })?;
    Ok(Json(compute_payroll(&record)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    year: Option<i32>,
    /// Comma-separated months, e.g. `1,2,3`.
    months: Option<String>,
    /// Comma-separated user ids.
    user_ids: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<PayrollFilter, PayrollError> {
        let months = split_list(self.months.as_deref())
            .map(|month| match month.parse::<u32>() {
                Ok(m) if (1..=12).contains(&m) => Ok(m),
                _ => Err(PayrollError::InvalidFilter(format!("invalid month {:?}", month))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let user_ids = split_list(self.user_ids.as_deref()).map(str::to_string).collect();
        Ok(PayrollFilter {
            year: self.year,
            months,
            user_ids,
        })
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Handler for GET /api/payrolls
async fn list_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PayrollSummary>, PayrollError> {
    // Parse the comma-separated query into a filter
    let filter = query.into_filter()?;
    let records = app_state.source.many(&filter);
    debug!(rows = records.len(), "listing payrolls");

    // Totals come from the raw records; rows carry the computed breakdowns
    let totals = aggregate(&records);
    let rows = records
        .iter()
        .zip(compute_many(&records))
        .map(|(record, breakdown)| PayrollRow {
            month_label: record.month_label.clone(),
            breakdown,
        })
        .collect();
    Ok(Json(PayrollSummary { rows, totals }))
}

/// Launch the API server.  Payrolls are loaded from the configured
/// data directory and the server binds to the configured address.  It
/// blocks until the server terminates (e.g. when interrupted).
pub async fn serve(config: &Config) -> Result<()> {
    // Load payroll data before binding so a bad directory fails fast
    let router = build_router(&config.data_dir)?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
