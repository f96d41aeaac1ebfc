//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::NaiveDate;

use super::AppState;
use super::types::{ErrorResponse, ForecastQuery, ForecastRecord, KpiResponse};
use crate::sim::scenario::ScenarioComparison;

/// `GET /kpi` → 200 + `KpiResponse` JSON
pub async fn get_kpi(State(state): State<Arc<AppState>>) -> Json<KpiResponse> {
    Json(KpiResponse {
        product: state.product.clone(),
        adjustment: state.adjustment,
        kpi: state.kpi.clone(),
    })
}

/// Returns forecast rows, optionally filtered by date range.
///
/// `GET /forecast` → 200 + `Vec<ForecastRecord>` JSON
/// `GET /forecast?from=2025-11-03&to=2025-11-09` → filtered range (inclusive)
/// `GET /forecast?from=2025-11-09&to=2025-11-03` → 400 + `ErrorResponse`
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(NaiveDate::MIN);
    let to = query.to.unwrap_or(NaiveDate::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<ForecastRecord> = state
        .forecast
        .iter()
        .filter(|d| d.record.date >= from && d.record.date <= to)
        .map(ForecastRecord::from)
        .collect();

    Ok(Json(records))
}

/// `GET /scenarios` → 200 + `ScenarioComparison` JSON
pub async fn get_scenarios(State(state): State<Arc<AppState>>) -> Json<ScenarioComparison> {
    Json(state.scenarios.clone())
}
