//! REST API for a completed forecast run.
//!
//! Provides three GET endpoints:
//! - `/kpi`: product, adjustment, and KPI report
//! - `/forecast`: per-day forecast rows with optional date range filtering
//! - `/scenarios`: competitor scenario comparison

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::sim::kpi::KpiReport;
use crate::sim::scenario::ScenarioComparison;
use crate::sim::types::{ForecastDay, PriceAdjustment};

pub use types::{ErrorResponse, ForecastQuery, ForecastRecord, KpiResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once after the run completes; all data is read-only.
pub struct AppState {
    /// Forecasted product.
    pub product: String,
    /// Adjustment used for the main forecast.
    pub adjustment: PriceAdjustment,
    /// KPI report of the main forecast.
    pub kpi: KpiReport,
    /// Per-day forecast table.
    pub forecast: Vec<ForecastDay>,
    /// Competitor scenario outcomes.
    pub scenarios: ScenarioComparison,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/kpi", get(handlers::get_kpi))
        .route("/forecast", get(handlers::get_forecast))
        .route("/scenarios", get(handlers::get_scenarios))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
