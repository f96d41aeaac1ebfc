//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use retail_sim::api::{AppState, router};
use retail_sim::config::ScenarioConfig;
use retail_sim::context::SimContext;

const FORECAST_KEYS: &[&str] = &[
    "date",
    "day_name",
    "sale_price",
    "competitor_price_avg",
    "discount_pct",
    "price_ratio",
    "lag_1",
    "rolling_mean_7",
    "predicted_units",
    "revenue",
];

/// Runs the promo preset end to end and returns the API state.
fn build_api_state() -> Arc<AppState> {
    let cfg = ScenarioConfig::promo();
    let ctx = SimContext::from_config(&cfg, None).unwrap();
    let product = ctx.resolve_product(None).unwrap();
    let adjustment = cfg.adjustment();
    let (forecast, kpi) = ctx.forecast_with_kpi(&product, adjustment).unwrap();
    let scenarios = ctx
        .compare(&product, adjustment.discount_delta, &cfg.scenarios, true)
        .unwrap();

    Arc::new(AppState {
        product,
        adjustment,
        kpi,
        forecast,
        scenarios,
    })
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn kpi_reports_promo_run() {
    let (status, json) = get("/kpi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["adjustment"]["discount_delta"], -20);
    let units = json["kpi"]["total_units"].as_f64().unwrap();
    assert!(units > 0.0);
}

#[tokio::test]
async fn forecast_rows_use_export_field_names() {
    let (status, json) = get("/forecast").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 30);
    for key in FORECAST_KEYS {
        assert!(rows[0].get(key).is_some(), "missing key {key}");
    }
}

#[tokio::test]
async fn forecast_range_is_inclusive() {
    let (status, json) = get("/forecast?from=2025-11-24&to=2025-11-30").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[4]["date"], "2025-11-28");
    assert_eq!(rows[4]["day_name"], "Friday");
}

#[tokio::test]
async fn reversed_range_is_rejected() {
    let (status, json) = get("/forecast?from=2025-11-30&to=2025-11-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("must be <="));
}

#[tokio::test]
async fn scenarios_endpoint_lists_every_scenario() {
    let (status, json) = get("/scenarios").await;
    assert_eq!(status, StatusCode::OK);
    let outcomes = json["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["competitor_delta"], 0);
}
