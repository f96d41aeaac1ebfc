//! API response and query types.
//!
//! Forecast field names follow the CSV export columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sim::kpi::KpiReport;
use crate::sim::types::{ForecastDay, PriceAdjustment};

/// KPI summary of the main forecast.
#[derive(Debug, Serialize)]
pub struct KpiResponse {
    pub product: String,
    pub adjustment: PriceAdjustment,
    pub kpi: KpiReport,
}

/// One forecast day, flattened.
#[derive(Debug, Serialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub sale_price: f64,
    pub competitor_price_avg: f64,
    pub discount_pct: f64,
    pub price_ratio: f64,
    /// Previous day's demand as fed to the model.
    pub lag_1: f64,
    pub rolling_mean_7: f64,
    pub predicted_units: f64,
    pub revenue: f64,
}

impl From<&ForecastDay> for ForecastRecord {
    fn from(d: &ForecastDay) -> Self {
        let r = &d.record;
        Self {
            date: r.date,
            day_name: r.day_name(),
            sale_price: r.sale_price,
            competitor_price_avg: r.competitor_price_avg,
            discount_pct: r.discount_pct,
            price_ratio: r.price_ratio,
            lag_1: r.lags[0],
            rolling_mean_7: r.rolling_mean_7,
            predicted_units: d.predicted_units,
            revenue: d.revenue,
        }
    }
}

/// Optional date range for the forecast endpoint (`YYYY-MM-DD`, inclusive).
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
