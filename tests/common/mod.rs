//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use retail_sim::model::LinearModel;
use retail_sim::sim::types::{Competitors, DailyRecord};

/// First day of every fixture series (a Saturday).
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
}

/// Competitor set used by fixtures.
pub fn competitors() -> Competitors {
    Competitors::new(["amazon", "decathlon", "deporvillage"])
}

/// `days` consecutive records for one product, with `decathlon` not listing it.
///
/// Day-0 lags are `[20, 19, ..., 14]` and the seeded rolling mean is 17.
pub fn history(product: &str, base_price: f64, days: u64) -> Vec<DailyRecord> {
    let comps = competitors();
    (0..days)
        .map(|i| {
            let mut r = DailyRecord::new(product, start_date() + Days::new(i), base_price);
            r.competitor_prices = comps.quotes([
                ("amazon", base_price * 0.97),
                ("deporvillage", base_price * 1.05),
            ]);
            r.lags = [20.0, 19.0, 18.0, 17.0, 16.0, 15.0, 14.0];
            r.rolling_mean_7 = 17.0;
            r
        })
        .collect()
}

/// Price-sensitive autoregressive model.
pub fn linear_model() -> LinearModel {
    let coefficients = BTreeMap::from([
        ("lag_1".to_string(), 0.5),
        ("lag_7".to_string(), 0.1),
        ("rolling_mean_7".to_string(), 0.2),
        ("price_ratio".to_string(), -6.0),
        ("discount_pct".to_string(), 0.1),
    ]);
    LinearModel::new(8.0, &coefficients)
}

/// Model that drives demand negative so clamping kicks in.
pub fn collapsing_model() -> LinearModel {
    let coefficients = BTreeMap::from([("lag_1".to_string(), 0.5)]);
    LinearModel::new(-12.0, &coefficients)
}
