//! Core simulation types: daily records, competitor declarations, and forecast output.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Number of lagged demand values carried by each record (`lag_1..lag_7`).
pub const LAG_WINDOW: usize = 7;

/// Statically declared set of competitor identifiers.
///
/// Known at configuration time. Every [`DailyRecord`] built against this set
/// holds exactly one entry per identifier, so a competitor that does not list
/// a product is an explicit `None` rather than a missing column.
///
/// # Examples
///
/// ```
/// use retail_sim::sim::types::Competitors;
///
/// let comps = Competitors::new(["amazon", "decathlon"]);
/// assert_eq!(comps.len(), 2);
/// assert!(comps.contains("amazon"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Competitors {
    names: Vec<String>,
}

impl Competitors {
    /// Creates a competitor set from identifiers, dropping duplicates and keeping first-seen order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Self { names: out }
    }

    /// Declared identifiers in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Builds a quote map keyed by the declared set, filling unlisted competitors with `None`.
    pub fn quotes<'a>(
        &self,
        listed: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> BTreeMap<String, Option<f64>> {
        let mut map: BTreeMap<String, Option<f64>> =
            self.names.iter().map(|n| (n.clone(), None)).collect();
        for (name, price) in listed {
            if let Some(slot) = map.get_mut(name) {
                *slot = Some(price);
            }
        }
        map
    }
}

/// One calendar day of one product's series.
///
/// Historical records arrive with base and competitor prices plus the day-0
/// lag context already populated; derived prices are recomputed by the
/// feature adjuster and lags are rewritten by the forecaster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    /// Product this record belongs to.
    pub product: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// List price before any discount.
    pub base_price: f64,
    /// Price actually charged.
    pub sale_price: f64,
    /// Competitor quotes keyed by the declared competitor set (`None` = not listed).
    pub competitor_prices: BTreeMap<String, Option<f64>>,
    /// Mean over listed competitor quotes.
    pub competitor_price_avg: f64,
    /// `100 * (base_price - sale_price) / base_price`.
    pub discount_pct: f64,
    /// `sale_price / competitor_price_avg`.
    pub price_ratio: f64,
    /// Demand 1..7 days prior, most recent first.
    pub lags: [f64; LAG_WINDOW],
    /// Mean of the most recent (at most 7) demand values.
    pub rolling_mean_7: f64,
    /// Additional numeric features from the upstream feature pipeline, passed through untouched.
    pub extra_features: BTreeMap<String, f64>,
}

impl DailyRecord {
    /// Creates a record with no competitor quotes, zeroed lags, and derived prices equal to list price.
    pub fn new(product: impl Into<String>, date: NaiveDate, base_price: f64) -> Self {
        Self {
            product: product.into(),
            date,
            base_price,
            sale_price: base_price,
            competitor_prices: BTreeMap::new(),
            competitor_price_avg: 0.0,
            discount_pct: 0.0,
            price_ratio: 0.0,
            lags: [0.0; LAG_WINDOW],
            rolling_mean_7: 0.0,
            extra_features: BTreeMap::new(),
        }
    }

    /// Day of the month (1-based).
    pub fn day_of_month(&self) -> u32 {
        self.date.day()
    }

    /// English weekday name.
    pub fn day_name(&self) -> &'static str {
        match self.date.weekday() {
            chrono::Weekday::Mon => "Monday",
            chrono::Weekday::Tue => "Tuesday",
            chrono::Weekday::Wed => "Wednesday",
            chrono::Weekday::Thu => "Thursday",
            chrono::Weekday::Fri => "Friday",
            chrono::Weekday::Sat => "Saturday",
            chrono::Weekday::Sun => "Sunday",
        }
    }

    /// Demand `k` days prior (`k` in `1..=7`).
    pub fn lag(&self, k: usize) -> Option<f64> {
        if k == 0 {
            return None;
        }
        self.lags.get(k - 1).copied()
    }

    /// Looks up a model input by name.
    ///
    /// Returns `None` for unknown names and for competitors that do not list
    /// this product.
    pub fn feature(&self, name: &str) -> Option<f64> {
        match name {
            "base_price" => Some(self.base_price),
            "sale_price" => Some(self.sale_price),
            "competitor_price_avg" => Some(self.competitor_price_avg),
            "discount_pct" => Some(self.discount_pct),
            "price_ratio" => Some(self.price_ratio),
            "rolling_mean_7" => Some(self.rolling_mean_7),
            "day_of_month" => Some(f64::from(self.day_of_month())),
            "day_of_week" => Some(f64::from(self.date.weekday().num_days_from_monday())),
            _ => {
                if let Some(k) = name.strip_prefix("lag_").and_then(|s| s.parse::<usize>().ok()) {
                    return self.lag(k);
                }
                if let Some(quote) = self.competitor_prices.get(name) {
                    return *quote;
                }
                self.extra_features.get(name).copied()
            }
        }
    }
}

/// Price and competitor deltas applied uniformly across a run (integer percentages).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceAdjustment {
    /// `sale_price = base_price * (1 + discount_delta / 100)`.
    pub discount_delta: i32,
    /// Each listed competitor price is scaled by `1 + competitor_delta / 100`.
    pub competitor_delta: i32,
}

impl PriceAdjustment {
    pub fn new(discount_delta: i32, competitor_delta: i32) -> Self {
        Self {
            discount_delta,
            competitor_delta,
        }
    }

    /// Multiplier applied to the base price.
    pub fn discount_factor(&self) -> f64 {
        1.0 + f64::from(self.discount_delta) / 100.0
    }

    /// Multiplier applied to each competitor price.
    pub fn competitor_factor(&self) -> f64 {
        1.0 + f64::from(self.competitor_delta) / 100.0
    }
}

/// Complete record of one forecast day.
///
/// `record` holds the adjusted prices and the lag/rolling values actually fed
/// to the model for this day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    /// Adjusted input record.
    pub record: DailyRecord,
    /// Model output clamped to `>= 0`.
    pub predicted_units: f64,
    /// `predicted_units * sale_price`.
    pub revenue: f64,
}

impl fmt::Display for ForecastDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.record;
        write!(
            f,
            "{} {:<9} | price={:>8.2}  comp={:>8.2}  disc={:>5.1}% | units={:>8.2}  revenue={:>10.2}",
            r.date,
            r.day_name(),
            r.sale_price,
            r.competitor_price_avg,
            r.discount_pct,
            self.predicted_units,
            self.revenue,
        )
    }
}
