//! Historical catalog: per-product daily series, loaded from CSV.
//!
//! The CSV is expected to be pre-shaped by the upstream feature pipeline: one
//! row per (product, date) with base price, competitor quotes, and day-0 lag
//! context. Derived price columns are ignored because the adjuster
//! recomputes them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::sim::types::{Competitors, DailyRecord, LAG_WINDOW};

/// Errors raised while loading historical data.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("row {row}: column \"{column}\" is not a number: \"{value}\"")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: invalid date \"{value}\" (expected YYYY-MM-DD)")]
    BadDate { row: usize, value: String },
    #[error("unknown product \"{0}\"")]
    UnknownProduct(String),
}

/// Columns recomputed during simulation; ignored on load.
const DERIVED_COLUMNS: &[&str] = &[
    "sale_price",
    "competitor_price_avg",
    "discount_pct",
    "price_ratio",
    "predicted_units",
    "revenue",
];

/// Non-numeric descriptive columns; ignored on load.
const LABEL_COLUMNS: &[&str] = &["day_name", "day_of_month", "day_of_week"];

/// Historical series for every product, keyed by product name.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    competitors: Competitors,
    series: BTreeMap<String, Vec<DailyRecord>>,
}

impl Catalog {
    /// Groups records by product, keeping input order within each product.
    ///
    /// Rows are not reordered; an out-of-order series is rejected when it is
    /// forecast.
    pub fn from_records(competitors: Competitors, records: Vec<DailyRecord>) -> Self {
        let mut series: BTreeMap<String, Vec<DailyRecord>> = BTreeMap::new();
        for r in records {
            series.entry(r.product.clone()).or_default().push(r);
        }
        Self {
            competitors,
            series,
        }
    }

    pub fn competitors(&self) -> &Competitors {
        &self.competitors
    }

    /// Product names in sorted order.
    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Read-only slice of one product's history.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnknownProduct`] if the product is absent.
    pub fn slice(&self, product: &str) -> Result<&[DailyRecord], HistoryError> {
        self.series
            .get(product)
            .map(Vec::as_slice)
            .ok_or_else(|| HistoryError::UnknownProduct(product.to_string()))
    }

    /// Loads a catalog from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the file cannot be read or a row is malformed.
    pub fn from_csv_path(path: &Path, competitors: Competitors) -> Result<Self, HistoryError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file, competitors)
    }

    /// Loads a catalog from any CSV source.
    ///
    /// Required columns: `product`, `date`, `base_price`, `lag_1`..`lag_7`,
    /// `rolling_mean_7`. Declared competitor columns are optional; an empty
    /// cell means the competitor does not list the product. Any other numeric
    /// column becomes an extra feature.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] on missing columns or unparsable values.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        competitors: Competitors,
    ) -> Result<Self, HistoryError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let index_of = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            index_of(name).ok_or_else(|| HistoryError::MissingColumn(name.to_string()))
        };

        let product_idx = require("product")?;
        let date_idx = require("date")?;
        let base_idx = require("base_price")?;
        let rolling_idx = require("rolling_mean_7")?;
        let lag_idx = (1..=LAG_WINDOW)
            .map(|k| require(format!("lag_{k}").as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        let competitor_idx: Vec<(String, usize)> = competitors
            .names()
            .iter()
            .filter_map(|name| index_of(name.as_str()).map(|i| (name.clone(), i)))
            .collect();
        for name in competitors.names() {
            if index_of(name.as_str()).is_none() {
                warn!(competitor = %name, "declared competitor has no column; treated as not listed");
            }
        }

        let mut reserved: Vec<usize> = vec![product_idx, date_idx, base_idx, rolling_idx];
        reserved.extend(&lag_idx);
        reserved.extend(competitor_idx.iter().map(|(_, i)| *i));
        for &name in DERIVED_COLUMNS.iter().chain(LABEL_COLUMNS) {
            if let Some(i) = index_of(name) {
                reserved.push(i);
            }
        }
        let extra_idx: Vec<(String, usize)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !reserved.contains(i))
            .map(|(i, h)| (h.to_string(), i))
            .collect();

        let mut records = Vec::new();
        for (row_no, row) in rdr.records().enumerate() {
            let row = row?;
            let row_no = row_no + 1;
            let field = |i: usize| row.get(i).unwrap_or("");
            let number = |i: usize| -> Result<f64, HistoryError> {
                let raw = field(i);
                raw.parse::<f64>().map_err(|_| HistoryError::BadNumber {
                    row: row_no,
                    column: headers.get(i).unwrap_or("").to_string(),
                    value: raw.to_string(),
                })
            };

            let date = NaiveDate::parse_from_str(field(date_idx), "%Y-%m-%d").map_err(|_| {
                HistoryError::BadDate {
                    row: row_no,
                    value: field(date_idx).to_string(),
                }
            })?;

            let mut record = DailyRecord::new(field(product_idx), date, number(base_idx)?);
            for (k, &i) in lag_idx.iter().enumerate() {
                record.lags[k] = number(i)?;
            }
            record.rolling_mean_7 = number(rolling_idx)?;

            let mut listed = Vec::new();
            for (name, i) in &competitor_idx {
                if !field(*i).is_empty() {
                    listed.push((name.as_str(), number(*i)?));
                }
            }
            record.competitor_prices = competitors.quotes(listed);

            for (name, i) in &extra_idx {
                if field(*i).is_empty() {
                    continue;
                }
                match field(*i).parse::<f64>() {
                    Ok(v) => {
                        record.extra_features.insert(name.clone(), v);
                    }
                    Err(_) => debug!(row = row_no, column = %name, "skipping non-numeric column"),
                }
            }

            records.push(record);
        }

        Ok(Self::from_records(competitors, records))
    }
}
