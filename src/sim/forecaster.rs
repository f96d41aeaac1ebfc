//! Recursive (autoregressive) day-by-day demand forecaster.

use tracing::{debug, info};

use crate::error::{Result, SimError};
use crate::model::DemandModel;

use super::adjust::FeatureAdjuster;
use super::rolling::RollingState;
use super::types::{DailyRecord, ForecastDay, PriceAdjustment};

/// Drives the day-by-day loop for one product under one price adjustment.
///
/// For each day in order: adjust prices, project onto the model's features,
/// predict, clamp to zero, compute revenue, then advance the [`RollingState`]
/// that supplies the next day's lags and rolling mean. Day `i + 1` depends on
/// day `i`'s prediction, so days are never processed out of order.
pub struct RecursiveForecaster<'a, M: DemandModel + ?Sized> {
    model: &'a M,
}

impl<'a, M: DemandModel + ?Sized> RecursiveForecaster<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Forecasts the full horizon covered by `history`.
    ///
    /// # Arguments
    ///
    /// * `history` - Date-sorted daily records of a single product; day 0 carries the seeded lags
    /// * `adjustment` - Discount and competitor deltas applied to every day
    ///
    /// # Returns
    ///
    /// One [`ForecastDay`] per input record, in input order.
    ///
    /// # Errors
    ///
    /// Aborts on the first failure with no partial table: `EmptySeries`,
    /// `UnsortedInput`, `MissingDay`, `MixedProducts`, `UndefinedRatio`,
    /// `MissingFeature`, or `ModelInferenceFailure`.
    pub fn run(
        &self,
        history: &[DailyRecord],
        adjustment: PriceAdjustment,
    ) -> Result<Vec<ForecastDay>> {
        validate_series(history)?;

        let adjuster = FeatureAdjuster::new(adjustment);
        let n = history.len();
        let mut state = RollingState::seed(history[0].lags);
        let mut days = Vec::with_capacity(n);

        info!(
            product = %history[0].product,
            horizon = n,
            discount_delta = adjustment.discount_delta,
            competitor_delta = adjustment.competitor_delta,
            model = self.model.name(),
            "starting recursive forecast"
        );

        for (i, source) in history.iter().enumerate() {
            let mut current = source.clone();
            if i > 0 {
                current.lags = state.lags();
                if let Some(mean) = state.mean() {
                    current.rolling_mean_7 = mean;
                }
            }

            let record = adjuster.apply(&current)?;
            let features = self.project(&record)?;

            let raw = self
                .model
                .predict(&features)
                .map_err(|reason| SimError::ModelInferenceFailure {
                    date: record.date,
                    reason,
                })?;
            if !raw.is_finite() {
                return Err(SimError::ModelInferenceFailure {
                    date: record.date,
                    reason: format!("non-finite prediction {raw}"),
                });
            }
            let predicted_units = raw.max(0.0);
            let revenue = predicted_units * record.sale_price;

            debug!(
                day = i,
                date = %record.date,
                raw,
                predicted_units,
                revenue,
                "forecast day"
            );

            if i + 1 < n {
                state = state.advance(predicted_units);
            }

            days.push(ForecastDay {
                record,
                predicted_units,
                revenue,
            });
        }

        Ok(days)
    }

    /// Builds the model's feature vector for one adjusted record.
    fn project(&self, record: &DailyRecord) -> Result<Vec<f64>> {
        self.model
            .feature_names()
            .iter()
            .map(|name| {
                record.feature(name).ok_or_else(|| SimError::MissingFeature {
                    feature: name.clone(),
                    date: record.date,
                })
            })
            .collect()
    }
}

/// Checks that `history` is a non-empty, single-product, gap-free daily series.
pub fn validate_series(history: &[DailyRecord]) -> Result<()> {
    let Some(first) = history.first() else {
        return Err(SimError::EmptySeries);
    };

    for (i, pair) in history.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.product != first.product {
            return Err(SimError::MixedProducts {
                expected: first.product.clone(),
                found: cur.product.clone(),
            });
        }
        if cur.date <= prev.date {
            return Err(SimError::UnsortedInput {
                index: i + 1,
                previous: prev.date,
                current: cur.date,
            });
        }
    }

    // ordering holds for the whole slice before gaps are reported
    for pair in history.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if prev.date.succ_opt() != Some(cur.date) {
            return Err(SimError::MissingDay {
                after: prev.date,
                next: cur.date,
            });
        }
    }
    Ok(())
}
