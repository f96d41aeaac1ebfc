//! Price and competitor adjustments applied to a single record.

use crate::error::{Result, SimError};

use super::types::{DailyRecord, PriceAdjustment};

/// Pure transform that applies a [`PriceAdjustment`] to one record and
/// recomputes the derived price features.
///
/// Recomputed: `sale_price`, every listed competitor price,
/// `competitor_price_avg`, `discount_pct`, and `price_ratio`. All other fields
/// are copied unchanged. Applying the adjuster to the same input always yields
/// the same output; it never reads simulation state.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureAdjuster {
    adjustment: PriceAdjustment,
}

impl FeatureAdjuster {
    pub fn new(adjustment: PriceAdjustment) -> Self {
        Self { adjustment }
    }

    pub fn adjustment(&self) -> PriceAdjustment {
        self.adjustment
    }

    /// Returns an adjusted copy of `record`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UndefinedRatio`] if no competitor lists the product
    /// or the adjusted competitor average is zero (or otherwise non-finite as a divisor).
    pub fn apply(&self, record: &DailyRecord) -> Result<DailyRecord> {
        let mut out = record.clone();

        out.sale_price = record.base_price * self.adjustment.discount_factor();

        let competitor_factor = self.adjustment.competitor_factor();
        for quote in out.competitor_prices.values_mut() {
            if let Some(price) = quote {
                *price *= competitor_factor;
            }
        }

        let listed: Vec<f64> = out.competitor_prices.values().filter_map(|q| *q).collect();
        if listed.is_empty() {
            return Err(SimError::UndefinedRatio { date: record.date });
        }
        let avg = listed.iter().sum::<f64>() / listed.len() as f64;
        if avg == 0.0 || !avg.is_finite() {
            return Err(SimError::UndefinedRatio { date: record.date });
        }
        out.competitor_price_avg = avg;

        out.discount_pct = if record.base_price != 0.0 {
            100.0 * (record.base_price - out.sale_price) / record.base_price
        } else {
            0.0
        };
        out.price_ratio = out.sale_price / avg;

        Ok(out)
    }
}
