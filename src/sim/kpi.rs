//! Post-hoc KPI computation from a forecast table.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, SimError};

use super::types::ForecastDay;

/// Summary metrics derived from a complete forecast run.
///
/// Computed post-hoc from the returned table so reported totals always agree
/// with the per-day rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    /// Sum of predicted units.
    pub total_units: f64,
    /// Sum of daily revenue.
    pub total_revenue: f64,
    /// Mean sale price.
    pub avg_price: f64,
    /// Mean discount percentage.
    pub avg_discount_pct: f64,
    /// Day (1-based day of month) with the highest predicted units, first one on ties.
    pub peak_day: u32,
    /// Predicted units on `peak_day`.
    pub peak_units: f64,
}

impl KpiReport {
    /// Reduces a forecast table to its KPIs.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptySeries`] for an empty table.
    pub fn from_forecast(days: &[ForecastDay]) -> Result<Self> {
        let Some(first) = days.first() else {
            return Err(SimError::EmptySeries);
        };

        let n = days.len() as f64;
        let mut total_units = 0.0_f64;
        let mut total_revenue = 0.0_f64;
        let mut price_sum = 0.0_f64;
        let mut discount_sum = 0.0_f64;
        let mut peak = first;

        for d in days {
            total_units += d.predicted_units;
            total_revenue += d.revenue;
            price_sum += d.record.sale_price;
            discount_sum += d.record.discount_pct;
            if d.predicted_units > peak.predicted_units {
                peak = d;
            }
        }

        Ok(Self {
            total_units,
            total_revenue,
            avg_price: price_sum / n,
            avg_discount_pct: discount_sum / n,
            peak_day: peak.record.day_of_month(),
            peak_units: peak.predicted_units,
        })
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Total units:           {:.0}", self.total_units)?;
        writeln!(f, "Projected revenue:     {:.2}", self.total_revenue)?;
        writeln!(f, "Average price:         {:.2}", self.avg_price)?;
        writeln!(f, "Average discount:      {:.1}%", self.avg_discount_pct)?;
        write!(
            f,
            "Peak day:              {} ({:.2} units)",
            self.peak_day, self.peak_units
        )
    }
}
