//! What-if competitor scenarios run side by side.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::model::DemandModel;

use super::forecaster::RecursiveForecaster;
use super::kpi::KpiReport;
use super::types::{DailyRecord, PriceAdjustment};

/// A named competitor-price delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Display name, unique within a set.
    pub name: String,
    /// Competitor price change in percent.
    pub competitor_delta: i32,
}

impl Scenario {
    pub fn new(name: impl Into<String>, competitor_delta: i32) -> Self {
        Self {
            name: name.into(),
            competitor_delta,
        }
    }

    /// The standard comparison: unchanged, competitors 5% cheaper, competitors 5% dearer.
    pub fn default_set() -> Vec<Self> {
        vec![
            Self::new("No change (0%)", 0),
            Self::new("Competition low (-5%)", -5),
            Self::new("Competition high (+5%)", 5),
        ]
    }
}

/// Per-scenario totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub competitor_delta: i32,
    pub total_units: f64,
    pub total_revenue: f64,
}

/// Outcomes in scenario declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub discount_delta: i32,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl ScenarioComparison {
    /// Looks up an outcome by scenario name.
    pub fn get(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

impl fmt::Display for ScenarioComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--- Competitor Scenarios (discount {:+}%) ---",
            self.discount_delta
        )?;
        for o in &self.outcomes {
            write!(
                f,
                "\n{:<28} units={:>10.0}  revenue={:>12.2}",
                o.name, o.total_units, o.total_revenue
            )?;
        }
        Ok(())
    }
}

/// Runs the forecaster once per scenario over the same product and discount.
///
/// Scenarios share the read-only history; each run clones records per day and
/// owns its rolling state, so outcomes do not depend on execution order.
pub struct ScenarioRunner<'a, M: DemandModel + ?Sized> {
    model: &'a M,
}

impl<'a, M: DemandModel + ?Sized> ScenarioRunner<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Runs scenarios one after another, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first scenario's error; remaining scenarios are not run.
    pub fn run(
        &self,
        history: &[DailyRecord],
        discount_delta: i32,
        scenarios: &[Scenario],
    ) -> Result<ScenarioComparison> {
        let outcomes = scenarios
            .iter()
            .map(|s| self.run_one(history, discount_delta, s))
            .collect::<Result<Vec<_>>>()?;
        Ok(ScenarioComparison {
            discount_delta,
            outcomes,
        })
    }

    /// Runs scenarios concurrently on the rayon pool.
    ///
    /// Results are identical to [`run`](ScenarioRunner::run). All scenarios
    /// may start before a failure is observed; the error reported is the one
    /// from the earliest failing scenario in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the earliest failing scenario's error.
    pub fn run_parallel(
        &self,
        history: &[DailyRecord],
        discount_delta: i32,
        scenarios: &[Scenario],
    ) -> Result<ScenarioComparison> {
        let results: Vec<Result<ScenarioOutcome>> = scenarios
            .par_iter()
            .map(|s| self.run_one(history, discount_delta, s))
            .collect();
        let outcomes = results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(ScenarioComparison {
            discount_delta,
            outcomes,
        })
    }

    fn run_one(
        &self,
        history: &[DailyRecord],
        discount_delta: i32,
        scenario: &Scenario,
    ) -> Result<ScenarioOutcome> {
        let adjustment = PriceAdjustment::new(discount_delta, scenario.competitor_delta);
        let days = RecursiveForecaster::new(self.model).run(history, adjustment)?;
        let kpi = KpiReport::from_forecast(&days)?;

        info!(
            scenario = %scenario.name,
            total_units = kpi.total_units,
            total_revenue = kpi.total_revenue,
            "scenario complete"
        );

        Ok(ScenarioOutcome {
            name: scenario.name.clone(),
            competitor_delta: scenario.competitor_delta,
            total_units: kpi.total_units,
            total_revenue: kpi.total_revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::error::SimError;
    use crate::model::LinearModel;
    use crate::sim::types::Competitors;

    fn history(n: usize) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let comps = Competitors::new(["amazon", "decathlon"]);
        (0..n)
            .map(|i| {
                let mut r = DailyRecord::new("shoe", start + Days::new(i as u64), 80.0);
                r.competitor_prices = comps.quotes([("amazon", 85.0), ("decathlon", 95.0)]);
                r.lags = [12.0, 11.0, 10.0, 9.0, 8.0, 7.0, 6.0];
                r.rolling_mean_7 = 9.0;
                r
            })
            .collect()
    }

    fn price_sensitive_model() -> LinearModel {
        let coefs = BTreeMap::from([
            ("lag_1".to_string(), 0.6),
            ("rolling_mean_7".to_string(), 0.2),
            ("price_ratio".to_string(), -8.0),
        ]);
        LinearModel::new(10.0, &coefs)
    }

    #[test]
    fn default_set_has_three_named_deltas() {
        let set = Scenario::default_set();
        let deltas: Vec<i32> = set.iter().map(|s| s.competitor_delta).collect();
        assert_eq!(deltas, vec![0, -5, 5]);
    }

    #[test]
    fn cheaper_competitors_lower_demand() {
        let model = price_sensitive_model();
        let cmp = ScenarioRunner::new(&model)
            .run(&history(10), 0, &Scenario::default_set())
            .unwrap();
        let base = cmp.get("No change (0%)").unwrap();
        let low = cmp.get("Competition low (-5%)").unwrap();
        let high = cmp.get("Competition high (+5%)").unwrap();
        assert!(low.total_units < base.total_units);
        assert!(high.total_units > base.total_units);
    }

    #[test]
    fn parallel_matches_sequential() {
        let model = price_sensitive_model();
        let runner = ScenarioRunner::new(&model);
        let scenarios = vec![
            Scenario::new("a", -15),
            Scenario::new("b", 0),
            Scenario::new("c", 7),
            Scenario::new("d", 30),
        ];
        let seq = runner.run(&history(14), -10, &scenarios).unwrap();
        let par = runner.run_parallel(&history(14), -10, &scenarios).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn order_of_scenarios_does_not_change_outcomes() {
        let model = price_sensitive_model();
        let runner = ScenarioRunner::new(&model);
        let forward = Scenario::default_set();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = runner.run(&history(7), 5, &forward).unwrap();
        let b = runner.run(&history(7), 5, &reversed).unwrap();
        for o in &a.outcomes {
            assert_eq!(Some(o), b.get(&o.name));
        }
    }

    #[test]
    fn first_failure_surfaces() {
        let model = price_sensitive_model();
        let runner = ScenarioRunner::new(&model);
        // -100% zeroes every competitor price
        let scenarios = vec![Scenario::new("ok", 0), Scenario::new("wiped", -100)];
        let err = runner.run(&history(3), 0, &scenarios).unwrap_err();
        assert!(matches!(err, SimError::UndefinedRatio { .. }));
        let err = runner.run_parallel(&history(3), 0, &scenarios).unwrap_err();
        assert!(matches!(err, SimError::UndefinedRatio { .. }));
    }

    #[test]
    fn display_lists_every_scenario() {
        let model = price_sensitive_model();
        let cmp = ScenarioRunner::new(&model)
            .run(&history(3), 0, &Scenario::default_set())
            .unwrap();
        let text = format!("{cmp}");
        for s in Scenario::default_set() {
            assert!(text.contains(&s.name));
        }
    }
}
