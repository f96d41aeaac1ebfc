//! Process-wide simulation context: the loaded model and catalog.
//!
//! Built once at start-up from a validated [`ScenarioConfig`] and passed by
//! reference to everything that runs forecasts.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, ScenarioConfig};
use crate::error::SimError;
use crate::io::history::{Catalog, HistoryError};
use crate::io::synthetic::{SyntheticSpec, generate_catalog};
use crate::model::DemandModel;
use crate::sim::forecaster::RecursiveForecaster;
use crate::sim::kpi::KpiReport;
use crate::sim::scenario::{Scenario, ScenarioComparison, ScenarioRunner};
use crate::sim::types::{ForecastDay, PriceAdjustment};

/// Failure of a context-level operation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Read-only model and catalog shared by every run.
pub struct SimContext {
    model: Box<dyn DemandModel>,
    catalog: Catalog,
}

impl SimContext {
    pub fn new(model: Box<dyn DemandModel>, catalog: Catalog) -> Self {
        Self { model, catalog }
    }

    /// Builds the model and loads (or generates) the catalog.
    ///
    /// `history_override` replaces a configured CSV path, and switches a
    /// synthetic config to CSV.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Config`] for an unknown model kind and
    /// [`RunError::History`] if the CSV cannot be loaded.
    pub fn from_config(
        cfg: &ScenarioConfig,
        history_override: Option<&Path>,
    ) -> Result<Self, RunError> {
        let competitors = cfg.competitors();
        let h = &cfg.history;
        let csv_path = history_override.or(if h.source == "csv" {
            h.path.as_deref()
        } else {
            None
        });

        let catalog = match csv_path {
            Some(path) => Catalog::from_csv_path(path, competitors)?,
            None => generate_catalog(
                &SyntheticSpec {
                    start_date: h.start_date,
                    days: h.days,
                    products: h.products,
                    seed: h.seed,
                },
                &competitors,
            ),
        };
        let model = cfg.model.build()?;

        info!(
            products = catalog.len(),
            competitors = catalog.competitors().len(),
            model = model.name(),
            "context ready"
        );

        Ok(Self::new(model, catalog))
    }

    pub fn model(&self) -> &dyn DemandModel {
        self.model.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolves the product to simulate: the requested one, or the first in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::UnknownProduct`] if the product is absent or the catalog is empty.
    pub fn resolve_product(&self, requested: Option<&str>) -> Result<String, HistoryError> {
        match requested {
            Some(p) => self.catalog.slice(p).map(|_| p.to_string()),
            None => self
                .catalog
                .products()
                .next()
                .map(str::to_string)
                .ok_or_else(|| HistoryError::UnknownProduct("<empty catalog>".to_string())),
        }
    }

    /// Forecasts one product under one adjustment.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for an unknown product or any forecaster failure.
    pub fn forecast(
        &self,
        product: &str,
        adjustment: PriceAdjustment,
    ) -> Result<Vec<ForecastDay>, RunError> {
        let history = self.catalog.slice(product)?;
        Ok(RecursiveForecaster::new(self.model()).run(history, adjustment)?)
    }

    /// Forecasts and reduces to KPIs in one step.
    ///
    /// # Errors
    ///
    /// Same as [`forecast`](SimContext::forecast).
    pub fn forecast_with_kpi(
        &self,
        product: &str,
        adjustment: PriceAdjustment,
    ) -> Result<(Vec<ForecastDay>, KpiReport), RunError> {
        let days = self.forecast(product, adjustment)?;
        let kpi = KpiReport::from_forecast(&days)?;
        Ok((days, kpi))
    }

    /// Compares competitor scenarios for one product at a fixed discount.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for an unknown product or the first failing scenario.
    pub fn compare(
        &self,
        product: &str,
        discount_delta: i32,
        scenarios: &[Scenario],
        parallel: bool,
    ) -> Result<ScenarioComparison, RunError> {
        let history = self.catalog.slice(product)?;
        let runner = ScenarioRunner::new(self.model());
        let comparison = if parallel {
            runner.run_parallel(history, discount_delta, scenarios)?
        } else {
            runner.run(history, discount_delta, scenarios)?
        };
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConstantModel;
    use crate::sim::types::Competitors;

    fn context() -> SimContext {
        SimContext::from_config(&ScenarioConfig::baseline(), None).unwrap()
    }

    #[test]
    fn baseline_context_has_synthetic_catalog() {
        let ctx = context();
        assert_eq!(ctx.catalog().len(), 3);
        assert_eq!(ctx.model().name(), "linear");
    }

    #[test]
    fn resolve_product_defaults_to_first() {
        let ctx = context();
        let first = ctx.catalog().products().next().unwrap().to_string();
        assert_eq!(ctx.resolve_product(None).unwrap(), first);
        assert!(matches!(
            ctx.resolve_product(Some("Kayak")),
            Err(HistoryError::UnknownProduct(_))
        ));
    }

    #[test]
    fn forecast_covers_whole_history() {
        let ctx = context();
        let product = ctx.resolve_product(None).unwrap();
        let (days, kpi) = ctx
            .forecast_with_kpi(&product, PriceAdjustment::default())
            .unwrap();
        assert_eq!(days.len(), 30);
        assert!(days.iter().all(|d| d.predicted_units >= 0.0));
        let total: f64 = days.iter().map(|d| d.revenue).sum();
        assert!((kpi.total_revenue - total).abs() < 1e-9);
    }

    #[test]
    fn unknown_product_is_a_history_error() {
        let ctx = context();
        assert!(matches!(
            ctx.forecast("Kayak", PriceAdjustment::default()),
            Err(RunError::History(HistoryError::UnknownProduct(_)))
        ));
    }

    #[test]
    fn unknown_model_kind_is_rejected() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.model.kind = "lienar".to_string();
        assert!(matches!(
            SimContext::from_config(&cfg, None),
            Err(RunError::Config(ref e)) if e.field == "model.kind"
        ));
    }

    #[test]
    fn shuffled_csv_is_rejected_not_reordered() {
        let header = "product,date,base_price,amazon,lag_1,lag_2,lag_3,lag_4,lag_5,lag_6,lag_7,rolling_mean_7\n";
        let csv = format!(
            "{header}shoe,2025-11-03,100,95,1,1,1,1,1,1,1,1\n\
             shoe,2025-11-01,100,95,1,1,1,1,1,1,1,1\n\
             shoe,2025-11-02,100,95,1,1,1,1,1,1,1,1\n"
        );
        let catalog =
            Catalog::from_csv_reader(csv.as_bytes(), Competitors::new(["amazon"])).unwrap();
        let ctx = SimContext::new(Box::new(ConstantModel::new(4.0)), catalog);
        assert!(matches!(
            ctx.forecast("shoe", PriceAdjustment::default()),
            Err(RunError::Sim(SimError::UnsortedInput { index: 1, .. }))
        ));
    }

    #[test]
    fn wiped_out_competitors_surface_as_undefined_ratio() {
        let ctx = context();
        let product = ctx.resolve_product(None).unwrap();
        assert!(matches!(
            ctx.forecast(&product, PriceAdjustment::new(0, -100)),
            Err(RunError::Sim(SimError::UndefinedRatio { .. }))
        ));
    }

    #[test]
    fn compare_parallel_matches_sequential() {
        let cfg = ScenarioConfig::baseline();
        let catalog = SimContext::from_config(&cfg, None).unwrap().catalog;
        let ctx = SimContext::new(Box::new(ConstantModel::new(4.0)), catalog);
        let product = ctx.resolve_product(None).unwrap();
        let seq = ctx.compare(&product, -10, &cfg.scenarios, false).unwrap();
        let par = ctx.compare(&product, -10, &cfg.scenarios, true).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.outcomes.len(), 3);
    }
}
