//! Recursive per-product daily demand forecasting with price and competitor what-ifs.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod context;
pub mod error;
/// Catalog loading, synthetic data, and CSV export.
pub mod io;
pub mod model;
/// Forecasting core: adjustment, rolling state, forecaster, KPIs, scenarios.
pub mod sim;
