/// Price and competitor feature adjustment.
pub mod adjust;
pub mod forecaster;
pub mod kpi;
/// Lag window and trailing-mean state.
pub mod rolling;
/// What-if scenario orchestration.
pub mod scenario;
pub mod types;
