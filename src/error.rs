//! Error taxonomy for a forecast run.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that abort a single simulation run.
///
/// Every variant is run-aborting: a forecast either covers the whole horizon
/// or no table is returned at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The historical slice (or forecast table) has no records.
    #[error("series is empty")]
    EmptySeries,

    /// Dates are not strictly ascending.
    #[error("record {index} dated {current} does not follow {previous}")]
    UnsortedInput {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// Dates ascend but skip at least one calendar day.
    #[error("daily cadence broken: no record between {after} and {next}")]
    MissingDay { after: NaiveDate, next: NaiveDate },

    /// The slice holds records from more than one product.
    #[error("expected records for \"{expected}\" only, found \"{found}\"")]
    MixedProducts { expected: String, found: String },

    /// The model requires a feature the record cannot provide.
    #[error("feature \"{feature}\" required by the model is missing on {date}")]
    MissingFeature { feature: String, date: NaiveDate },

    /// `price_ratio` cannot be computed (no competitor quotes, or zero average).
    #[error("price ratio undefined on {date}: no usable competitor price")]
    UndefinedRatio { date: NaiveDate },

    /// The model failed or returned a non-finite value.
    #[error("model inference failed on {date}: {reason}")]
    ModelInferenceFailure { date: NaiveDate, reason: String },
}

/// Result alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
