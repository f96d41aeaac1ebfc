//! Lag window and trailing-mean state carried between forecast days.

use std::collections::VecDeque;

use super::types::LAG_WINDOW;

/// Immutable lag/rolling-mean state threaded through a recursive forecast.
///
/// `lags[0]` is `lag_1` (most recent). `recent` keeps at most
/// [`LAG_WINDOW`] predictions, oldest first. Each call to
/// [`advance`](RollingState::advance) returns a new state; nothing aliases the
/// record table.
///
/// # Examples
///
/// ```
/// use retail_sim::sim::rolling::RollingState;
///
/// let state = RollingState::seed([5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 0.0]);
/// let next = state.advance(10.0);
/// assert_eq!(next.lags()[0], 10.0);
/// assert_eq!(next.lags()[1], 5.0);
/// assert_eq!(next.mean(), Some(10.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RollingState {
    lags: [f64; LAG_WINDOW],
    recent: VecDeque<f64>,
}

impl RollingState {
    /// Initializes the lag window from externally supplied history.
    ///
    /// The trailing-mean buffer starts empty; only predictions made during the
    /// run contribute to it.
    pub fn seed(initial_lags: [f64; LAG_WINDOW]) -> Self {
        Self {
            lags: initial_lags,
            recent: VecDeque::with_capacity(LAG_WINDOW),
        }
    }

    /// Shifts in a new prediction.
    ///
    /// New `lag_1` is `prediction`, `lag_k` becomes the old `lag_(k-1)`, and
    /// the old `lag_7` is dropped. The prediction is appended to the trailing
    /// buffer, evicting the oldest value once the buffer holds seven.
    pub fn advance(&self, prediction: f64) -> Self {
        let mut lags = [0.0; LAG_WINDOW];
        lags[0] = prediction;
        lags[1..].copy_from_slice(&self.lags[..LAG_WINDOW - 1]);

        let mut recent = self.recent.clone();
        if recent.len() == LAG_WINDOW {
            recent.pop_front();
        }
        recent.push_back(prediction);

        Self { lags, recent }
    }

    /// Current lag window, most recent first.
    pub fn lags(&self) -> [f64; LAG_WINDOW] {
        self.lags
    }

    /// Predictions currently in the trailing buffer, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = f64> + '_ {
        self.recent.iter().copied()
    }

    /// Mean of the trailing buffer, or `None` before the first prediction.
    pub fn mean(&self) -> Option<f64> {
        if self.recent.is_empty() {
            return None;
        }
        Some(self.recent.iter().sum::<f64>() / self.recent.len() as f64)
    }
}
