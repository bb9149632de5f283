//! N-period low indicator.

use crate::services::signals::Indicator;

/// Lowest observation of a series and the number of observations it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodLowPoint {
    pub lowest: f64,
    pub days: usize,
}

impl PeriodLowPoint {
    /// Whole weeks covered, counting five business days per week.
    pub fn weeks(&self) -> usize {
        self.days / 5
    }
}

/// Lowest price over the entire supplied series.
///
/// The window is whatever history the caller passes in; `min_days` only
/// guards against drawing conclusions from too short a history.
pub struct PeriodLow {
    min_days: usize,
}

impl Default for PeriodLow {
    fn default() -> Self {
        Self { min_days: 10 }
    }
}

impl PeriodLow {
    pub fn new(min_days: usize) -> Self {
        Self { min_days }
    }
}

impl Indicator for PeriodLow {
    type Output = PeriodLowPoint;

    fn min_periods(&self) -> usize {
        self.min_days
    }

    fn calculate(&self, prices: &[f64]) -> Option<PeriodLowPoint> {
        if prices.is_empty() || prices.len() < self.min_days {
            return None;
        }

        let lowest = prices.iter().copied().fold(f64::INFINITY, f64::min);

        Some(PeriodLowPoint {
            lowest,
            days: prices.len(),
        })
    }
}
