//! Simple Moving Average (SMA) indicator.

use crate::services::signals::{tail_mean, Indicator};

/// SMA (Simple Moving Average) indicator.
///
/// Calculates the arithmetic mean of the most recent `period` prices.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, prices: &[f64]) -> Option<f64> {
        if self.period == 0 || prices.len() < self.period {
            return None;
        }

        Some(tail_mean(prices, self.period))
    }
}
