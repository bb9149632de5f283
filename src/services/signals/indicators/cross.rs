//! Moving-average crossover detection.

use serde::{Deserialize, Serialize};

use crate::services::signals::{tail_mean, Indicator};

/// Crossing event between the short and long moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaCross {
    /// Short MA moved from below to at-or-above the long MA.
    GoldenCross,
    /// Short MA moved from at-or-above to below the long MA.
    DeadCross,
}

/// Compares today's short/long moving averages with yesterday's.
///
/// "Yesterday" is the series with its last observation removed, so at
/// least `long_period + 1` observations are needed.
pub struct MaCrossover {
    short_period: usize,
    long_period: usize,
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 20,
        }
    }
}

impl MaCrossover {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
        }
    }
}

impl Indicator for MaCrossover {
    type Output = MaCross;

    fn min_periods(&self) -> usize {
        self.long_period + 1
    }

    /// Returns None when no crossing happened or the periods are unusable.
    fn calculate(&self, prices: &[f64]) -> Option<MaCross> {
        if self.short_period == 0 || self.long_period == 0 {
            return None;
        }
        if self.short_period >= self.long_period || prices.len() < self.min_periods() {
            return None;
        }

        let today_short = tail_mean(prices, self.short_period);
        let today_long = tail_mean(prices, self.long_period);

        let yesterday = &prices[..prices.len() - 1];
        let prev_short = tail_mean(yesterday, self.short_period);
        let prev_long = tail_mean(yesterday, self.long_period);

        if prev_short < prev_long && today_short >= today_long {
            Some(MaCross::GoldenCross)
        } else if prev_short >= prev_long && today_short < today_long {
            Some(MaCross::DeadCross)
        } else {
            None
        }
    }
}
