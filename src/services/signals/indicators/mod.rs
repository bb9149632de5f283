//! Technical indicator implementations.
//!
//! Every indicator reports "not enough data" as `None`. The free functions
//! below are shorthands over the indicator structs with explicit parameters.

pub mod bollinger;
pub mod cross;
pub mod low;
pub mod rsi;
pub mod sma;

pub use bollinger::{Bands, BollingerBands};
pub use cross::{MaCross, MaCrossover};
pub use low::{PeriodLow, PeriodLowPoint};
pub use rsi::Rsi;
pub use sma::Sma;

use super::Indicator;

/// Arithmetic mean of the last `period` prices.
pub fn moving_average(prices: &[f64], period: usize) -> Option<f64> {
    Sma::new(period).calculate(prices)
}

/// Wilder-smoothed RSI in `[0, 100]`.
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    Rsi::new(period).calculate(prices)
}

/// Bollinger bands over the last `period` prices.
pub fn bollinger_bands(prices: &[f64], period: usize, num_std: f64) -> Option<Bands> {
    BollingerBands::new(period, num_std).calculate(prices)
}

/// Lowest price and observation count over the whole series.
pub fn find_n_week_low(prices: &[f64], min_days: usize) -> Option<PeriodLowPoint> {
    PeriodLow::new(min_days).calculate(prices)
}

/// Golden or dead cross between yesterday and today, if any.
pub fn detect_ma_cross(prices: &[f64], short_period: usize, long_period: usize) -> Option<MaCross> {
    MaCrossover::new(short_period, long_period).calculate(prices)
}
