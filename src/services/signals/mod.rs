//! Buy-signal service module.
//!
//! Provides technical indicator calculations over daily reference-rate
//! series, the per-currency signal analyzer built on them, and the chat
//! message formatter for detected signals.

pub mod analyzer;
pub mod formatter;
pub mod indicators;

pub use analyzer::{BuySignalAnalyzer, PriceHistoryProvider};
pub use formatter::SignalMessageFormatter;

/// Trait for implementing technical indicators.
///
/// Implementations are pure: the result depends only on `prices`, which
/// must be ordered oldest first.
pub trait Indicator {
    type Output;

    /// Minimum number of observations required for calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator from a price series.
    /// Returns None if there is insufficient data or the parameters are unusable.
    fn calculate(&self, prices: &[f64]) -> Option<Self::Output>;
}

/// Arithmetic mean of the last `period` prices. Caller guarantees `prices.len() >= period > 0`.
pub(crate) fn tail_mean(prices: &[f64], period: usize) -> f64 {
    prices[prices.len() - period..].iter().sum::<f64>() / period as f64
}
