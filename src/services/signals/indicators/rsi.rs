//! Relative Strength Index (RSI) indicator.

use crate::services::signals::Indicator;

/// RSI (Relative Strength Index) indicator, Wilder smoothing.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - 30 or below: Oversold (potential buy signal)
/// - 70 or above: Overbought (caution)
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Calculate RSI value from price changes.
    fn calculate_rsi(prices: &[f64], period: usize) -> Option<f64> {
        if period == 0 || prices.len() < period + 1 {
            return None;
        }

        let mut gains = Vec::with_capacity(prices.len() - 1);
        let mut losses = Vec::with_capacity(prices.len() - 1);

        for window in prices.windows(2) {
            let change = window[1] - window[0];
            if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        // Seed with plain averages over the first `period` changes
        let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
        let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

        let smoothing = (period - 1) as f64;
        for (gain, loss) in gains[period..].iter().zip(&losses[period..]) {
            avg_gain = (avg_gain * smoothing + gain) / period as f64;
            avg_loss = (avg_loss * smoothing + loss) / period as f64;
        }

        // No losses at all, including a flat series, pins RSI to 100
        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, prices: &[f64]) -> Option<f64> {
        Self::calculate_rsi(prices, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    fn downtrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 200.0 - i as f64 * 1.5).collect()
    }

    #[test]
    fn test_rsi_min_periods() {
        assert_eq!(Rsi::default().min_periods(), 15);
        assert_eq!(Rsi::new(7).min_periods(), 8);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let rsi = Rsi::default();
        assert!(rsi.calculate(&uptrend(14)).is_none());
        assert!(rsi.calculate(&uptrend(15)).is_some());
    }

    #[test]
    fn test_rsi_zero_period() {
        assert!(Rsi::new(0).calculate(&uptrend(30)).is_none());
    }

    #[test]
    fn test_rsi_uptrend_is_100() {
        let value = Rsi::default().calculate(&uptrend(50)).unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_rsi_downtrend_is_zero() {
        let value = Rsi::default().calculate(&downtrend(50)).unwrap();
        assert!(value < 10.0, "RSI in downtrend should be < 10, got {}", value);
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        let value = Rsi::default().calculate(&[1400.0; 20]).unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        // period 2: changes +2, -1, +1
        // seed: gain 1.0, loss 0.5; smoothed: gain (1.0 + 1) / 2 = 1.0, loss (0.5 + 0) / 2 = 0.25
        let value = Rsi::new(2).calculate(&[10.0, 12.0, 11.0, 12.0]).unwrap();
        assert!((value - 80.0).abs() < 1e-9, "got {}", value);
    }

    #[test]
    fn test_rsi_mixed_series_in_range() {
        let prices: Vec<f64> = (0..40)
            .map(|i| 1400.0 + ((i * 7) % 11) as f64 - 5.0)
            .collect();
        let value = Rsi::default().calculate(&prices).unwrap();
        assert!((0.0..=100.0).contains(&value));
    }
}
