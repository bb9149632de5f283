//! Bollinger Bands indicator.

use crate::services::signals::{tail_mean, Indicator};

/// Upper, middle and lower band values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// The standard deviation is the population deviation of the same window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    /// Calculate population standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

impl Indicator for BollingerBands {
    type Output = Bands;

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, prices: &[f64]) -> Option<Bands> {
        if self.period == 0 || prices.len() < self.period {
            return None;
        }

        let window = &prices[prices.len() - self.period..];
        let middle = tail_mean(prices, self.period);
        let half_width = self.std_dev_multiplier * Self::std_dev(window, middle);

        Some(Bands {
            upper: middle + half_width,
            middle,
            lower: middle - half_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bollinger_insufficient_data() {
        let bb = BollingerBands::default();
        assert!(bb.calculate(&[1400.0; 19]).is_none());
        assert!(bb.calculate(&[1400.0; 20]).is_some());
    }

    #[test]
    fn test_bollinger_zero_period() {
        assert!(BollingerBands::new(0, 2.0).calculate(&[1.0; 5]).is_none());
    }

    #[test]
    fn test_bollinger_constant_series_collapses() {
        let bands = BollingerBands::default().calculate(&[1400.0; 20]).unwrap();
        assert_eq!(bands.upper, 1400.0);
        assert_eq!(bands.middle, 1400.0);
        assert_eq!(bands.lower, 1400.0);
    }

    #[test]
    fn test_bollinger_population_std_dev() {
        // mean 5, population variance 4, std dev 2
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bands = BollingerBands::new(8, 2.0).calculate(&prices).unwrap();
        assert!((bands.middle - 5.0).abs() < 1e-12);
        assert!((bands.upper - 9.0).abs() < 1e-12);
        assert!((bands.lower - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_uses_last_window_only() {
        let mut prices = vec![10_000.0; 5];
        prices.extend([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let bands = BollingerBands::new(8, 1.0).calculate(&prices).unwrap();
        assert!((bands.middle - 5.0).abs() < 1e-12);
        assert!((bands.upper - 7.0).abs() < 1e-12);
    }
}
