//! Unicode block sparklines for rate trends.

/// Eight-level glyph ramp, lowest first.
pub const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Glyph used when the series has no range.
pub const FLAT_BLOCK: char = '▄';

/// Maps a numeric series to a same-length glyph string.
pub struct SparklineGenerator;

impl SparklineGenerator {
    /// Render `values` as a sparkline.
    ///
    /// - empty input renders as an empty string
    /// - a flat series renders as the middle block
    /// - otherwise the minimum maps to `▁` and the maximum to `█`
    pub fn generate(values: &[f64]) -> String {
        if values.is_empty() {
            return String::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if min == max {
            return std::iter::repeat(FLAT_BLOCK).take(values.len()).collect();
        }

        let scale = (SPARK_BLOCKS.len() - 1) as f64;
        let range = max - min;

        values
            .iter()
            .map(|v| {
                let idx = ((v - min) / range * scale).floor();
                // NaN casts to 0; the clamp keeps rounding noise at the top in range
                SPARK_BLOCKS[(idx as usize).min(SPARK_BLOCKS.len() - 1)]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(SparklineGenerator::generate(&[]), "");
    }

    #[test]
    fn test_flat_series_uses_middle_block() {
        assert_eq!(SparklineGenerator::generate(&[100.0, 100.0, 100.0]), "▄▄▄");
        assert_eq!(SparklineGenerator::generate(&[50.0]), "▄");
    }

    #[test]
    fn test_min_and_max_blocks() {
        assert_eq!(SparklineGenerator::generate(&[10.0, 20.0]), "▁█");

        let line: Vec<char> = SparklineGenerator::generate(&[5.0, 10.0, 1.0, 8.0, 15.0])
            .chars()
            .collect();
        assert_eq!(line[2], '▁');
        assert_eq!(line[4], '█');
    }

    #[test]
    fn test_linear_ramp() {
        let values: Vec<f64> = (0..8).map(|i| i as f64).collect();
        assert_eq!(SparklineGenerator::generate(&values), "▁▂▃▄▅▆▇█");
    }

    #[test]
    fn test_realistic_week() {
        let values = [1450.0, 1452.5, 1448.0, 1455.0, 1460.0, 1458.0, 1462.0];
        let line: Vec<char> = SparklineGenerator::generate(&values).chars().collect();
        assert_eq!(line.len(), 7);
        assert_eq!(line[2], '▁');
        assert_eq!(line[6], '█');
        assert!(line.iter().all(|c| SPARK_BLOCKS.contains(c)));
    }
}
