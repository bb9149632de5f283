use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Currency;
use crate::error::AppError;

/// Condition detected for a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// Today's rate is at or below the lowest rate of the lookback window.
    NWeekLow,
    /// Short MA crossed above the long MA.
    GoldenCross,
    /// Short MA crossed below the long MA.
    DeadCross,
    RsiOversold,
    RsiOverbought,
    /// Rate touched the lower Bollinger band.
    BollingerLow,
    /// Rate touched the upper Bollinger band.
    BollingerHigh,
}

impl SignalType {
    pub const ALL: [SignalType; 7] = [
        SignalType::NWeekLow,
        SignalType::GoldenCross,
        SignalType::DeadCross,
        SignalType::RsiOversold,
        SignalType::RsiOverbought,
        SignalType::BollingerLow,
        SignalType::BollingerHigh,
    ];

    /// Tag used in logs and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::NWeekLow => "n_week_low",
            SignalType::GoldenCross => "golden_cross",
            SignalType::DeadCross => "dead_cross",
            SignalType::RsiOversold => "rsi_oversold",
            SignalType::RsiOverbought => "rsi_overbought",
            SignalType::BollingerLow => "bollinger_low",
            SignalType::BollingerHigh => "bollinger_high",
        }
    }

    /// Glyph prefixed to the signal line in chat messages.
    pub fn glyph(&self) -> &'static str {
        match self {
            SignalType::NWeekLow => "📉",
            SignalType::GoldenCross => "✨",
            SignalType::DeadCross => "⚠️",
            SignalType::RsiOversold => "🔋",
            SignalType::RsiOverbought => "🔥",
            SignalType::BollingerLow => "📊",
            SignalType::BollingerHigh => "📈",
        }
    }

    /// Whether this is a buy opportunity rather than a caution.
    pub fn is_buy(&self) -> bool {
        matches!(
            self,
            SignalType::NWeekLow
                | SignalType::GoldenCross
                | SignalType::RsiOversold
                | SignalType::BollingerLow
        )
    }
}

impl FromStr for SignalType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::InvalidData(format!("unknown signal type: {}", s)))
    }
}

/// A detected buy or caution condition for one currency.
///
/// Built once by the analyzer with its message already rendered; consumers
/// only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub currency: Currency,
    pub signal_type: SignalType,
    /// Human-readable explanation.
    pub message: String,
    /// Reference rate the condition was evaluated against.
    pub current_rate: f64,
    /// Indicator value backing the decision (RSI, band, low). None for crossovers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_value: Option<f64>,
}

impl Signal {
    pub fn new(
        currency: Currency,
        signal_type: SignalType,
        message: impl Into<String>,
        current_rate: f64,
        indicator_value: Option<f64>,
    ) -> Self {
        Self {
            currency,
            signal_type,
            message: message.into(),
            current_rate,
            indicator_value,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.signal_type.is_buy()
    }
}
