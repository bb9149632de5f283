//! Daily exchange-rate report message.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::services::markup::{bold, code, format_amount};
use crate::types::Currency;

/// Builds the daily Telegram HTML rate table.
#[derive(Debug, Default, Clone, Copy)]
pub struct RateReportFormatter;

impl RateReportFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Format today's rates, in the given order, with day-over-day change and trend.
    ///
    /// `yesterday_rates` and `sparklines` may be missing entries; the change
    /// marker or trend line is then omitted for that currency.
    pub fn format_message(
        &self,
        date: NaiveDate,
        rates: &[(Currency, f64)],
        yesterday_rates: &HashMap<Currency, f64>,
        sparklines: &HashMap<Currency, String>,
    ) -> String {
        let mut lines = vec![format!(
            "📊 {}",
            bold(&format!("{} 환율 정보", date.format("%Y-%m-%d")))
        )];

        for (currency, today_rate) in rates {
            let sparkline = sparklines.get(currency).map(String::as_str).unwrap_or("");
            lines.push(String::new());
            lines.push(Self::format_currency_block(
                *currency,
                *today_rate,
                yesterday_rates.get(currency).copied(),
                sparkline,
            ));
        }

        lines.join("\n")
    }

    fn format_currency_block(
        currency: Currency,
        today_rate: f64,
        yesterday_rate: Option<f64>,
        sparkline: &str,
    ) -> String {
        let header = format!(
            "{} {}",
            currency.glyph(),
            bold(&format!("{}({})", Self::report_name(currency), currency.code()))
        );

        let rate = code(&format!("{}원", format_amount(today_rate)));
        let rate_line = match yesterday_rate {
            Some(yesterday) => format!("{} {}", rate, Self::format_change(today_rate, yesterday)),
            None => rate,
        };

        let mut parts = vec![header, rate_line];
        if !sparkline.is_empty() {
            parts.push(code(sparkline));
        }
        parts.join("\n")
    }

    /// Name shown in the report header. The yen is quoted per 100 units.
    fn report_name(currency: Currency) -> &'static str {
        match currency {
            Currency::Jpy100 => "엔화(100)",
            other => other.name(),
        }
    }

    fn format_change(today: f64, yesterday: f64) -> String {
        let diff = today - yesterday;
        if diff > 0.0 {
            format!("🟢 ↑{}", format_amount(diff.abs()))
        } else if diff < 0.0 {
            format!("🔴 ↓{}", format_amount(diff.abs()))
        } else {
            "─ 변동없음".to_string()
        }
    }
}
