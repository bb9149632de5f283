//! Chat message formatter for buy signals.

use crate::services::markup::{bold, escape_html, format_amount};
use crate::types::{Currency, Signal};

const BANNER: &str = "🚨 <b>환율 매수 신호 감지</b>";

/// Renders a signal list as one Telegram HTML message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalMessageFormatter;

impl SignalMessageFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Format signals grouped by currency.
    ///
    /// Currencies appear in the order they first occur in `signals`. Returns an
    /// empty string when there is nothing to report.
    pub fn format_signals(&self, signals: &[Signal]) -> String {
        if signals.is_empty() {
            return String::new();
        }

        let mut groups: Vec<(Currency, Vec<&Signal>)> = Vec::new();
        for signal in signals {
            match groups.iter_mut().find(|(c, _)| *c == signal.currency) {
                Some((_, group)) => group.push(signal),
                None => groups.push((signal.currency, vec![signal])),
            }
        }

        let mut lines = vec![BANNER.to_string()];
        for (currency, group) in &groups {
            lines.push(String::new());
            lines.push(Self::format_currency_block(*currency, group));
        }

        lines.join("\n")
    }

    /// Header line plus one line per signal.
    ///
    /// The header shows the first signal's rate; the analyzer builds every
    /// signal of a currency from the same rate.
    fn format_currency_block(currency: Currency, signals: &[&Signal]) -> String {
        let current_rate = signals.first().map(|s| s.current_rate).unwrap_or_default();

        let header = format!(
            "{} {} - 현재: {}원",
            currency.glyph(),
            bold(&format!("{}({})", currency.name(), currency.code())),
            format_amount(current_rate)
        );

        let mut lines = Vec::with_capacity(signals.len() + 1);
        lines.push(header);
        lines.extend(signals.iter().map(|s| Self::format_signal_line(s)));
        lines.join("\n")
    }

    fn format_signal_line(signal: &Signal) -> String {
        format!("{} {}", signal.signal_type.glyph(), escape_html(&signal.message))
    }
}
