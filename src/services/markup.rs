//! Helpers for Telegram HTML parse mode.
//!
//! Telegram rejects any tag outside its small supported set, so free text
//! must be escaped and only `<b>` / `<code>` are ever emitted by our formatters.

/// Escape text for inclusion in an HTML-mode message.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", text)
}

pub fn code(text: &str) -> String {
    format!("<code>{}</code>", text)
}

/// Format with thousands separators and two decimals, e.g. `1,425.00`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.001 rounds to 0.00 and should not carry a sign
    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };

    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1425.0), "1,425.00");
        assert_eq!(format_amount(945.5), "945.50");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(100.0), "100.00");
        assert_eq!(format_amount(999.999), "1,000.00");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(-1425.5), "-1,425.50");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_html("<i>x</i>"), "&lt;i&gt;x&lt;/i&gt;");
        assert_eq!(escape_html("RSI 28.5 - 과매도"), "RSI 28.5 - 과매도");
    }

    #[test]
    fn test_tags() {
        assert_eq!(bold("x"), "<b>x</b>");
        assert_eq!(code("x"), "<code>x</code>");
    }
}
