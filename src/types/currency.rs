use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency quoted against the Korean won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    /// Quoted per 100 yen.
    #[serde(rename = "JPY(100)")]
    Jpy100,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    /// Currencies that are collected, stored and analyzed.
    pub const TRACKED: [Currency; 2] = [Currency::Usd, Currency::Jpy100];

    /// Currency unit code as used by the rate API.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Jpy100 => "JPY(100)",
            Currency::Eur => "EUR",
        }
    }

    /// Parse from a currency unit code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "USD" => Some(Currency::Usd),
            "JPY(100)" => Some(Currency::Jpy100),
            "EUR" => Some(Currency::Eur),
            _ => None,
        }
    }

    /// Glyph shown in front of the currency in chat messages.
    pub fn glyph(&self) -> &'static str {
        match self {
            Currency::Usd => "💵",
            Currency::Jpy100 => "💴",
            Currency::Eur => "💶",
        }
    }

    /// Localized display name.
    pub fn name(&self) -> &'static str {
        match self {
            Currency::Usd => "달러",
            Currency::Jpy100 => "엔화",
            Currency::Eur => "유로",
        }
    }

    pub fn is_tracked(&self) -> bool {
        Self::TRACKED.contains(self)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
