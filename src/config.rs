use chrono::NaiveTime;
use std::env;

use crate::error::{AppError, Result};
use crate::sources::holiday::HOLIDAY_URL;
use crate::sources::koreaexim::KOREAEXIM_URL;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Korea Eximbank API key.
    pub exchange_rate_api_key: String,
    /// Korea Eximbank rate endpoint.
    pub exchange_rate_api_url: String,
    /// Public holiday API key. Without it only weekends are skipped.
    pub holiday_api_key: Option<String>,
    /// Public holiday endpoint.
    pub holiday_api_url: String,
    /// Telegram bot token.
    pub telegram_bot_token: String,
    /// Destination chat.
    pub telegram_chat_id: String,
    /// SQLite database file.
    pub database_path: String,
    /// Daily run time (KST).
    pub schedule_time: NaiveTime,
    /// Run both jobs once at startup.
    pub run_immediately: bool,
    /// Calendar days of history shown in report sparklines.
    pub sparkline_days: u32,
    /// Calendar days of stored rates to keep. 0 keeps everything.
    pub retention_days: u32,
    /// Answer chat commands (/start, /help, /rate).
    pub bot_enabled: bool,
}

/// Shortest retention that still covers the indicator window and sparklines.
pub const MIN_RETENTION_DAYS: u32 = 60;

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange_rate_api_key: String::new(),
            exchange_rate_api_url: KOREAEXIM_URL.to_string(),
            holiday_api_key: None,
            holiday_api_url: HOLIDAY_URL.to_string(),
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            database_path: "exchange_rates.db".to_string(),
            schedule_time: default_schedule_time(),
            run_immediately: false,
            sparkline_days: 7,
            retention_days: 0,
            bot_enabled: true,
        }
    }
}

fn default_schedule_time() -> NaiveTime {
    NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| strip_quotes(&v).to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            exchange_rate_api_key: get("EXCHANGE_RATE_API_KEY").unwrap_or_default(),
            exchange_rate_api_url: get("EXCHANGE_RATE_API_URL")
                .unwrap_or(defaults.exchange_rate_api_url),
            holiday_api_key: get("HOLIDAY_API_KEY"),
            holiday_api_url: get("HOLIDAY_API_URL").unwrap_or(defaults.holiday_api_url),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            telegram_chat_id: get("TELEGRAM_CHAT_ID").unwrap_or_default(),
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            schedule_time: get("SCHEDULE_TIME")
                .and_then(|t| NaiveTime::parse_from_str(&t, "%H:%M").ok())
                .unwrap_or(defaults.schedule_time),
            run_immediately: get("RUN_IMMEDIATELY")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.run_immediately),
            sparkline_days: get("SPARKLINE_DAYS")
                .and_then(|d| d.parse().ok())
                .filter(|d| *d > 0)
                .unwrap_or(defaults.sparkline_days),
            retention_days: get("RETENTION_DAYS")
                .and_then(|d| d.parse::<u32>().ok())
                .map(|d| if d == 0 { 0 } else { d.max(MIN_RETENTION_DAYS) })
                .unwrap_or(defaults.retention_days),
            bot_enabled: get("BOT_ENABLED")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.bot_enabled),
        }
    }

    /// Check that every required setting is present.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("EXCHANGE_RATE_API_KEY", &self.exchange_rate_api_key),
            ("TELEGRAM_BOT_TOKEN", &self.telegram_bot_token),
            ("TELEGRAM_CHAT_ID", &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "missing environment variable(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Strip one pair of matching surrounding quotes and whitespace.
fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim();
        }
    }
    trimmed
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.exchange_rate_api_url, KOREAEXIM_URL);
        assert_eq!(config.holiday_api_url, HOLIDAY_URL);
        assert_eq!(config.database_path, "exchange_rates.db");
        assert_eq!(config.schedule_time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert!(!config.run_immediately);
        assert_eq!(config.sparkline_days, 7);
        assert!(config.holiday_api_key.is_none());
        assert_eq!(config.retention_days, 0);
        assert!(config.bot_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("EXCHANGE_RATE_API_KEY", "exim"),
            ("HOLIDAY_API_KEY", "holiday"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100200"),
            ("DATABASE_PATH", "/data/fx.db"),
            ("SCHEDULE_TIME", "09:30"),
            ("RUN_IMMEDIATELY", "TRUE"),
            ("SPARKLINE_DAYS", "14"),
            ("RETENTION_DAYS", "365"),
            ("BOT_ENABLED", "off"),
        ]);

        assert_eq!(config.exchange_rate_api_key, "exim");
        assert_eq!(config.holiday_api_key.as_deref(), Some("holiday"));
        assert_eq!(config.telegram_chat_id, "-100200");
        assert_eq!(config.database_path, "/data/fx.db");
        assert_eq!(config.schedule_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(config.run_immediately);
        assert_eq!(config.sparkline_days, 14);
        assert_eq!(config.retention_days, 365);
        assert!(!config.bot_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("SCHEDULE_TIME", "2pm"),
            ("SPARKLINE_DAYS", "0"),
            ("RUN_IMMEDIATELY", "nope"),
        ]);

        assert_eq!(config.schedule_time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert_eq!(config.sparkline_days, 7);
        assert!(!config.run_immediately);
    }

    #[test]
    fn test_retention_days_floor() {
        assert_eq!(config_from(&[("RETENTION_DAYS", "0")]).retention_days, 0);
        assert_eq!(config_from(&[("RETENTION_DAYS", "7")]).retention_days, MIN_RETENTION_DAYS);
        assert_eq!(config_from(&[("RETENTION_DAYS", "90")]).retention_days, 90);
        assert_eq!(config_from(&[("RETENTION_DAYS", "-1")]).retention_days, 0);
    }

    #[test]
    fn test_quotes_are_stripped() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "\"123:abc\""),
            ("TELEGRAM_CHAT_ID", " '42' "),
            ("HOLIDAY_API_KEY", "\"\""),
        ]);

        assert_eq!(config.telegram_bot_token, "123:abc");
        assert_eq!(config.telegram_chat_id, "42");
        assert!(config.holiday_api_key.is_none());
    }

    #[test]
    fn test_strip_quotes_only_matching_pair() {
        assert_eq!(strip_quotes("\"abc'"), "\"abc'");
        assert_eq!(strip_quotes("\"\"abc\"\""), "\"abc\"");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn test_validate_lists_missing() {
        let config = config_from(&[("TELEGRAM_CHAT_ID", "42")]);
        let err = config.validate().unwrap_err().to_string();

        assert!(err.contains("EXCHANGE_RATE_API_KEY"));
        assert!(err.contains("TELEGRAM_BOT_TOKEN"));
        assert!(!err.contains("TELEGRAM_CHAT_ID"));
    }
}
