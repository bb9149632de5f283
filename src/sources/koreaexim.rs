//! Korea Eximbank daily exchange rate API client.
//!
//! One GET per business day returns every quoted currency; numeric fields are
//! strings with thousands separators (`"1,425.5"`).

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};
use crate::types::{Currency, DailyRate};

pub const KOREAEXIM_URL: &str =
    "https://oapi.koreaexim.go.kr/site/program/financial/exchangeJSON";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Raw row from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct KoreaEximRate {
    pub cur_unit: String,
    #[serde(default)]
    pub ttb: String,
    #[serde(default)]
    pub tts: String,
    #[serde(default)]
    pub deal_bas_r: String,
    #[serde(default)]
    pub bkpr: String,
    #[serde(default)]
    pub cur_nm: String,
}

/// Korea Eximbank API client.
pub struct KoreaEximClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl KoreaEximClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        // the API host serves an incomplete certificate chain
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Fetch tracked-currency rates published for `date`.
    ///
    /// An empty vec means the bank published nothing for that day (weekend,
    /// holiday, or before the daily 11:00 publication).
    pub async fn fetch_rates(&self, date: NaiveDate) -> Result<Vec<DailyRate>> {
        if self.api_key.is_empty() {
            return Err(AppError::Config("EXCHANGE_RATE_API_KEY is not set".to_string()));
        }

        let search_date = date.format("%Y%m%d").to_string();
        let body = self.get_with_retry(&search_date).await?;
        let rates = parse_rates(&body, date)?;

        info!("Collected {} rate(s) for {}", rates.len(), search_date);
        Ok(rates)
    }

    async fn get_with_retry(&self, search_date: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            let result = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("authkey", self.api_key.as_str()),
                    ("searchdate", search_date),
                    ("data", "AP01"),
                ])
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.text().await?);
                }
                Ok(response)
                    if RETRY_STATUSES.contains(&response.status()) && attempt < MAX_RETRIES =>
                {
                    warn!(
                        "Rate API returned {} (attempt {}), retrying",
                        response.status(),
                        attempt + 1
                    );
                }
                Ok(response) => {
                    let status = response.status();
                    error!("Rate API error: {}", status);
                    return Err(AppError::ExternalApi(format!("Rate API returned {}", status)));
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < MAX_RETRIES => {
                    warn!("Rate API request failed (attempt {}): {}", attempt + 1, e);
                }
                Err(e) => {
                    error!("Rate API request failed: {}", e);
                    return Err(e.into());
                }
            }

            tokio::time::sleep(backoff(attempt)).await;
            attempt += 1;
        }
    }
}

/// Exponential backoff: 0.5s, 1s, 2s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS << attempt.min(6))
}

/// Parse an API response body into tracked-currency rates.
pub fn parse_rates(body: &str, date: NaiveDate) -> Result<Vec<DailyRate>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Err(AppError::ExternalApi(format!(
            "Unexpected rate API response: {}",
            value
        )));
    }

    let rows: Vec<KoreaEximRate> = serde_json::from_value(value)?;
    let mut rates = Vec::new();

    for row in rows {
        let Some(currency) = Currency::from_code(&row.cur_unit) else {
            continue;
        };
        if !currency.is_tracked() {
            continue;
        }

        rates.push(DailyRate {
            currency,
            ttb: parse_number(&row.ttb)?,
            tts: parse_number(&row.tts)?,
            deal_bas_r: parse_number(&row.deal_bas_r)?,
            bkpr: parse_number(&row.bkpr)?,
            cur_nm: row.cur_nm,
            search_date: date,
        });
    }

    debug!("Parsed {} tracked rate(s)", rates.len());
    Ok(rates)
}

/// Parse `"1,425.5"` style numbers.
fn parse_number(raw: &str) -> Result<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::InvalidData(format!("Invalid rate value: {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    const SAMPLE: &str = r#"[
        {"result":1,"cur_unit":"EUR","ttb":"1,490.1","tts":"1,520.2","deal_bas_r":"1,505.15","bkpr":"1,505","cur_nm":"유로"},
        {"result":1,"cur_unit":"JPY(100)","ttb":"935.55","tts":"954.44","deal_bas_r":"944.99","bkpr":"944","cur_nm":"일본 옌"},
        {"result":1,"cur_unit":"USD","ttb":"1,411.24","tts":"1,439.75","deal_bas_r":"1,425.5","bkpr":"1,425","cur_nm":"미국 달러"}
    ]"#;

    #[test]
    fn test_parse_keeps_tracked_only() {
        let rates = parse_rates(SAMPLE, date()).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].currency, Currency::Jpy100);
        assert_eq!(rates[1].currency, Currency::Usd);
    }

    #[test]
    fn test_parse_strips_separators() {
        let rates = parse_rates(SAMPLE, date()).unwrap();
        let usd = rates.iter().find(|r| r.currency == Currency::Usd).unwrap();
        assert_eq!(usd.deal_bas_r, 1425.5);
        assert_eq!(usd.ttb, 1411.24);
        assert_eq!(usd.bkpr, 1425.0);
        assert_eq!(usd.cur_nm, "미국 달러");
        assert_eq!(usd.search_date, date());
    }

    #[test]
    fn test_empty_array_is_no_data() {
        assert!(parse_rates("[]", date()).unwrap().is_empty());
    }

    #[test]
    fn test_non_array_is_error() {
        let err = parse_rates(r#"{"result":3}"#, date()).unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[test]
    fn test_bad_number_is_error() {
        let body = r#"[{"cur_unit":"USD","ttb":"n/a","tts":"1","deal_bas_r":"1","bkpr":"1","cur_nm":"x"}]"#;
        assert!(matches!(
            parse_rates(body, date()).unwrap_err(),
            AppError::InvalidData(_)
        ));
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(0), Duration::from_millis(500));
        assert_eq!(backoff(1), Duration::from_millis(1000));
        assert_eq!(backoff(2), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = KoreaEximClient::new("", KOREAEXIM_URL).unwrap();
        let err = client.fetch_rates(date()).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
