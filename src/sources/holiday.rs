//! Public holiday lookup (data.go.kr special-day information service).

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{AppError, Result};

pub const HOLIDAY_URL: &str =
    "http://apis.data.go.kr/B090041/openapi/service/SpcdeInfoService/getRestDeInfo";

const DEFAULT_HOLIDAY_NAME: &str = "공휴일";

/// Holiday API client.
pub struct HolidayClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HolidayClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Name of the holiday on `date`, or `None` for a regular day.
    pub async fn holiday_name(&self, date: NaiveDate) -> Result<Option<String>> {
        let year = date.year().to_string();
        let month = format!("{:02}", date.month());
        debug!("Holiday lookup for {}-{}", year, month);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("serviceKey", self.api_key.as_str()),
                ("solYear", year.as_str()),
                ("solMonth", month.as_str()),
                ("_type", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            error!("Holiday API error: {}", response.status());
            return Err(AppError::ExternalApi(format!(
                "Holiday API returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let name = parse_holiday_response(&body, date)?;

        match &name {
            Some(n) => info!("{} is a public holiday ({})", date, n),
            None => debug!("{} is not a public holiday", date),
        }
        Ok(name)
    }
}

/// Find the holiday named for `date` in a month listing.
pub fn parse_holiday_response(body: &str, date: NaiveDate) -> Result<Option<String>> {
    let root: Value = serde_json::from_str(body)?;
    let response = &root["response"];

    let header = &response["header"];
    match header["resultCode"].as_str() {
        Some("00") => {}
        Some(_) => {
            let msg = header["resultMsg"].as_str().unwrap_or("unknown error");
            return Err(AppError::ExternalApi(format!("Holiday API error: {}", msg)));
        }
        None => {
            return Err(AppError::ExternalApi(
                "Holiday API response has no result code".to_string(),
            ))
        }
    }

    // `items` is "" for a month without holidays; `item` is a bare object when
    // there is exactly one.
    let items = match &response["body"]["items"]["item"] {
        Value::Array(items) => items.iter().collect::<Vec<_>>(),
        item @ Value::Object(_) => vec![item],
        _ => Vec::new(),
    };

    let target = i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day());

    let name = items
        .into_iter()
        .filter(|item| locdate(item) == Some(target))
        .find(|item| item["isHoliday"].as_str() == Some("Y"))
        .map(|item| {
            item["dateName"]
                .as_str()
                .unwrap_or(DEFAULT_HOLIDAY_NAME)
                .to_string()
        });

    Ok(name)
}

/// `locdate` arrives as a number, but accept a string too.
fn locdate(item: &Value) -> Option<i64> {
    match &item["locdate"] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
