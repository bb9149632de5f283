use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Currency;

/// One day's quote for a currency as published by the rate API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    pub currency: Currency,
    /// Telegraphic transfer buying rate.
    pub ttb: f64,
    /// Telegraphic transfer selling rate.
    pub tts: f64,
    /// Reference rate. This is the series the indicators run on.
    pub deal_bas_r: f64,
    /// Book price.
    pub bkpr: f64,
    /// Currency name as reported by the API.
    pub cur_nm: String,
    pub search_date: NaiveDate,
}
