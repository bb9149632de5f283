//! Daily jobs: collect rates, send the rate report, send buy signals.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::services::rate_report::RateReportFormatter;
use crate::services::rate_store::RateStore;
use crate::services::signals::{BuySignalAnalyzer, PriceHistoryProvider, SignalMessageFormatter};
use crate::services::sparkline::SparklineGenerator;
use crate::services::telegram::{ParseMode, TelegramSender};
use crate::sources::koreaexim::KoreaEximClient;
use crate::types::{Currency, Signal};

/// Result of one job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Skipped(String),
    Failed(String),
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Success => write!(f, "success"),
            JobOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            JobOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Keep buy signals, dropping caution signals.
pub fn buy_signals(signals: Vec<Signal>) -> Vec<Signal> {
    signals.into_iter().filter(Signal::is_buy).collect()
}

/// Runs the collection, report and signal jobs against one store and chat.
pub struct Notifier {
    collector: KoreaEximClient,
    store: Arc<RateStore>,
    telegram: TelegramSender,
    analyzer: BuySignalAnalyzer,
    report_formatter: RateReportFormatter,
    signal_formatter: SignalMessageFormatter,
    sparkline_days: u32,
    retention_days: u32,
}

impl Notifier {
    pub fn new(config: &Config, store: Arc<RateStore>) -> Result<Self> {
        let collector = KoreaEximClient::new(
            config.exchange_rate_api_key.clone(),
            config.exchange_rate_api_url.clone(),
        )?;
        let telegram = TelegramSender::new(
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
        )?;
        Ok(Self::from_parts(collector, store, telegram, config.sparkline_days)
            .with_retention_days(config.retention_days))
    }

    pub fn from_parts(
        collector: KoreaEximClient,
        store: Arc<RateStore>,
        telegram: TelegramSender,
        sparkline_days: u32,
    ) -> Self {
        let provider: Arc<dyn PriceHistoryProvider> = store.clone();
        Self {
            collector,
            analyzer: BuySignalAnalyzer::new(provider),
            store,
            telegram,
            report_formatter: RateReportFormatter::new(),
            signal_formatter: SignalMessageFormatter::new(),
            sparkline_days,
            retention_days: 0,
        }
    }

    /// Keep only the last `days` calendar days of rates. 0 disables pruning.
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Fetch and store rates for `date`. Returns the number of rows saved.
    pub async fn collect(&self, date: NaiveDate) -> Result<usize> {
        let rates = self.collector.fetch_rates(date).await?;
        if rates.is_empty() {
            warn!("No exchange rates published for {}", date);
            return Ok(0);
        }
        self.store.save_rates(&rates)
    }

    /// Today's rates in tracked order.
    fn ordered_rates(rates: &HashMap<Currency, f64>) -> Vec<(Currency, f64)> {
        Currency::TRACKED
            .iter()
            .filter_map(|c| rates.get(c).map(|r| (*c, *r)))
            .collect()
    }

    /// Build the daily report from stored rates. `None` when `today` has no rates.
    pub fn daily_report_message(&self, today: NaiveDate) -> Result<Option<String>> {
        let today_rates = self.store.rates_on(today)?;
        if today_rates.is_empty() {
            return Ok(None);
        }

        let yesterday = today - Duration::days(1);
        let yesterday_rates = self.store.rates_on(yesterday)?;

        let since = today - Duration::days(i64::from(self.sparkline_days));
        let mut sparklines = HashMap::new();
        for currency in Currency::TRACKED {
            let history = self.store.rates_since(currency, since)?;
            sparklines.insert(currency, SparklineGenerator::generate(&history));
        }

        Ok(Some(self.report_formatter.format_message(
            today,
            &Self::ordered_rates(&today_rates),
            &yesterday_rates,
            &sparklines,
        )))
    }

    /// Report for the most recent stored day. `None` when nothing is stored.
    pub fn latest_report_message(&self) -> Result<Option<String>> {
        match self.store.latest_date()? {
            Some(latest) => self.daily_report_message(latest),
            None => Ok(None),
        }
    }

    /// Build the buy-signal message. `None` when there is nothing to send.
    pub fn buy_signal_message(&self, today: NaiveDate) -> Result<Option<String>> {
        let today_rates = self.store.rates_on(today)?;
        if today_rates.is_empty() {
            warn!("Buy signal analysis: no rates stored for {}", today);
            return Ok(None);
        }

        let signals = self.analyzer.analyze(&today_rates);
        if signals.is_empty() {
            info!("Buy signal analysis: no signals detected");
            return Ok(None);
        }

        let buys = buy_signals(signals);
        if buys.is_empty() {
            info!("Buy signal analysis: caution signals only");
            return Ok(None);
        }

        info!("Buy signal analysis: {} buy signal(s)", buys.len());
        Ok(Some(self.signal_formatter.format_signals(&buys)))
    }

    /// Collect today's rates and send the rate report.
    pub async fn run_daily_report(&self, today: NaiveDate) -> JobOutcome {
        if let Err(e) = self.collect(today).await {
            error!("Rate collection failed: {}", e);
            return JobOutcome::Failed(format!("collection failed: {}", e));
        }

        let message = match self.daily_report_message(today) {
            Ok(Some(message)) => message,
            Ok(None) => {
                info!("No rates for {} (holiday or weekend), skipping report", today);
                return JobOutcome::Skipped(format!("no rates for {}", today));
            }
            Err(e) => {
                error!("Building daily report failed: {}", e);
                return JobOutcome::Failed(e.to_string());
            }
        };

        self.send(&message, "daily report").await
    }

    /// Analyze today's stored rates and send buy signals, if any.
    pub async fn run_buy_signal_analysis(&self, today: NaiveDate) -> JobOutcome {
        match self.buy_signal_message(today) {
            Ok(Some(message)) => self.send(&message, "buy signals").await,
            Ok(None) => JobOutcome::Skipped("no buy signals".to_string()),
            Err(e) => {
                error!("Buy signal analysis failed: {}", e);
                JobOutcome::Failed(e.to_string())
            }
        }
    }

    /// Drop rates older than the retention window. Returns the rows removed.
    pub fn prune_history(&self, today: NaiveDate) -> Result<usize> {
        if self.retention_days == 0 {
            return Ok(0);
        }

        let cutoff = today - Duration::days(i64::from(self.retention_days));
        let deleted = self.store.delete_before(cutoff)?;
        info!(
            "Retention: pruned {} row(s) before {}, {} remaining",
            deleted,
            cutoff,
            self.store.row_count()
        );
        Ok(deleted)
    }

    async fn send(&self, message: &str, what: &str) -> JobOutcome {
        match self.telegram.send_message(message, Some(ParseMode::Html)).await {
            Ok(()) => {
                info!("Sent {}", what);
                JobOutcome::Success
            }
            Err(e) => {
                error!("Sending {} failed: {}", what, e);
                JobOutcome::Failed(e.to_string())
            }
        }
    }
}
