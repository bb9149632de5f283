//! Buy-signal analyzer and message formatter tests

use fx_notifier::error::{AppError, Result};
use fx_notifier::services::signals::{BuySignalAnalyzer, PriceHistoryProvider, SignalMessageFormatter};
use fx_notifier::services::RateStore;
use fx_notifier::types::{Currency, DailyRate, Signal, SignalType};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;

const EXAMPLE_SERIES: [f64; 21] = [
    1420.0, 1415.0, 1410.0, 1405.0, 1400.0, 1410.0, 1415.0, 1420.0, 1425.0, 1430.0, 1425.0,
    1420.0, 1415.0, 1410.0, 1405.0, 1410.0, 1415.0, 1420.0, 1425.0, 1430.0, 1425.0,
];

/// Same history for every currency.
struct StaticHistory(Vec<f64>);

impl PriceHistoryProvider for StaticHistory {
    fn get_recent_rates(&self, _currency: Currency, days: usize) -> Result<Vec<f64>> {
        let start = self.0.len().saturating_sub(days);
        Ok(self.0[start..].to_vec())
    }
}

/// Fails for USD, serves the example series otherwise.
struct FailingUsd;

impl PriceHistoryProvider for FailingUsd {
    fn get_recent_rates(&self, currency: Currency, _days: usize) -> Result<Vec<f64>> {
        match currency {
            Currency::Usd => Err(AppError::Internal("history unavailable".to_string())),
            _ => Ok(EXAMPLE_SERIES.to_vec()),
        }
    }
}

fn analyzer(provider: impl PriceHistoryProvider + 'static) -> BuySignalAnalyzer {
    BuySignalAnalyzer::new(Arc::new(provider))
}

#[test]
fn test_end_to_end_n_week_low() {
    let signals = analyzer(StaticHistory(EXAMPLE_SERIES.to_vec()))
        .analyze_currency(Currency::Usd, 1395.0)
        .unwrap();

    let low = signals
        .iter()
        .find(|s| s.signal_type == SignalType::NWeekLow)
        .expect("n_week_low signal");
    assert_eq!(low.indicator_value, Some(1400.0));
    assert_eq!(low.current_rate, 1395.0);
    assert_eq!(low.message, "4주(21 영업일) 만에 최저가입니다. 매수를 고려해보세요");
}

#[test]
fn test_analyze_empty_and_untracked() {
    let analyzer = analyzer(StaticHistory(EXAMPLE_SERIES.to_vec()));
    assert!(analyzer.analyze(&HashMap::new()).is_empty());
    assert!(analyzer.analyze(&HashMap::from([(Currency::Eur, 1500.0)])).is_empty());
}

#[test]
fn test_failing_currency_does_not_block_others() {
    let analyzer = analyzer(FailingUsd);
    let today = HashMap::from([(Currency::Usd, 1395.0), (Currency::Jpy100, 1395.0)]);

    let signals = analyzer.analyze(&today);
    assert!(!signals.is_empty());
    assert!(signals.iter().all(|s| s.currency == Currency::Jpy100));
    assert!(signals.iter().any(|s| s.signal_type == SignalType::NWeekLow));

    assert!(analyzer.analyze_currency(Currency::Usd, 1395.0).is_err());
}

#[test]
fn test_invalid_today_rate_is_error() {
    let analyzer = analyzer(StaticHistory(EXAMPLE_SERIES.to_vec()));
    assert!(analyzer.analyze_currency(Currency::Usd, f64::NAN).is_err());
    assert!(analyzer.analyze_currency(Currency::Usd, 0.0).is_err());
}

#[test]
fn test_short_history_yields_nothing() {
    let signals = analyzer(StaticHistory(vec![1400.0, 1390.0, 1380.0]))
        .analyze_currency(Currency::Usd, 1300.0)
        .unwrap();
    assert!(signals.is_empty());
}

#[test]
fn test_analyzer_over_rate_store() {
    let store = Arc::new(RateStore::new_in_memory().unwrap());
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let rows: Vec<DailyRate> = EXAMPLE_SERIES
        .iter()
        .enumerate()
        .map(|(i, rate)| DailyRate {
            currency: Currency::Jpy100,
            ttb: *rate,
            tts: *rate,
            deal_bas_r: *rate,
            bkpr: *rate,
            cur_nm: "일본 옌".to_string(),
            search_date: start + Duration::days(i as i64),
        })
        .collect();
    store.save_rates(&rows).unwrap();

    let analyzer = BuySignalAnalyzer::new(store);
    let signals = analyzer.analyze(&HashMap::from([(Currency::Jpy100, 1395.0)]));
    assert!(signals
        .iter()
        .any(|s| s.currency == Currency::Jpy100 && s.signal_type == SignalType::NWeekLow));
}

#[test]
fn test_format_single_signal() {
    let signal = Signal::new(
        Currency::Usd,
        SignalType::RsiOversold,
        "RSI 27.3 - 과매도 구간, 반등 가능성",
        1425.0,
        Some(27.3),
    );
    let out = SignalMessageFormatter::new().format_signals(&[signal]);

    assert!(out.contains("USD"));
    assert!(out.contains("1,425.00"));
    assert!(out.contains("RSI 27.3 - 과매도 구간, 반등 가능성"));
    assert!(out.contains("🔋"));
}

#[test]
fn test_format_one_header_per_currency() {
    let signals = vec![
        Signal::new(Currency::Usd, SignalType::NWeekLow, "low", 1395.0, Some(1400.0)),
        Signal::new(Currency::Usd, SignalType::BollingerLow, "band", 1395.0, Some(1398.0)),
        Signal::new(Currency::Usd, SignalType::RsiOversold, "rsi", 1395.0, Some(25.0)),
    ];
    let out = SignalMessageFormatter::new().format_signals(&signals);

    assert_eq!(out.matches("달러(USD)").count(), 1);
    assert_eq!(out.lines().count(), 1 + 1 + 1 + 3);
}

#[test]
fn test_format_empty() {
    assert_eq!(SignalMessageFormatter::new().format_signals(&[]), "");
}
