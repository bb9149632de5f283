//! Buy-signal analyzer.
//!
//! Runs every indicator check against a currency's recent reference-rate
//! history and turns the results into [`Signal`]s. Failures are isolated at
//! two levels: a failing check never suppresses the other checks of the same
//! currency, and a failing currency never suppresses the other currencies.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};
use crate::services::signals::indicators::{BollingerBands, MaCross, MaCrossover, PeriodLow, Rsi};
use crate::services::signals::Indicator;
use crate::types::{Currency, Signal, SignalType};

/// Minimum history for the N-week low check.
pub const N_WEEK_LOW_MIN_DAYS: usize = 10;
pub const MA_SHORT: usize = 5;
pub const MA_LONG: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;
/// Days of history pulled per currency, shared by all checks.
/// One more than the long MA so yesterday's long MA is still complete.
pub const HISTORY_DAYS: usize = MA_LONG + 1;

/// Source of daily reference-rate history.
pub trait PriceHistoryProvider: Send + Sync {
    /// Most recent `days` reference rates for `currency`, oldest first.
    ///
    /// Returning fewer than `days` values is fine; the affected checks are
    /// skipped as insufficient data.
    fn get_recent_rates(&self, currency: Currency, days: usize) -> Result<Vec<f64>>;
}

type Check = fn(&BuySignalAnalyzer, Currency, &[f64], f64) -> Result<Option<Signal>>;

/// Detects buy and caution conditions for the tracked currencies.
pub struct BuySignalAnalyzer {
    provider: Arc<dyn PriceHistoryProvider>,
    period_low: PeriodLow,
    crossover: MaCrossover,
    rsi: Rsi,
    bollinger: BollingerBands,
}

impl BuySignalAnalyzer {
    /// Create an analyzer reading history from `provider`.
    pub fn new(provider: Arc<dyn PriceHistoryProvider>) -> Self {
        Self {
            provider,
            period_low: PeriodLow::new(N_WEEK_LOW_MIN_DAYS),
            crossover: MaCrossover::new(MA_SHORT, MA_LONG),
            rsi: Rsi::new(RSI_PERIOD),
            bollinger: BollingerBands::new(BOLLINGER_PERIOD, BOLLINGER_STD),
        }
    }

    /// Analyze every tracked currency present in `today_rates`.
    ///
    /// Signals are returned grouped in tracked-currency order. Currencies
    /// that are untracked or missing are skipped, and a currency whose
    /// analysis fails contributes nothing.
    pub fn analyze(&self, today_rates: &HashMap<Currency, f64>) -> Vec<Signal> {
        let mut all_signals = Vec::new();

        for currency in Currency::TRACKED {
            let Some(&today_rate) = today_rates.get(&currency) else {
                warn!("{}: no rate for today - skipping analysis", currency);
                continue;
            };

            match self.analyze_currency(currency, today_rate) {
                Ok(signals) => {
                    if signals.is_empty() {
                        info!("{}: no signals detected", currency);
                    } else {
                        info!("{}: {} signal(s) detected", currency, signals.len());
                    }
                    all_signals.extend(signals);
                }
                Err(e) => {
                    error!("{}: analysis failed: {}", currency, e);
                }
            }
        }

        all_signals
    }

    /// Run all indicator checks for one currency against today's rate.
    ///
    /// Fails only when the history cannot be loaded or `today_rate` is not a
    /// positive finite number. Individual check failures are logged and skipped.
    pub fn analyze_currency(&self, currency: Currency, today_rate: f64) -> Result<Vec<Signal>> {
        if !today_rate.is_finite() || today_rate <= 0.0 {
            return Err(AppError::InvalidData(format!(
                "{}: invalid reference rate {}",
                currency, today_rate
            )));
        }

        let history = self.provider.get_recent_rates(currency, HISTORY_DAYS)?;
        let rates = &history[history.len().saturating_sub(HISTORY_DAYS)..];
        info!("{}: loaded {} day(s) of rate history", currency, rates.len());

        let checks: [(&str, Check); 4] = [
            ("n-week low", Self::check_period_low),
            ("MA cross", Self::check_ma_cross),
            ("RSI", Self::check_rsi),
            ("Bollinger", Self::check_bollinger),
        ];

        let mut signals = Vec::new();
        for (name, check) in checks {
            match check(self, currency, rates, today_rate) {
                Ok(Some(signal)) => {
                    debug!("{}: {} -> {}", currency, name, signal.signal_type.as_str());
                    signals.push(signal);
                }
                Ok(None) => {}
                Err(e) => {
                    error!("{}: {} check failed: {}", currency, name, e);
                }
            }
        }

        Ok(signals)
    }

    fn check_period_low(&self, currency: Currency, rates: &[f64], today_rate: f64) -> Result<Option<Signal>> {
        ensure_series(rates)?;

        let Some(low) = self.period_low.calculate(rates) else {
            info!(
                "{}: skipping n-week low - need {} days, have {}",
                currency,
                self.period_low.min_periods(),
                rates.len()
            );
            return Ok(None);
        };

        if today_rate > low.lowest {
            return Ok(None);
        }

        Ok(Some(Signal::new(
            currency,
            SignalType::NWeekLow,
            format!(
                "{}주({} 영업일) 만에 최저가입니다. 매수를 고려해보세요",
                low.weeks(),
                low.days
            ),
            today_rate,
            Some(low.lowest),
        )))
    }

    fn check_ma_cross(&self, currency: Currency, rates: &[f64], today_rate: f64) -> Result<Option<Signal>> {
        ensure_series(rates)?;

        if rates.len() < self.crossover.min_periods() {
            info!(
                "{}: skipping MA cross - need {} days, have {}",
                currency,
                self.crossover.min_periods(),
                rates.len()
            );
            return Ok(None);
        }

        let signal = match self.crossover.calculate(rates) {
            Some(MaCross::GoldenCross) => Signal::new(
                currency,
                SignalType::GoldenCross,
                "골든크로스 발생 - 단기 MA가 장기 MA를 상향 돌파",
                today_rate,
                None,
            ),
            Some(MaCross::DeadCross) => Signal::new(
                currency,
                SignalType::DeadCross,
                "데드크로스 발생 - 단기 MA가 장기 MA를 하향 돌파",
                today_rate,
                None,
            ),
            None => return Ok(None),
        };

        Ok(Some(signal))
    }

    fn check_rsi(&self, currency: Currency, rates: &[f64], today_rate: f64) -> Result<Option<Signal>> {
        ensure_series(rates)?;

        let Some(rsi) = self.rsi.calculate(rates) else {
            info!(
                "{}: skipping RSI - need {} days, have {}",
                currency,
                self.rsi.min_periods(),
                rates.len()
            );
            return Ok(None);
        };
        let rsi = ensure_finite("RSI", rsi)?;

        let signal = if rsi <= RSI_OVERSOLD {
            Signal::new(
                currency,
                SignalType::RsiOversold,
                format!("RSI {:.1} - 과매도 구간, 반등 가능성", rsi),
                today_rate,
                Some(rsi),
            )
        } else if rsi >= RSI_OVERBOUGHT {
            Signal::new(
                currency,
                SignalType::RsiOverbought,
                format!("RSI {:.1} - 과매수 구간, 주의 필요", rsi),
                today_rate,
                Some(rsi),
            )
        } else {
            return Ok(None);
        };

        Ok(Some(signal))
    }

    fn check_bollinger(&self, currency: Currency, rates: &[f64], today_rate: f64) -> Result<Option<Signal>> {
        ensure_series(rates)?;

        let Some(bands) = self.bollinger.calculate(rates) else {
            info!(
                "{}: skipping Bollinger bands - need {} days, have {}",
                currency,
                self.bollinger.min_periods(),
                rates.len()
            );
            return Ok(None);
        };
        let upper = ensure_finite("upper band", bands.upper)?;
        let lower = ensure_finite("lower band", bands.lower)?;

        let signal = if today_rate <= lower {
            Signal::new(
                currency,
                SignalType::BollingerLow,
                format!("볼린저 밴드 하단({:.2}) 터치 - 매수 신호", lower),
                today_rate,
                Some(lower),
            )
        } else if today_rate >= upper {
            Signal::new(
                currency,
                SignalType::BollingerHigh,
                format!("볼린저 밴드 상단({:.2}) 터치 - 과매수 주의", upper),
                today_rate,
                Some(upper),
            )
        } else {
            return Ok(None);
        };

        Ok(Some(signal))
    }
}

/// Reject series holding values that cannot be a quoted rate.
fn ensure_series(rates: &[f64]) -> Result<()> {
    match rates.iter().position(|r| !r.is_finite() || *r <= 0.0) {
        Some(idx) => Err(AppError::Indicator(format!(
            "malformed rate {} at position {}",
            rates[idx], idx
        ))),
        None => Ok(()),
    }
}

fn ensure_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::Indicator(format!("{} is not finite: {}", name, value)))
    }
}
