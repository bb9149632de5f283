//! Daily job scheduler on Korean business days.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::services::notifier::{JobOutcome, Notifier};
use crate::sources::holiday::HolidayClient;

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Korea Standard Time (UTC+9, no DST).
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn now_kst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst())
}

/// Next occurrence of `at` strictly after `now`, in `now`'s timezone.
pub fn next_run_after(now: DateTime<FixedOffset>, at: NaiveTime) -> DateTime<FixedOffset> {
    let tz = *now.offset();
    let today = now.date_naive().and_time(at);
    let candidate = tz.from_local_datetime(&today).single();

    match candidate {
        Some(run) if run > now => run,
        _ => {
            let tomorrow = (now.date_naive() + Duration::days(1)).and_time(at);
            tz.from_local_datetime(&tomorrow)
                .single()
                .unwrap_or(now + Duration::days(1))
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Decide whether jobs run on `date` given the holiday lookup result.
///
/// A failed lookup counts as a business day.
pub fn is_business_day(date: NaiveDate, holiday: Result<Option<String>>) -> bool {
    if is_weekend(date) {
        info!("{} is a weekend, skipping", date);
        return false;
    }

    match holiday {
        Ok(Some(name)) => {
            info!("{} is {}, skipping", date, name);
            false
        }
        Ok(None) => true,
        Err(e) => {
            error!("Holiday check failed for {}, running anyway: {}", date, e);
            true
        }
    }
}

/// Weekend and public-holiday gate. Without a holiday client only weekends are skipped.
pub async fn should_run(date: NaiveDate, holidays: Option<&HolidayClient>) -> bool {
    if is_weekend(date) {
        return is_business_day(date, Ok(None));
    }

    match holidays {
        Some(client) => is_business_day(date, client.holiday_name(date).await),
        None => true,
    }
}

/// Runs the daily report and buy-signal jobs once a day.
pub struct Scheduler {
    notifier: Arc<Notifier>,
    holidays: Option<HolidayClient>,
    run_at: NaiveTime,
    run_immediately: bool,
}

impl Scheduler {
    pub fn new(
        notifier: Arc<Notifier>,
        holidays: Option<HolidayClient>,
        run_at: NaiveTime,
        run_immediately: bool,
    ) -> Self {
        Self {
            notifier,
            holidays,
            run_at,
            run_immediately,
        }
    }

    /// Run both jobs for today if it is a business day.
    pub async fn run_pass(&self) -> (JobOutcome, JobOutcome) {
        let now = now_kst();
        info!("Job pass started at {} KST", now.format("%Y-%m-%d %H:%M"));
        self.run_pass_on(now.date_naive()).await
    }

    /// Prune old rates, then run both jobs for `today` if it is a business day.
    pub async fn run_pass_on(&self, today: NaiveDate) -> (JobOutcome, JobOutcome) {
        if let Err(e) = self.notifier.prune_history(today) {
            error!("Pruning old rates failed: {}", e);
        }

        if !should_run(today, self.holidays.as_ref()).await {
            let reason = format!("{} is not a business day", today);
            return (JobOutcome::Skipped(reason.clone()), JobOutcome::Skipped(reason));
        }

        let report = self.notifier.run_daily_report(today).await;
        info!("Daily report: {}", report);

        let signals = self.notifier.run_buy_signal_analysis(today).await;
        info!("Buy signal analysis: {}", signals);

        (report, signals)
    }

    /// Loop forever, running one pass per day at the configured time.
    pub async fn run(self) {
        info!("Scheduler started, daily run at {} KST", self.run_at.format("%H:%M"));
        if self.holidays.is_none() {
            warn!("HOLIDAY_API_KEY not set, only weekends will be skipped");
        }

        if self.run_immediately {
            info!("Running jobs immediately");
            self.run_pass().await;
        }

        loop {
            let now = now_kst();
            let next = next_run_after(now, self.run_at);
            info!("Next run at {}", next.format("%Y-%m-%d %H:%M %Z"));

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            self.run_pass().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::rate_store::RateStore;
    use crate::services::telegram::TelegramSender;
    use crate::sources::koreaexim::{KoreaEximClient, KOREAEXIM_URL};
    use crate::types::{Currency, DailyRate};

    fn kst_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        kst().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn two_pm() -> NaiveTime {
        NaiveTime::from_hms_opt(14, 0, 0).unwrap()
    }

    #[test]
    fn test_kst_offset() {
        let utc = Utc.with_ymd_and_hms(2025, 1, 15, 5, 0, 0).unwrap();
        let local = utc.with_timezone(&kst());
        assert_eq!(local.format("%H:%M").to_string(), "14:00");
    }

    #[test]
    fn test_next_run_later_today() {
        let next = next_run_after(kst_at(2025, 1, 15, 9, 30), two_pm());
        assert_eq!(next, kst_at(2025, 1, 15, 14, 0));
    }

    #[test]
    fn test_next_run_tomorrow_when_passed() {
        assert_eq!(
            next_run_after(kst_at(2025, 1, 15, 14, 0), two_pm()),
            kst_at(2025, 1, 16, 14, 0)
        );
        assert_eq!(
            next_run_after(kst_at(2025, 1, 31, 23, 59), two_pm()),
            kst_at(2025, 2, 1, 14, 0)
        );
    }

    #[test]
    fn test_weekend() {
        // 2025-01-18 is a Saturday
        assert!(is_weekend(NaiveDate::from_ymd_opt(2025, 1, 18).unwrap()));
        assert!(is_weekend(NaiveDate::from_ymd_opt(2025, 1, 19).unwrap()));
        assert!(!is_weekend(NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()));
    }

    #[test]
    fn test_business_day_decision() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 1, 18).unwrap();
        let new_year = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert!(is_business_day(wednesday, Ok(None)));
        assert!(!is_business_day(saturday, Ok(None)));
        assert!(!is_business_day(new_year, Ok(Some("1월1일".to_string()))));
        assert!(is_business_day(
            wednesday,
            Err(AppError::ExternalApi("timeout".to_string()))
        ));
    }

    #[tokio::test]
    async fn test_pass_prunes_even_when_skipped() {
        let store = Arc::new(RateStore::new_in_memory().unwrap());
        let rows: Vec<DailyRate> = (1..=17)
            .map(|d| DailyRate {
                currency: Currency::Usd,
                ttb: 1400.0,
                tts: 1400.0,
                deal_bas_r: 1400.0,
                bkpr: 1400.0,
                cur_nm: "미국 달러".to_string(),
                search_date: NaiveDate::from_ymd_opt(2025, 1, d).unwrap(),
            })
            .collect();
        store.save_rates(&rows).unwrap();

        let notifier = Notifier::from_parts(
            KoreaEximClient::new("key", KOREAEXIM_URL).unwrap(),
            store.clone(),
            TelegramSender::new("123:abc", "42").unwrap(),
            7,
        )
        .with_retention_days(10);
        let scheduler = Scheduler::new(Arc::new(notifier), None, two_pm(), false);

        // 2025-01-18 is a Saturday: no network, only pruning
        let saturday = NaiveDate::from_ymd_opt(2025, 1, 18).unwrap();
        let (report, signals) = scheduler.run_pass_on(saturday).await;

        assert!(matches!(report, JobOutcome::Skipped(_)));
        assert!(matches!(signals, JobOutcome::Skipped(_)));
        assert_eq!(store.row_count(), 10);
        assert_eq!(store.latest_date().unwrap(), NaiveDate::from_ymd_opt(2025, 1, 17));
    }

    #[tokio::test]
    async fn test_should_run_without_holiday_client() {
        assert!(should_run(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), None).await);
        assert!(!should_run(NaiveDate::from_ymd_opt(2025, 1, 19).unwrap(), None).await);
    }
}
