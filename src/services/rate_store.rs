//! SQLite persistence for collected daily exchange rates.
//!
//! One row per currency per business day. The reference rate column
//! (`deal_bas_r`) is what the report and the signal analyzer read back.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::services::signals::PriceHistoryProvider;
use crate::types::{Currency, DailyRate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite store for daily rates.
pub struct RateStore {
    conn: Mutex<Connection>,
}

impl RateStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("Rate store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory rate store initialized");
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("rate store connection poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS exchange_rates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cur_unit TEXT NOT NULL,
                ttb REAL NOT NULL,
                tts REAL NOT NULL,
                deal_bas_r REAL NOT NULL,
                bkpr REAL NOT NULL,
                cur_nm TEXT NOT NULL,
                search_date TEXT NOT NULL,
                UNIQUE(cur_unit, search_date)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_exchange_rates_unit_date
             ON exchange_rates(cur_unit, search_date)",
            [],
        )?;

        Ok(())
    }

    /// Insert or replace rates. Returns the number of rows written.
    pub fn save_rates(&self, rates: &[DailyRate]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut written = 0;
        for rate in rates {
            written += tx.execute(
                "INSERT INTO exchange_rates
                 (cur_unit, ttb, tts, deal_bas_r, bkpr, cur_nm, search_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(cur_unit, search_date) DO UPDATE SET
                    ttb = excluded.ttb,
                    tts = excluded.tts,
                    deal_bas_r = excluded.deal_bas_r,
                    bkpr = excluded.bkpr,
                    cur_nm = excluded.cur_nm",
                params![
                    rate.currency.code(),
                    rate.ttb,
                    rate.tts,
                    rate.deal_bas_r,
                    rate.bkpr,
                    rate.cur_nm,
                    rate.search_date.format(DATE_FORMAT).to_string(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Saved {} exchange rate row(s)", written);
        Ok(written)
    }

    /// Reference rates of tracked currencies on a given day.
    pub fn rates_on(&self, date: NaiveDate) -> Result<HashMap<Currency, f64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT cur_unit, deal_bas_r FROM exchange_rates WHERE search_date = ?1",
        )?;

        let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut rates = HashMap::new();
        for row in rows {
            let (unit, rate) = row?;
            match Currency::from_code(&unit) {
                Some(currency) if currency.is_tracked() => {
                    rates.insert(currency, rate);
                }
                _ => debug!("Ignoring stored rate for untracked unit {}", unit),
            }
        }

        Ok(rates)
    }

    /// Last `days` reference rates for a currency, oldest first.
    pub fn recent_rates(&self, currency: Currency, days: usize) -> Result<Vec<f64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT deal_bas_r FROM exchange_rates
             WHERE cur_unit = ?1
             ORDER BY search_date DESC
             LIMIT ?2",
        )?;

        let mut rates = stmt
            .query_map(params![currency.code(), days as i64], |row| row.get::<_, f64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rates.reverse();

        Ok(rates)
    }

    /// Reference rates for a currency on or after `since`, oldest first.
    pub fn rates_since(&self, currency: Currency, since: NaiveDate) -> Result<Vec<f64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT deal_bas_r FROM exchange_rates
             WHERE cur_unit = ?1 AND search_date >= ?2
             ORDER BY search_date ASC",
        )?;

        let rates = stmt
            .query_map(
                params![currency.code(), since.format(DATE_FORMAT).to_string()],
                |row| row.get::<_, f64>(0),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rates)
    }

    /// Most recent collection date, or `None` for an empty store.
    pub fn latest_date(&self) -> Result<Option<NaiveDate>> {
        let conn = self.lock()?;
        let latest: Option<String> = conn
            .query_row("SELECT MAX(search_date) FROM exchange_rates", [], |row| row.get(0))
            .optional()?
            .flatten();

        latest
            .map(|d| {
                NaiveDate::parse_from_str(&d, DATE_FORMAT)
                    .map_err(|e| AppError::InvalidData(format!("stored date {:?}: {}", d, e)))
            })
            .transpose()
    }

    /// Delete rows dated before `cutoff`. Returns the number of rows removed.
    pub fn delete_before(&self, cutoff: NaiveDate) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM exchange_rates WHERE search_date < ?1",
            params![cutoff.format(DATE_FORMAT).to_string()],
        )?;

        if deleted > 0 {
            info!("Deleted {} exchange rate row(s) before {}", deleted, cutoff);
        }
        Ok(deleted)
    }

    /// Total stored row count.
    pub fn row_count(&self) -> usize {
        let conn = match self.lock() {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Cannot count rates: {}", e);
                return 0;
            }
        };
        conn.query_row("SELECT COUNT(*) FROM exchange_rates", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .unwrap_or(0)
    }
}

impl PriceHistoryProvider for RateStore {
    fn get_recent_rates(&self, currency: Currency, days: usize) -> Result<Vec<f64>> {
        self.recent_rates(currency, days)
    }
}
