//! SQLite storage for company metadata and cached daily prices.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use stockdash_api::PriceBar;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reference companies inserted when the table is empty.
const SEED_COMPANIES: [(&str, &str); 11] = [
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc. (Class A)"),
    ("AMZN", "Amazon.com, Inc."),
    ("META", "Meta Platforms, Inc."),
    ("TSLA", "Tesla, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("NFLX", "Netflix, Inc."),
    ("ADBE", "Adobe Inc."),
    ("INTC", "Intel Corporation"),
    ("AMD", "Advanced Micro Devices, Inc."),
];

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store used before init()")]
    Uninitialized,
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("date parse error: {0}")]
    Date(#[from] chrono::ParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub symbol: String,
    pub name: String,
}

/// File-backed price cache.
///
/// A single connection sits behind a mutex, so concurrent upserts from
/// different requests are applied one after another instead of racing.
/// Every read and write is refused until [`Store::init`] has succeeded.
pub struct Store {
    conn: Mutex<Connection>,
    initialized: AtomicBool,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            initialized: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_init(&self) -> Result<(), StoreError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(StoreError::Uninitialized)
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Create the schema if needed and seed the company table when empty.
    pub fn init(&self) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let schema = include_str!("../../schema/sqlite.sql");
        conn.execute_batch(schema)?;

        let count: i64 = conn.query_row("SELECT COUNT(1) FROM companies", [], |row| row.get(0))?;
        if count == 0 {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("INSERT INTO companies (symbol, name) VALUES (?1, ?2)")?;
                for (symbol, name) in SEED_COMPANIES {
                    stmt.execute(params![symbol, name])?;
                }
            }
            tx.commit()?;
            tracing::info!(companies = SEED_COMPANIES.len(), "seeded company table");
        }

        checkpoint(&conn)?;
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    /// Flush committed writes into the database file.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.ensure_init()?;
        checkpoint(&self.lock())
    }

    /// Insert or replace each bar keyed by `(symbol, date)`, then persist.
    pub fn upsert_prices(&self, symbol: &str, bars: &[PriceBar]) -> Result<usize, StoreError> {
        self.ensure_init()?;
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO prices (symbol, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(symbol, date) DO UPDATE SET
                   open = excluded.open,
                   high = excluded.high,
                   low = excluded.low,
                   close = excluded.close,
                   volume = excluded.volume",
            )?;
            for bar in bars {
                stmt.execute(params![
                    symbol,
                    bar.date.format(DATE_FORMAT).to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ])?;
            }
        }
        tx.commit()?;
        checkpoint(&conn)?;
        Ok(bars.len())
    }

    /// All cached bars for `symbol`, oldest first.
    pub fn read_prices(&self, symbol: &str) -> Result<Vec<PriceBar>, StoreError> {
        self.ensure_init()?;
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT date, open, high, low, close, volume
             FROM prices
             WHERE symbol = ?1
             ORDER BY date",
        )?;
        let rows = stmt
            .query_map(params![symbol], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, open, high, low, close, volume)| -> Result<PriceBar, StoreError> {
                Ok(PriceBar {
                    date: NaiveDate::parse_from_str(&date, DATE_FORMAT)?,
                    open,
                    high,
                    low,
                    close,
                    volume,
                })
            })
            .collect()
    }

    /// Non-null cached closes for `symbol`, oldest first.
    pub fn read_closes(&self, symbol: &str) -> Result<Vec<f64>, StoreError> {
        self.ensure_init()?;
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT close FROM prices
             WHERE symbol = ?1 AND close IS NOT NULL
             ORDER BY date",
        )?;
        let closes = stmt
            .query_map(params![symbol], |row| row.get::<_, f64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(closes)
    }

    pub fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        self.ensure_init()?;
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT symbol, name FROM companies ORDER BY symbol")?;
        let companies = stmt
            .query_map([], |row| {
                Ok(Company {
                    symbol: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(companies)
    }
}

fn checkpoint(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare("PRAGMA wal_checkpoint(FULL)")?;
    let mut rows = stmt.query([])?;
    while rows.next()?.is_some() {}
    Ok(())
}
