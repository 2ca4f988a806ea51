use crate::error::{Result, WeatherError};
use crate::models::{
    AggregatedStat, Observation, ObservationFilter, StoredAggregate, StoredObservation,
};
use crate::store::{AggregateStore, ObservationStore, Upserted};
use crate::utils::constants::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_PAGE_SIZE};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use validator::Validate;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS weather_history (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    location             TEXT    NOT NULL CHECK (length(location) BETWEEN 1 AND 50),
    record_date          TEXT    NOT NULL,
    max_temp             INTEGER NOT NULL,
    min_temp             INTEGER NOT NULL,
    precipitation_amount INTEGER NOT NULL,
    created_at           TEXT    NOT NULL,
    UNIQUE (location, record_date)
);

CREATE TABLE IF NOT EXISTS weather_aggregated_data (
    id                       INTEGER PRIMARY KEY AUTOINCREMENT,
    location                 TEXT    NOT NULL CHECK (length(location) BETWEEN 1 AND 50),
    year                     INTEGER NOT NULL,
    avg_max_temp             REAL    NOT NULL,
    avg_min_temp             REAL    NOT NULL,
    sum_precipitation_amount REAL    NOT NULL,
    created_at               TEXT    NOT NULL,
    UNIQUE (location, year)
);
";

const OBSERVATION_COLUMNS: &str =
    "id, location, record_date, max_temp, min_temp, precipitation_amount, created_at";

const AGGREGATE_COLUMNS: &str =
    "id, location, year, avg_max_temp, avg_min_temp, sum_precipitation_amount, created_at";

/// SQLite database holding both stores. Cloning shares the connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    page_size: usize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))
    }

    /// Open (creating if needed) a database file. `busy_timeout` bounds how
    /// long a write waits on another process holding the lock.
    pub fn open_with_timeout(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Rows fetched per round-trip by lazy observation queries
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn observations(&self) -> ObservationRepository {
        ObservationRepository {
            conn: Arc::clone(&self.conn),
            page_size: self.page_size,
        }
    }

    pub fn aggregates(&self) -> AggregateRepository {
        AggregateRepository {
            conn: Arc::clone(&self.conn),
        }
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| WeatherError::StoreLockPoisoned)
}

fn map_observation_row(row: &Row<'_>) -> rusqlite::Result<StoredObservation> {
    Ok(StoredObservation {
        id: row.get(0)?,
        observation: Observation::new(
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ),
        created_at: row.get(6)?,
    })
}

fn map_aggregate_row(row: &Row<'_>) -> rusqlite::Result<StoredAggregate> {
    Ok(StoredAggregate {
        id: row.get(0)?,
        stat: AggregatedStat::new(
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ),
        created_at: row.get(6)?,
    })
}

#[derive(Clone)]
pub struct ObservationRepository {
    conn: Arc<Mutex<Connection>>,
    page_size: usize,
}

impl ObservationStore for ObservationRepository {
    type Rows = ObservationRows;

    fn upsert_if_absent(&self, observation: &Observation) -> Result<Upserted<StoredObservation>> {
        observation.validate()?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let changes = tx.execute(
            "INSERT OR IGNORE INTO weather_history (
                location, record_date, max_temp, min_temp, precipitation_amount, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                observation.location,
                observation.record_date,
                observation.max_temp,
                observation.min_temp,
                observation.precipitation_amount,
                Utc::now(),
            ],
        )?;

        let record = tx.query_row(
            &format!(
                "SELECT {} FROM weather_history WHERE location = ?1 AND record_date = ?2",
                OBSERVATION_COLUMNS
            ),
            params![observation.location, observation.record_date],
            map_observation_row,
        )?;

        tx.commit()?;

        Ok(Upserted {
            record,
            created: changes > 0,
        })
    }

    fn query(&self, filter: &ObservationFilter) -> Result<ObservationRows> {
        Ok(ObservationRows {
            conn: Arc::clone(&self.conn),
            filter: filter.clone(),
            page_size: self.page_size,
            after_id: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }
}

/// Lazy cursor over stored observations, ordered by primary key. Pages are
/// fetched on demand so the connection is never held between items.
pub struct ObservationRows {
    conn: Arc<Mutex<Connection>>,
    filter: ObservationFilter,
    page_size: usize,
    after_id: i64,
    buffer: VecDeque<StoredObservation>,
    exhausted: bool,
}

impl ObservationRows {
    fn fetch_page(&mut self) -> Result<()> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM weather_history
             WHERE id > ?1
               AND (?2 IS NULL OR location = ?2)
               AND (?3 IS NULL OR record_date >= ?3)
               AND (?4 IS NULL OR record_date <= ?4)
             ORDER BY id
             LIMIT ?5",
            OBSERVATION_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![
                self.after_id,
                self.filter.location,
                self.filter.start_date,
                self.filter.end_date,
                self.page_size as i64,
            ],
            map_observation_row,
        )?;

        let mut fetched = 0;
        for row in rows {
            let row = row?;
            self.after_id = row.id;
            self.buffer.push_back(row);
            fetched += 1;
        }

        if fetched < self.page_size {
            self.exhausted = true;
        }

        Ok(())
    }
}

impl Iterator for ObservationRows {
    type Item = Result<StoredObservation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }

        self.buffer.pop_front().map(Ok)
    }
}

#[derive(Clone)]
pub struct AggregateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AggregateStore for AggregateRepository {
    fn upsert_if_absent(&self, stat: &AggregatedStat) -> Result<Upserted<StoredAggregate>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let changes = tx.execute(
            "INSERT OR IGNORE INTO weather_aggregated_data (
                location, year, avg_max_temp, avg_min_temp, sum_precipitation_amount, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                stat.location,
                stat.year,
                stat.avg_max_temp,
                stat.avg_min_temp,
                stat.sum_precipitation_amount,
                Utc::now(),
            ],
        )?;

        let record = tx.query_row(
            &format!(
                "SELECT {} FROM weather_aggregated_data WHERE location = ?1 AND year = ?2",
                AGGREGATE_COLUMNS
            ),
            params![stat.location, stat.year],
            map_aggregate_row,
        )?;

        tx.commit()?;

        Ok(Upserted {
            record,
            created: changes > 0,
        })
    }

    fn get(&self, location: &str, year: i32) -> Result<Option<StoredAggregate>> {
        let conn = lock(&self.conn)?;
        let stat = conn
            .query_row(
                &format!(
                    "SELECT {} FROM weather_aggregated_data WHERE location = ?1 AND year = ?2",
                    AGGREGATE_COLUMNS
                ),
                params![location, year],
                map_aggregate_row,
            )
            .optional()?;

        Ok(stat)
    }
}
