//! Durable storage for observations and yearly aggregates.
//!
//! Each store is the single authority on its natural key: inserting a row
//! whose key already exists is a silent no-op that hands back the row already
//! stored. Callers never see a uniqueness error.

pub mod sqlite;

pub use sqlite::{AggregateRepository, Database, ObservationRepository, ObservationRows};

use crate::error::Result;
use crate::models::{AggregatedStat, Observation, ObservationFilter, StoredAggregate, StoredObservation};

/// Outcome of an insert-if-absent: the row now stored under the key, and
/// whether this call created it.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<T> {
    pub record: T,
    pub created: bool,
}

pub trait ObservationStore {
    type Rows: Iterator<Item = Result<StoredObservation>>;

    /// Insert unless (location, record_date) already exists; first write wins.
    fn upsert_if_absent(&self, observation: &Observation) -> Result<Upserted<StoredObservation>>;

    /// Lazily stream matching observations in a stable order. Calling again
    /// restarts from the beginning.
    fn query(&self, filter: &ObservationFilter) -> Result<Self::Rows>;
}

pub trait AggregateStore {
    /// Insert unless (location, year) already exists. An existing aggregate is
    /// never refreshed, even if it no longer matches the observations.
    fn upsert_if_absent(&self, stat: &AggregatedStat) -> Result<Upserted<StoredAggregate>>;

    fn get(&self, location: &str, year: i32) -> Result<Option<StoredAggregate>>;
}
