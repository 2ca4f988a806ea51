use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::SENTINEL_VALUE;

/// One day's reading for one location, as parsed from an upload line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Observation {
    #[validate(length(min = 1, max = 50))]
    pub location: String,

    pub record_date: NaiveDate,

    pub max_temp: i16,

    pub min_temp: i16,

    pub precipitation_amount: i16,
}

impl Observation {
    pub fn new(
        location: String,
        record_date: NaiveDate,
        max_temp: i16,
        min_temp: i16,
        precipitation_amount: i16,
    ) -> Self {
        Self {
            location,
            record_date,
            max_temp,
            min_temp,
            precipitation_amount,
        }
    }

    pub fn year(&self) -> i32 {
        self.record_date.year()
    }

    /// A sentinel on either temperature disqualifies the whole row from
    /// aggregation. Precipitation is never checked.
    pub fn has_sentinel_temperature(&self) -> bool {
        self.max_temp == SENTINEL_VALUE || self.min_temp == SENTINEL_VALUE
    }
}

/// An observation as persisted, with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObservation {
    pub id: i64,

    #[serde(flatten)]
    pub observation: Observation,

    pub created_at: DateTime<Utc>,
}
