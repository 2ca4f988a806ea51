use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Yearly summary for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStat {
    pub location: String,
    pub year: i32,
    pub avg_max_temp: f64,
    pub avg_min_temp: f64,
    pub sum_precipitation_amount: f64,
}

impl AggregatedStat {
    pub fn new(
        location: String,
        year: i32,
        avg_max_temp: f64,
        avg_min_temp: f64,
        sum_precipitation_amount: f64,
    ) -> Self {
        Self {
            location,
            year,
            avg_max_temp,
            avg_min_temp,
            sum_precipitation_amount,
        }
    }

    pub fn key(&self) -> (&str, i32) {
        (&self.location, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAggregate {
    pub id: i64,

    #[serde(flatten)]
    pub stat: AggregatedStat,

    pub created_at: DateTime<Utc>,
}
