use crate::error::Result;
use crate::models::{AggregatedStat, Observation, StoredObservation};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
struct RunningTotals {
    max_temp_sum: f64,
    min_temp_sum: f64,
    precipitation_sum: f64,
    count: u64,
}

/// Accumulates per-(location, year) totals one observation at a time, so a
/// lazy query can be aggregated without collecting it first.
#[derive(Debug, Default)]
pub struct AggregateAccumulator {
    groups: BTreeMap<(String, i32), RunningTotals>,
    excluded: usize,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation. Rows with a sentinel on either temperature are
    /// dropped whole: their precipitation does not count either.
    pub fn push(&mut self, observation: &Observation) {
        if observation.has_sentinel_temperature() {
            self.excluded += 1;
            return;
        }

        let totals = self
            .groups
            .entry((observation.location.clone(), observation.year()))
            .or_default();

        totals.max_temp_sum += f64::from(observation.max_temp);
        totals.min_temp_sum += f64::from(observation.min_temp);
        // A sentinel precipitation on an otherwise valid row is summed as-is
        totals.precipitation_sum += f64::from(observation.precipitation_amount);
        totals.count += 1;
    }

    /// Number of observations skipped for sentinel temperatures
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// One stat per non-empty group, ordered by location then year
    pub fn finish(self) -> Vec<AggregatedStat> {
        self.groups
            .into_iter()
            .map(|((location, year), totals)| {
                let count = totals.count as f64;
                AggregatedStat::new(
                    location,
                    year,
                    totals.max_temp_sum / count,
                    totals.min_temp_sum / count,
                    totals.precipitation_sum,
                )
            })
            .collect()
    }
}

pub struct AggregateComputer;

impl AggregateComputer {
    pub fn new() -> Self {
        Self
    }

    /// Group observations by location and year and compute the mean
    /// temperatures and total precipitation of each group.
    pub fn compute<'a, I>(&self, observations: I) -> Vec<AggregatedStat>
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let mut accumulator = AggregateAccumulator::new();
        for observation in observations {
            accumulator.push(observation);
        }
        accumulator.finish()
    }

    /// Same as [`compute`](Self::compute) over a fallible row stream, such as
    /// a store query. Stops at the first row error.
    pub fn compute_rows<I>(&self, rows: I) -> Result<Vec<AggregatedStat>>
    where
        I: IntoIterator<Item = Result<StoredObservation>>,
    {
        let mut accumulator = AggregateAccumulator::new();
        for row in rows {
            accumulator.push(&row?.observation);
        }

        debug!(
            excluded = accumulator.excluded(),
            "skipped observations with sentinel temperatures"
        );

        Ok(accumulator.finish())
    }
}

impl Default for AggregateComputer {
    fn default() -> Self {
        Self::new()
    }
}
