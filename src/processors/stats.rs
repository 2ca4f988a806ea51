use crate::error::Result;
use crate::models::{AggregatedStat, ObservationFilter};
use crate::processors::aggregator::AggregateComputer;
use crate::store::{AggregateStore, ObservationStore};
use serde::Serialize;
use tracing::{debug, info};

/// Stats computed by one request. `results` reflects this call's computation,
/// which may differ from an aggregate cached earlier under the same key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    pub results: Vec<AggregatedStat>,

    #[serde(skip)]
    pub newly_persisted: usize,
}

pub struct StatsOrchestrator<O, A> {
    observations: O,
    aggregates: A,
    computer: AggregateComputer,
}

impl<O, A> StatsOrchestrator<O, A>
where
    O: ObservationStore,
    A: AggregateStore,
{
    pub fn new(observations: O, aggregates: A) -> Self {
        Self {
            observations,
            aggregates,
            computer: AggregateComputer::new(),
        }
    }

    pub fn aggregates(&self) -> &A {
        &self.aggregates
    }

    /// Filter, aggregate per (location, year), then cache each aggregate.
    /// Aggregates already cached are left untouched.
    pub fn compute_stats(&self, filter: &ObservationFilter) -> Result<StatsResponse> {
        let rows = self.observations.query(filter)?;
        let results = self.computer.compute_rows(rows)?;

        let mut newly_persisted = 0;
        for stat in &results {
            let upserted = self.aggregates.upsert_if_absent(stat)?;
            if upserted.created {
                newly_persisted += 1;
            } else {
                debug!(
                    location = %stat.location,
                    year = stat.year,
                    "aggregate already cached, keeping stored value"
                );
            }
        }

        info!(
            groups = results.len(),
            newly_persisted,
            "computed weather stats"
        );

        Ok(StatsResponse {
            results,
            newly_persisted,
        })
    }
}
