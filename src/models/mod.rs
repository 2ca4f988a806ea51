pub mod aggregate;
pub mod filter;
pub mod observation;

pub use aggregate::{AggregatedStat, StoredAggregate};
pub use filter::ObservationFilter;
pub use observation::{Observation, StoredObservation};
