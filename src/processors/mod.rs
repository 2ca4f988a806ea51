pub mod aggregator;
pub mod ingestion;
pub mod stats;

pub use aggregator::{AggregateAccumulator, AggregateComputer};
pub use ingestion::{IngestReport, IngestionOrchestrator, UploadResponse};
pub use stats::{StatsOrchestrator, StatsResponse};
