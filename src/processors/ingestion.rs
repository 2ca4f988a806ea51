use crate::error::{Result, WeatherError};
use crate::readers::RecordParser;
use crate::store::ObservationStore;
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, UPLOAD_SUCCESS_MESSAGE};
use crate::utils::progress::ProgressReporter;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// What one upload did to the observation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub location: String,
    pub records: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub elapsed_ms: u64,
}

/// Body returned to the uploader once every line has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

impl UploadResponse {
    pub fn created() -> Self {
        Self {
            success: true,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Reads an uploaded file line by line into the observation store.
///
/// Each line is written as soon as it parses. The first malformed line aborts
/// the upload, and everything before it stays stored.
pub struct IngestionOrchestrator<S> {
    store: S,
}

impl<S: ObservationStore> IngestionOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ingest a file from disk; the location comes from its file name.
    pub fn ingest_file(
        &self,
        path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<IngestReport> {
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| {
                WeatherError::InvalidFileName(format!("'{}' has no file name", path.display()))
            })?;

        // Reject the name before touching the file
        let parser = RecordParser::for_filename(filename)?;

        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.ingest_with_parser(&parser, reader, progress)
    }

    /// Ingest an upload already in memory or behind any buffered reader.
    pub fn ingest<R: BufRead>(
        &self,
        filename: &str,
        reader: R,
        progress: Option<&ProgressReporter>,
    ) -> Result<IngestReport> {
        let parser = RecordParser::for_filename(filename)?;
        self.ingest_with_parser(&parser, reader, progress)
    }

    fn ingest_with_parser<R: BufRead>(
        &self,
        parser: &RecordParser,
        reader: R,
        progress: Option<&ProgressReporter>,
    ) -> Result<IngestReport> {
        let start = Instant::now();
        let mut report = IngestReport {
            location: parser.location().to_string(),
            records: 0,
            inserted: 0,
            duplicates: 0,
            elapsed_ms: 0,
        };

        if let Some(p) = progress {
            p.set_message(&format!("Uploading records for {}...", parser.location()));
        }

        for (index, chunk) in reader.split(b'\n').enumerate() {
            let line_number = index + 1;
            let bytes = chunk?;
            let line = std::str::from_utf8(&bytes)
                .map_err(|_| WeatherError::malformed(line_number, "line is not valid UTF-8"))?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let observation = match parser.parse_line(line_number, line) {
                Ok(observation) => observation,
                Err(e) => {
                    warn!(
                        location = parser.location(),
                        stored = report.records,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "aborting upload: {}",
                        e
                    );
                    return Err(e);
                }
            };

            let upserted = self.store.upsert_if_absent(&observation)?;
            report.records += 1;
            if upserted.created {
                report.inserted += 1;
            } else {
                report.duplicates += 1;
            }

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            location = %report.location,
            records = report.records,
            inserted = report.inserted,
            duplicates = report.duplicates,
            elapsed_ms = report.elapsed_ms,
            "ingested upload"
        );

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Stored {} records for {} ({} new)",
                report.records, report.location, report.inserted
            ));
        }

        Ok(report)
    }
}
