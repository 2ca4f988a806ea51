use crate::error::{Result, WeatherError};
use crate::models::Observation;
use crate::utils::constants::{
    FIELD_COUNT, FIELD_SEPARATOR, MAX_LOCATION_LENGTH, RECORD_DATE_FORMAT,
};
use chrono::NaiveDate;
use std::path::Path;

/// Derive the location identifier from an upload's file name
/// (e.g., tokyo.txt -> tokyo). The name must contain exactly one '.'.
pub fn location_from_filename(name: &str) -> Result<String> {
    // Accept a full path but only look at its last component
    let filename = Path::new(name)
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| WeatherError::InvalidFileName(format!("'{}' has no file name", name)))?;

    let dots = filename.matches('.').count();
    if dots != 1 {
        return Err(WeatherError::InvalidFileName(format!(
            "'{}' must contain exactly one '.', found {}",
            filename, dots
        )));
    }

    let (stem, _extension) = filename
        .split_once('.')
        .ok_or_else(|| WeatherError::InvalidFileName(filename.to_string()))?;

    if stem.is_empty() {
        return Err(WeatherError::InvalidFileName(format!(
            "'{}' has an empty location",
            filename
        )));
    }

    if stem.chars().count() > MAX_LOCATION_LENGTH {
        return Err(WeatherError::InvalidFileName(format!(
            "location '{}' is longer than {} characters",
            stem, MAX_LOCATION_LENGTH
        )));
    }

    Ok(stem.to_string())
}

/// Turns tab-separated lines into observations for a single location.
#[derive(Debug, Clone)]
pub struct RecordParser {
    location: String,
}

impl RecordParser {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Parser for an uploaded file, with the location taken from its name
    pub fn for_filename(name: &str) -> Result<Self> {
        Ok(Self::new(location_from_filename(name)?))
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Parse one line. `line_number` is 1-based and only used for error reporting.
    pub fn parse_line(&self, line_number: usize, line: &str) -> Result<Observation> {
        // Expected format: DATE \t MAX_TEMP \t MIN_TEMP \t PRECIPITATION
        let parts: Vec<&str> = line.split(FIELD_SEPARATOR).map(|s| s.trim()).collect();

        if parts.len() < FIELD_COUNT {
            return Err(WeatherError::malformed(
                line_number,
                format!(
                    "expected {} tab-separated fields, found {}",
                    FIELD_COUNT,
                    parts.len()
                ),
            ));
        }

        let record_date = parse_record_date(line_number, parts[0])?;
        let max_temp = parse_integer(line_number, "max_temp", parts[1])?;
        let min_temp = parse_integer(line_number, "min_temp", parts[2])?;
        let precipitation_amount = parse_integer(line_number, "precipitation_amount", parts[3])?;

        Ok(Observation::new(
            self.location.clone(),
            record_date,
            max_temp,
            min_temp,
            precipitation_amount,
        ))
    }
}

/// Parse a YYYYMMDD date. chrono alone would accept signs and short years,
/// so the shape is checked first.
fn parse_record_date(line_number: usize, value: &str) -> Result<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WeatherError::malformed(
            line_number,
            format!("date '{}' does not match YYYYMMDD", value),
        ));
    }

    NaiveDate::parse_from_str(value, RECORD_DATE_FORMAT).map_err(|_| {
        WeatherError::malformed(line_number, format!("'{}' is not a calendar date", value))
    })
}

fn parse_integer(line_number: usize, field: &str, value: &str) -> Result<i16> {
    value.parse::<i16>().map_err(|_| {
        WeatherError::malformed(
            line_number,
            format!("{} '{}' is not a small integer", field, value),
        )
    })
}
