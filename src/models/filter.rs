use chrono::NaiveDate;
use validator::Validate;

use crate::error::{Result, WeatherError};
use crate::utils::constants::ISO_DATE_FORMAT;

/// Optional constraints on a query over stored observations. All supplied
/// constraints must hold; date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ObservationFilter {
    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 50))]
    pub location: Option<String>,
}

impl ObservationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from raw request parameters. Blank values count as absent.
    pub fn from_params(
        start_date: Option<&str>,
        end_date: Option<&str>,
        location: Option<&str>,
    ) -> Result<Self> {
        let filter = Self {
            start_date: parse_date_param("start_date", start_date)?,
            end_date: parse_date_param("end_date", end_date)?,
            location: non_blank(location).map(str::to_string),
        };

        filter.validate()?;
        Ok(filter)
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date_param(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                WeatherError::Validation(format!(
                    "{}: '{}' is not a date in YYYY-MM-DD format",
                    name, raw
                ))
            }),
    }
}
