//! Report date parsing and formatting.

use chrono::NaiveDate;

use crate::constants::{LEGACY_DATE_FORMAT, REPORT_DATE_FORMAT};
use crate::error::{Error, Result};

/// Parses a report date written as `DD/MM/YYYY` or `YYYY-MM-DD`.
pub fn parse_report_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, LEGACY_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, REPORT_DATE_FORMAT))
        .map_err(|_| Error::UnparseableDate(raw.to_string()))
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}
