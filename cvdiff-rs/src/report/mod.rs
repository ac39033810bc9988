//! Rolling history reports.
//!
//! A report lists every entity of the latest snapshot pair with the date it
//! last changed and how it compares between the two snapshots. Reports are
//! stored per category and weekday; see [`store`] for the file format and
//! [`merge`](merge()) for how a new report is derived from the previous one.

mod date;
mod merge;
pub mod store;

pub use date::{format_report_date, parse_report_date};
pub use merge::{merge, MergeOutcome};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::Error;

/// Classification of an entity between the old and new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffResult {
    /// Only in the new snapshot.
    New,
    /// Only in the old snapshot.
    Deleted,
    /// In both, with semantic differences.
    Updated,
    /// In both and semantically identical.
    Nil,
}

impl DiffResult {
    /// Returns the report spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffResult::New => "NEW",
            DiffResult::Deleted => "DELETED",
            DiffResult::Updated => "UPDATED",
            DiffResult::Nil => "NIL",
        }
    }
}

impl fmt::Display for DiffResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NEW" => Ok(DiffResult::New),
            "DELETED" => Ok(DiffResult::Deleted),
            "UPDATED" => Ok(DiffResult::Updated),
            "NIL" => Ok(DiffResult::Nil),
            other => Err(Error::InvalidDiffResult(other.to_string())),
        }
    }
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub entity_name: String,
    /// `None` only for rows loaded from a report whose date was unreadable.
    pub last_update_date: Option<NaiveDate>,
    /// `None` only for rows loaded with a blank or unknown classification.
    pub diff_result: Option<DiffResult>,
}

impl HistoryRecord {
    /// Creates a record with a known date.
    pub fn new(entity_name: impl Into<String>, date: NaiveDate, diff_result: DiffResult) -> Self {
        HistoryRecord {
            entity_name: entity_name.into(),
            last_update_date: Some(date),
            diff_result: Some(diff_result),
        }
    }
}

/// Records sorted by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryReport {
    records: Vec<HistoryRecord>,
}

impl HistoryReport {
    /// Creates a report, sorting records by entity name.
    pub fn new(mut records: Vec<HistoryRecord>) -> Self {
        records.sort_by(|a, b| a.entity_name.cmp(&b.entity_name));
        HistoryReport { records }
    }

    /// Returns the records in name order.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the report has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the first record for an entity.
    pub fn get(&self, entity_name: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.entity_name == entity_name)
    }

    /// Returns the latest date recorded in the report.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.records.iter().filter_map(|r| r.last_update_date).max()
    }

    /// Returns the carried date of each entity; the first row of a name wins.
    pub fn carried_dates(&self) -> HashMap<&str, Option<NaiveDate>> {
        let mut dates = HashMap::with_capacity(self.records.len());
        for record in &self.records {
            dates
                .entry(record.entity_name.as_str())
                .or_insert(record.last_update_date);
        }
        dates
    }
}

/// Per-classification counts of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub new: usize,
    pub deleted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl DiffStats {
    /// Counts one classification.
    pub fn record(&mut self, result: DiffResult) {
        match result {
            DiffResult::New => self.new += 1,
            DiffResult::Deleted => self.deleted += 1,
            DiffResult::Updated => self.updated += 1,
            DiffResult::Nil => self.unchanged += 1,
        }
    }

    /// Returns the number of classified entities.
    pub fn total(&self) -> usize {
        self.new + self.deleted + self.updated + self.unchanged
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total {}, new {}, deleted {}, updated {}, unchanged {}",
            self.total(),
            self.new,
            self.deleted,
            self.updated,
            self.unchanged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_diff_result_spelling() {
        for result in [
            DiffResult::New,
            DiffResult::Deleted,
            DiffResult::Updated,
            DiffResult::Nil,
        ] {
            assert_eq!(result.as_str().parse::<DiffResult>().unwrap(), result);
        }
        assert!(matches!(
            "nil".parse::<DiffResult>(),
            Err(Error::InvalidDiffResult(_))
        ));
    }

    #[test]
    fn test_report_sorted_case_sensitive() {
        let d = date(2024, 1, 1);
        let report = HistoryReport::new(vec![
            HistoryRecord::new("b", d, DiffResult::Nil),
            HistoryRecord::new("B", d, DiffResult::Nil),
            HistoryRecord::new("a", d, DiffResult::Nil),
            HistoryRecord::new("A_2", d, DiffResult::Nil),
        ]);
        let names: Vec<&str> = report.records().iter().map(|r| r.entity_name.as_str()).collect();
        assert_eq!(names, vec!["A_2", "B", "a", "b"]);
    }

    #[test]
    fn test_max_date_ignores_missing() {
        let report = HistoryReport::new(vec![
            HistoryRecord::new("a", date(2024, 3, 1), DiffResult::Nil),
            HistoryRecord {
                entity_name: "b".to_string(),
                last_update_date: None,
                diff_result: Some(DiffResult::Nil),
            },
            HistoryRecord::new("c", date(2024, 2, 1), DiffResult::New),
        ]);
        assert_eq!(report.max_date(), Some(date(2024, 3, 1)));
        assert_eq!(HistoryReport::default().max_date(), None);
    }

    #[test]
    fn test_carried_dates_first_row_wins() {
        let report = HistoryReport::new(vec![
            HistoryRecord::new("x", date(2024, 1, 1), DiffResult::Nil),
            HistoryRecord::new("x", date(2024, 5, 1), DiffResult::Updated),
        ]);
        assert_eq!(report.carried_dates()["x"], Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_stats() {
        let mut stats = DiffStats::default();
        for result in [DiffResult::New, DiffResult::Nil, DiffResult::Nil, DiffResult::Deleted] {
            stats.record(result);
        }
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(
            stats.to_string(),
            "total 4, new 1, deleted 1, updated 0, unchanged 2"
        );
    }
}
