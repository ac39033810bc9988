//! Report files on disk.
//!
//! Reports are UTF-8 CSV with a byte-order mark and the columns
//! `Picture Name`, `Last_Update_Date`, `Diff_Result`. One file exists per
//! category and weekday, e.g. `CompositeView_Diff_Mon.csv`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use tracing::{debug, warn};

use super::{format_report_date, parse_report_date, DiffResult, HistoryRecord, HistoryReport};
use crate::category::Category;
use crate::constants::{COLUMN_DATE, COLUMN_NAME, COLUMN_RESULT, LEGACY_COLUMN_NAME};
use crate::error::{Error, Result};

/// UTF-8 byte-order mark written at the start of every report.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Weekdays in the order report files are searched.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Three-letter weekday tag used in report file names.
pub fn weekday_tag(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Returns the report file name of a category for a weekday.
pub fn report_file_name(category: Category, day: Weekday) -> String {
    format!("{}_{}.csv", category.report_base(), weekday_tag(day))
}

/// Returns the report path of a category for a weekday.
pub fn report_path(folder: &Path, category: Category, day: Weekday) -> PathBuf {
    folder.join(report_file_name(category, day))
}

/// Reads a report file.
///
/// Header names are trimmed and `PIC_Name` is accepted for `Picture Name`.
/// Unreadable dates and blank or unknown classifications load as `None`, so
/// the row still carries its date. Rows without a name are skipped.
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<HistoryReport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |names: &[&str]| headers.iter().position(|h| names.contains(&h));
    let name_col = column(&[COLUMN_NAME, LEGACY_COLUMN_NAME]).ok_or_else(|| Error::ReportLoad {
        path: path.to_path_buf(),
        reason: format!("missing column {:?}", COLUMN_NAME),
    })?;
    let date_col = column(&[COLUMN_DATE]);
    let result_col = column(&[COLUMN_RESULT]);

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let entity_name = row.get(name_col).unwrap_or_default().trim();
        if entity_name.is_empty() {
            continue;
        }

        let diff_result = result_col
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match raw.parse::<DiffResult>() {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("{} row {}: {:?}: {}", path.display(), line + 2, entity_name, e);
                    None
                }
            });

        let last_update_date = date_col
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match parse_report_date(raw) {
                Ok(date) => Some(date),
                Err(e) => {
                    debug!("{} row {}: {}", path.display(), line + 2, e);
                    None
                }
            });

        records.push(HistoryRecord {
            entity_name: entity_name.to_string(),
            last_update_date,
            diff_result,
        });
    }

    Ok(HistoryReport::new(records))
}

/// Writes a report file, replacing any existing one.
pub fn write_report<P: AsRef<Path>>(path: P, report: &HistoryReport) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    writer.write_record([COLUMN_NAME, COLUMN_DATE, COLUMN_RESULT])?;
    for record in report.records() {
        let date = record
            .last_update_date
            .map(format_report_date)
            .unwrap_or_default();
        writer.write_record([
            record.entity_name.as_str(),
            date.as_str(),
            record.diff_result.as_ref().map(DiffResult::as_str).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Picks the report whose latest recorded date is most recent.
///
/// Candidates that cannot be read or hold no dates are skipped. On a tie the
/// earlier candidate is kept.
pub fn select_latest_report(candidates: &[PathBuf]) -> Option<PathBuf> {
    let mut latest: Option<(NaiveDate, &PathBuf)> = None;
    for path in candidates {
        let max_date = match read_report(path) {
            Ok(report) => report.max_date(),
            Err(e) => {
                warn!("Cannot read report {}: {}", path.display(), e);
                continue;
            }
        };
        let Some(max_date) = max_date else {
            debug!("Report {} has no dates", path.display());
            continue;
        };
        if latest.is_none_or(|(best, _)| max_date > best) {
            latest = Some((max_date, path));
        }
    }
    latest.map(|(_, path)| path.clone())
}

/// Returns the existing weekday reports of a category, Monday first.
pub fn existing_reports(folder: &Path, category: Category) -> Vec<PathBuf> {
    WEEKDAYS
        .iter()
        .map(|day| report_path(folder, category, *day))
        .filter(|path| path.is_file())
        .collect()
}

/// Finds the freshest weekday report of a category in `folder`.
pub fn find_latest_report(folder: &Path, category: Category) -> Option<PathBuf> {
    select_latest_report(&existing_reports(folder, category))
}

/// Loads the freshest prior report of a category.
///
/// A report that cannot be loaded counts as no prior report.
pub fn load_prior_report(folder: &Path, category: Category) -> Option<(PathBuf, HistoryReport)> {
    let path = find_latest_report(folder, category)?;
    match read_report(&path) {
        Ok(report) => Some((path, report)),
        Err(e) => {
            let e = Error::ReportLoad {
                path: path.clone(),
                reason: e.to_string(),
            };
            warn!("{}; starting a new report", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_report_file_names() {
        assert_eq!(
            report_file_name(Category::Composite, Weekday::Mon),
            "CompositeView_Diff_Mon.csv"
        );
        assert_eq!(
            report_file_name(Category::Substation, Weekday::Sun),
            "Substation_Diff_Sun.csv"
        );
    }

    #[test]
    fn test_write_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.csv");
        let report = HistoryReport::new(vec![
            HistoryRecord::new("PIC, B", date(2024, 1, 2), DiffResult::Updated),
            HistoryRecord::new("PIC_A", date(2023, 12, 31), DiffResult::Nil),
        ]);
        write_report(&path, &report).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(
            String::from_utf8(bytes[3..].to_vec()).unwrap(),
            concat!(
                "Picture Name,Last_Update_Date,Diff_Result\n",
                "\"PIC, B\",2024-01-02,UPDATED\n",
                "PIC_A,2023-12-31,NIL\n"
            )
        );
        assert_eq!(read_report(&path).unwrap(), report);
    }

    #[test]
    fn test_read_legacy_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(
            &path,
            concat!(
                " PIC_Name , Last_Update_Date ,Diff_Result\n",
                "Z,05/02/2024,NIL\n",
                "A,2024-02-01,DELETED\n",
                "B,not a date,NEW\n",
                "C,,UPDATED\n",
                ",2024-01-01,NIL\n",
                "D,2024-01-01,CHANGED\n",
                "E,2024-01-03,\n",
                "F,2024-01-04\n"
            ),
        )
        .unwrap();

        let report = read_report(&path).unwrap();
        let rows: Vec<(&str, Option<NaiveDate>)> = report
            .records()
            .iter()
            .map(|r| (r.entity_name.as_str(), r.last_update_date))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("A", Some(date(2024, 2, 1))),
                ("B", None),
                ("C", None),
                ("D", Some(date(2024, 1, 1))),
                ("E", Some(date(2024, 1, 3))),
                ("F", Some(date(2024, 1, 4))),
                ("Z", Some(date(2024, 2, 5))),
            ]
        );
        assert_eq!(report.get("A").unwrap().diff_result, Some(DiffResult::Deleted));
        for name in ["D", "E", "F"] {
            assert_eq!(report.get(name).unwrap().diff_result, None);
        }
        assert_eq!(report.max_date(), Some(date(2024, 2, 5)));
    }

    #[test]
    fn test_read_without_result_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates_only.csv");
        fs::write(&path, "Picture Name,Last_Update_Date\nX,2023-06-01\n").unwrap();

        let report = read_report(&path).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.carried_dates()["X"], Some(date(2023, 6, 1)));
        assert_eq!(select_latest_report(&[path.clone()]), Some(path));
    }

    #[test]
    fn test_read_without_name_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Name,Date\nA,2024-01-01\n").unwrap();
        assert!(matches!(read_report(&path), Err(Error::ReportLoad { .. })));
    }

    #[test]
    fn test_select_by_embedded_date_not_weekday() {
        let dir = tempfile::tempdir().unwrap();
        let write = |day: Weekday, body: &str| {
            let path = report_path(dir.path(), Category::Composite, day);
            fs::write(&path, body).unwrap();
            path
        };
        write(
            Weekday::Mon,
            "Picture Name,Last_Update_Date,Diff_Result\nA,2024-03-01,NIL\n",
        );
        let wed = write(
            Weekday::Wed,
            "Picture Name,Last_Update_Date,Diff_Result\nA,2024-01-01,NIL\nB,10/03/2024,NEW\n",
        );
        write(Weekday::Fri, "Picture Name,Diff_Result\nA,NIL\n");
        write(Weekday::Sat, "garbage without columns\n");
        // A different category never competes
        fs::write(
            report_path(dir.path(), Category::Substation, Weekday::Tue),
            "Picture Name,Last_Update_Date,Diff_Result\nA,2025-01-01,NIL\n",
        )
        .unwrap();

        assert_eq!(existing_reports(dir.path(), Category::Composite).len(), 4);
        assert_eq!(find_latest_report(dir.path(), Category::Composite), Some(wed));
    }

    #[test]
    fn test_select_tie_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        let body = "Picture Name,Last_Update_Date,Diff_Result\nA,2024-03-01,NIL\n";
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        fs::write(&first, body).unwrap();
        fs::write(&second, body).unwrap();

        assert_eq!(
            select_latest_report(&[first.clone(), second]),
            Some(first)
        );
        assert_eq!(select_latest_report(&[]), None);
    }

    #[test]
    fn test_load_prior_report_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_prior_report(&dir.path().join("absent"), Category::Composite).is_none());
    }
}
