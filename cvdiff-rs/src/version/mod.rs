//! Discovery and ordering of dated snapshot folders.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::warn;
use walkdir::WalkDir;

use crate::category::Category;
use crate::constants::{FOLDER_DATE_FORMAT, REPORT_DATE_FORMAT};
use crate::error::{Error, Result};

/// A backup snapshot directory named `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateFolder {
    date: NaiveDate,
    path: PathBuf,
}

impl DateFolder {
    /// Creates a date folder at `path` for `date`.
    pub fn new(date: NaiveDate, path: impl Into<PathBuf>) -> Self {
        DateFolder {
            date,
            path: path.into(),
        }
    }

    /// Returns the snapshot date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the folder path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the folder name, `YYYYMMDD`.
    pub fn name(&self) -> String {
        folder_name(self.date)
    }

    /// Returns the date in report form, `YYYY-MM-DD`.
    pub fn display_date(&self) -> String {
        self.date.format(REPORT_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Returns the folder name for a snapshot date.
pub fn folder_name(date: NaiveDate) -> String {
    date.format(FOLDER_DATE_FORMAT).to_string()
}

/// Parses a folder name that is exactly eight digits forming a valid date.
pub fn parse_folder_date(name: &str) -> Option<NaiveDate> {
    if name.len() != 8 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = name[0..4].parse().ok()?;
    let month = name[4..6].parse().ok()?;
    let day = name[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Lists the date folders under `base`, oldest first.
///
/// A missing base directory yields an empty list.
pub fn list_versions<P: AsRef<Path>>(base: P) -> Vec<DateFolder> {
    let base = base.as_ref();
    if !base.is_dir() {
        return Vec::new();
    }

    let mut folders: Vec<DateFolder> = WalkDir::new(base)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Cannot list entry in {}: {}", base.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            let date = parse_folder_date(entry.file_name().to_str()?)?;
            Some(DateFolder::new(date, entry.path()))
        })
        .collect();

    folders.sort_by_key(DateFolder::date);
    folders
}

/// Returns the two latest date folders as `(old, new)`.
pub fn resolve_comparison<P: AsRef<Path>>(base: P) -> Result<(DateFolder, DateFolder)> {
    let mut folders = list_versions(base);
    let found = folders.len();
    match (folders.pop(), folders.pop()) {
        (Some(new), Some(old)) => Ok((old, new)),
        _ => Err(Error::InsufficientVersions { found }),
    }
}

/// Returns the category folder inside a date folder, if it exists.
pub fn locate_category_folder(folder: &DateFolder, category: Category) -> Option<PathBuf> {
    let path = folder.path().join(category.subfolder());
    path.is_dir().then_some(path)
}
