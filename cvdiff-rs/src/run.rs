//! End-to-end report generation for each category.

use std::fs;
use std::path::PathBuf;

use chrono::Weekday;
use tracing::{error, info};

use crate::category::{Category, ReportSelector};
use crate::constants::DEFAULT_REPORT_FOLDER;
use crate::error::{Error, Result};
use crate::normalize::{Comparator, Normalizer};
use crate::report::store::{load_prior_report, report_path, write_report};
use crate::report::{merge, DiffStats, HistoryReport};
use crate::snapshot::index_folder;
use crate::version::{locate_category_folder, resolve_comparison, DateFolder};

/// Settings of one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory holding the `YYYYMMDD` snapshot folders.
    pub backup_root: PathBuf,
    /// Report folder; `<backup_root>/DiffReport` when unset.
    pub output_folder: Option<PathBuf>,
    pub selector: ReportSelector,
}

impl RunConfig {
    /// Creates a configuration covering both categories.
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        RunConfig {
            backup_root: backup_root.into(),
            output_folder: None,
            selector: ReportSelector::default(),
        }
    }

    /// Sets the report folder.
    pub fn with_output(mut self, output_folder: impl Into<PathBuf>) -> Self {
        self.output_folder = Some(output_folder.into());
        self
    }

    /// Sets which categories to run.
    pub fn with_selector(mut self, selector: ReportSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Returns the effective report folder.
    pub fn output_folder(&self) -> PathBuf {
        self.output_folder
            .clone()
            .unwrap_or_else(|| self.backup_root.join(DEFAULT_REPORT_FOLDER))
    }
}

/// Result of a successful category run.
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: Category,
    pub old: DateFolder,
    pub new: DateFolder,
    /// The report the carried dates came from, if one was found.
    pub prior_report: Option<PathBuf>,
    pub report_path: PathBuf,
    pub report: HistoryReport,
    pub stats: DiffStats,
}

/// Generates the history reports selected by a [`RunConfig`].
pub struct ReportRunner<C: Comparator = Normalizer> {
    config: RunConfig,
    comparator: C,
}

impl ReportRunner {
    /// Creates a runner comparing files with the default normalizer.
    pub fn new(config: RunConfig) -> Self {
        Self::with_comparator(config, Normalizer::new())
    }
}

impl<C: Comparator> ReportRunner<C> {
    /// Creates a runner with a custom file comparator.
    pub fn with_comparator(config: RunConfig, comparator: C) -> Self {
        ReportRunner { config, comparator }
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs every selected category.
    ///
    /// A failing category is logged and does not stop the others.
    pub fn run(&self, today: Weekday) -> Vec<(Category, Result<CategoryOutcome>)> {
        self.config
            .selector
            .categories()
            .iter()
            .map(|&category| {
                let result = self.run_category(category, today);
                if let Err(e) = &result {
                    error!("{} report failed: {}", category, e);
                }
                (category, result)
            })
            .collect()
    }

    /// Compares the two latest snapshots of one category and writes its
    /// report for `today`.
    pub fn run_category(&self, category: Category, today: Weekday) -> Result<CategoryOutcome> {
        let backup_root = &self.config.backup_root;
        if !backup_root.is_dir() {
            return Err(Error::MissingFolder {
                path: backup_root.clone(),
            });
        }

        let (old, new) = resolve_comparison(backup_root)?;
        info!("{}: comparing {} -> {}", category, old, new);
        let old_folder = category_folder(&old, category)?;
        let new_folder = category_folder(&new, category)?;

        let output_folder = self.config.output_folder();
        let prior = load_prior_report(&output_folder, category);
        match &prior {
            Some((path, report)) => info!(
                "{}: using prior report {} ({} rows)",
                category,
                path.display(),
                report.len()
            ),
            None => info!("{}: no prior report", category),
        }

        let old_index = index_folder(&old_folder);
        let new_index = index_folder(&new_folder);
        info!(
            "{}: {} entities in {}, {} in {}",
            category,
            old_index.len(),
            old,
            new_index.len(),
            new
        );

        let outcome = merge(
            prior.as_ref().map(|(_, report)| report),
            &old_index,
            &new_index,
            old.date(),
            new.date(),
            &self.comparator,
        );

        fs::create_dir_all(&output_folder)?;
        let path = report_path(&output_folder, category, today);
        write_report(&path, &outcome.report)?;
        info!("{}: wrote {} ({})", category, path.display(), outcome.stats);

        Ok(CategoryOutcome {
            category,
            old,
            new,
            prior_report: prior.map(|(path, _)| path),
            report_path: path,
            report: outcome.report,
            stats: outcome.stats,
        })
    }
}

fn category_folder(folder: &DateFolder, category: Category) -> Result<PathBuf> {
    locate_category_folder(folder, category).ok_or_else(|| Error::MissingFolder {
        path: folder.path().join(category.subfolder()),
    })
}

/// Runs a configuration with the default normalizer.
pub fn run_reports(config: RunConfig, today: Weekday) -> Vec<(Category, Result<CategoryOutcome>)> {
    ReportRunner::new(config).run(today)
}
