//! Derivation of a new history report from two snapshot indexes.

use chrono::NaiveDate;
use tracing::debug;

use super::{DiffResult, DiffStats, HistoryRecord, HistoryReport};
use crate::constants::PROGRESS_INTERVAL;
use crate::normalize::{Comparator, Comparison};
use crate::snapshot::SnapshotIndex;

/// A merged report with the counts of each classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub report: HistoryReport,
    pub stats: DiffStats,
}

/// Classifies every entity of the two snapshots and dates it.
///
/// Entities present on both sides are compared with `comparator`. Unchanged
/// and deleted entities keep the date carried by `old_report` when it has one,
/// else `old_date`. New and updated entities take `new_date`. An entity listed
/// in the old report but missing from `old_index` counts as new.
pub fn merge<C: Comparator + ?Sized>(
    old_report: Option<&HistoryReport>,
    old_index: &SnapshotIndex,
    new_index: &SnapshotIndex,
    old_date: NaiveDate,
    new_date: NaiveDate,
    comparator: &C,
) -> MergeOutcome {
    let carried = old_report.map(HistoryReport::carried_dates).unwrap_or_default();
    let carried_or_old = |name: &str| carried.get(name).copied().flatten().unwrap_or(old_date);

    let mut stats = DiffStats::default();
    let mut records = Vec::with_capacity(new_index.len() + old_index.len());
    let mut compared = 0usize;

    for entry in new_index {
        let name = entry.entity_name();
        let (diff_result, date) = match old_index.get(name) {
            Some(old_entry) => {
                compared += 1;
                if compared % PROGRESS_INTERVAL == 0 {
                    debug!("Compared {} of {} entities", compared, new_index.len());
                }
                match comparator.compare(old_entry.source_path(), entry.source_path()) {
                    Comparison::Same => (DiffResult::Nil, carried_or_old(name)),
                    Comparison::Different => (DiffResult::Updated, new_date),
                }
            }
            None => (DiffResult::New, new_date),
        };
        stats.record(diff_result);
        records.push(HistoryRecord::new(name, date, diff_result));
    }

    for entry in old_index.iter().filter(|e| !new_index.contains(e.entity_name())) {
        let name = entry.entity_name();
        stats.record(DiffResult::Deleted);
        records.push(HistoryRecord::new(name, carried_or_old(name), DiffResult::Deleted));
    }

    MergeOutcome {
        report: HistoryReport::new(records),
        stats,
    }
}
