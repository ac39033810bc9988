//! cvdiff - Semantic diff reports for XML backup snapshots
//!
//! This library compares the two latest dated backups of display and
//! substation configuration files and keeps a rolling history report of what
//! changed.
//!
//! # Overview
//!
//! A backup root holds one folder per snapshot, named `YYYYMMDD`, each with a
//! `Composite` and a `Substation` folder of XML files. Every file describes
//! one entity, named by its `Header/Name` element.
//!
//! Two files are compared on a canonical form: GUID values are masked, `Id`
//! and `Link` subtrees are dropped and the serialized document has its
//! whitespace runs collapsed. Each entity is then classified as `NEW`, `DELETED`, `UPDATED`
//! or `NIL` and dated; unchanged entities carry forward the date recorded in
//! the previous report, so a report shows when each entity last changed.
//!
//! # Example
//!
//! ```no_run
//! use chrono::Weekday;
//! use cvdiff::{run_reports, RunConfig};
//!
//! let config = RunConfig::new("/data/backup");
//! for (category, result) in run_reports(config, Weekday::Mon) {
//!     match result {
//!         Ok(outcome) => println!("{}: {}", category, outcome.stats),
//!         Err(e) => eprintln!("{}: {}", category, e),
//!     }
//! }
//! ```

pub mod category;
pub mod constants;
pub mod error;
pub mod node;
pub mod normalize;
pub mod report;
pub mod run;
pub mod snapshot;
pub mod version;
pub mod xml;

// Re-export commonly used types
pub use category::{Category, ReportSelector};
pub use constants::*;
pub use error::{Error, Result};
pub use node::{NodeInner, NodeRef, XmlContent, XmlElement, XmlText};
pub use normalize::{Comparator, Comparison, IgnoredTags, Normalizer, TagPredicate, TreeFilter};
pub use report::{merge, DiffResult, DiffStats, HistoryRecord, HistoryReport, MergeOutcome};
pub use run::{run_reports, CategoryOutcome, ReportRunner, RunConfig};
pub use snapshot::{index_folder, SnapshotEntry, SnapshotIndex};
pub use version::{list_versions, resolve_comparison, DateFolder};
pub use xml::{parse_file, parse_str, XmlParser, XmlPrinter};
