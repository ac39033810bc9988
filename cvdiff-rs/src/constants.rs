//! Constants used throughout cvdiff.

/// Tag of the synthetic node that owns the parsed document element.
pub const ROOT_TAG: &str = "$ROOT$";

/// Element holding the entity header.
pub const HEADER_TAG: &str = "Header";

/// Element below [`HEADER_TAG`] holding the entity name.
pub const NAME_TAG: &str = "Name";

/// Element whose GUID text is masked before comparison.
pub const VALUE_TAG: &str = "Value";

/// Subtrees rooted at these tags carry no semantic content.
pub const IGNORED_TAGS: [&str; 2] = ["Id", "Link"];

/// Replacement text for GUID-valued `Value` elements.
pub const GUID_PLACEHOLDER: &str = "GUID_PLACEHOLDER";

/// Canonical 8-4-4-4-12 UUID, case-insensitive, anchored.
pub const GUID_PATTERN: &str =
    r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

/// Entity names containing any of these markers are placeholders.
pub const EXCLUDED_NAME_MARKERS: [&str; 2] = ["TEMP_", "*"];

/// Extension of snapshot files.
pub const XML_EXTENSION: &str = ".xml";

/// Default report folder name below the backup root.
pub const DEFAULT_REPORT_FOLDER: &str = "DiffReport";

/// Report column: entity name.
pub const COLUMN_NAME: &str = "Picture Name";

/// Older reports used this header for [`COLUMN_NAME`].
pub const LEGACY_COLUMN_NAME: &str = "PIC_Name";

/// Report column: last update date.
pub const COLUMN_DATE: &str = "Last_Update_Date";

/// Report column: classification.
pub const COLUMN_RESULT: &str = "Diff_Result";

/// Date format of snapshot folder names.
pub const FOLDER_DATE_FORMAT: &str = "%Y%m%d";

/// Date format written to reports.
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Day-first date format found in hand-edited reports.
pub const LEGACY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Progress is logged after this many compared entities.
pub const PROGRESS_INTERVAL: usize = 100;
