//! Report categories and the selector that picks which ones to run.

use std::fmt;

/// An independent family of snapshot files with its own report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Composite,
    Substation,
}

impl Category {
    /// All categories in run order.
    pub const ALL: [Category; 2] = [Category::Composite, Category::Substation];

    /// Name of the category folder inside a date folder.
    pub fn subfolder(&self) -> &'static str {
        match self {
            Category::Composite => "Composite",
            Category::Substation => "Substation",
        }
    }

    /// Report file name prefix, completed by the weekday tag.
    pub fn report_base(&self) -> &'static str {
        match self {
            Category::Composite => "CompositeView_Diff",
            Category::Substation => "Substation_Diff",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subfolder())
    }
}

/// Which categories a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportSelector {
    Composite,
    Substation,
    #[default]
    Both,
}

impl ReportSelector {
    /// Categories to process, in order.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            ReportSelector::Composite => &[Category::Composite],
            ReportSelector::Substation => &[Category::Substation],
            ReportSelector::Both => &Category::ALL,
        }
    }
}

impl fmt::Display for ReportSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportSelector::Composite => "composite",
            ReportSelector::Substation => "substation",
            ReportSelector::Both => "both",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(Category::Composite.subfolder(), "Composite");
        assert_eq!(Category::Substation.report_base(), "Substation_Diff");
        assert_eq!(Category::Composite.report_base(), "CompositeView_Diff");
        assert_eq!(Category::Substation.to_string(), "Substation");
    }

    #[test]
    fn test_selector_categories() {
        assert_eq!(ReportSelector::default(), ReportSelector::Both);
        assert_eq!(
            ReportSelector::Both.categories(),
            &[Category::Composite, Category::Substation]
        );
        assert_eq!(ReportSelector::Substation.categories(), &[Category::Substation]);
    }
}
