use realitycheck_protocol::{CoverageItem, CoverageStatus};
use serde::Serialize;

/// Number of coverage entries per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageTally {
    pub implemented: usize,
    pub partial: usize,
    pub not_implemented: usize,
    pub unclear: usize,
}

impl CoverageTally {
    pub fn total(&self) -> usize {
        self.implemented + self.partial + self.not_implemented + self.unclear
    }
}

/// Entries with an unrecognized status are not counted.
pub fn summarize_coverage<E: CoverageItem>(entries: &[E]) -> CoverageTally {
    let mut tally = CoverageTally::default();
    for entry in entries {
        match entry.status() {
            CoverageStatus::Implemented => tally.implemented += 1,
            CoverageStatus::Partial => tally.partial += 1,
            CoverageStatus::NotImplemented => tally.not_implemented += 1,
            CoverageStatus::Unclear => tally.unclear += 1,
            CoverageStatus::Unrecognized(_) => {}
        }
    }
    tally
}
