use realitycheck_protocol::{PartialReport, Severity};
use serde::Serialize;

const CRITICAL_PENALTY: i64 = 20;
const WARN_PENALTY: i64 = 7;
const INFO_PENALTY: i64 = 2;

/// Findings per severity across drift and violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warn: usize,
    pub info: usize,
}

impl SeverityCounts {
    fn add(&mut self, severity: &Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::Warn => self.warn += 1,
            Severity::Info => self.info += 1,
            // Already reported by validation; does not affect scoring.
            Severity::Unrecognized(_) => {}
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.warn + self.info
    }
}

pub fn count_severities(report: &PartialReport) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for finding in &report.drift {
        counts.add(&finding.severity);
    }
    for violation in &report.violations {
        counts.add(&violation.severity);
    }
    counts
}

/// `100 - 20·critical - 7·warn - 2·info`, clamped to `0..=100`.
pub fn compute_score(critical: usize, warn: usize, info: usize) -> u32 {
    let penalty = [
        (critical, CRITICAL_PENALTY),
        (warn, WARN_PENALTY),
        (info, INFO_PENALTY),
    ]
    .into_iter()
    .fold(0i64, |acc, (count, weight)| {
        acc.saturating_add(i64::try_from(count).unwrap_or(i64::MAX).saturating_mul(weight))
    });
    100i64.saturating_sub(penalty).clamp(0, 100) as u32
}
