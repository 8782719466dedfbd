use realitycheck_protocol::{DriftFinding, PartialReport};

/// Under a strict policy raises a drift finding one level
/// (INFO→WARN, WARN→CRITICAL); CRITICAL stays CRITICAL.
#[must_use]
pub fn escalate_severity(mut finding: DriftFinding, strict: bool) -> DriftFinding {
    if strict {
        finding.severity = finding.severity.escalated();
    }
    finding
}

/// Escalates every drift finding in place. Violations are never touched.
pub fn escalate_drift(report: &mut PartialReport) {
    for finding in &mut report.drift {
        finding.severity = finding.severity.escalated();
    }
}
