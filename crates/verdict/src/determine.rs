use realitycheck_protocol::{CoverageItem, PartialReport, Severity, Verdict};

/// Classifies a validated report. First matching rule wins:
///
/// 1. any CRITICAL violation → `VIOLATION`
/// 2. any CRITICAL drift → `VIOLATION`
/// 3. any drift at all → `DRIFT_DETECTED`
/// 4. any spec/plan entry PARTIAL, NOT_IMPLEMENTED or UNCLEAR → `PARTIALLY_ALIGNED`
/// 5. otherwise → `ALIGNED`
///
/// Violations below CRITICAL do not move the verdict on their own.
pub fn determine_verdict(report: &PartialReport) -> Verdict {
    if report
        .violations
        .iter()
        .any(|violation| violation.severity == Severity::Critical)
    {
        return Verdict::Violation;
    }
    // Unauthorized behavior at maximum severity counts as a breach.
    if report
        .drift
        .iter()
        .any(|finding| finding.severity == Severity::Critical)
    {
        return Verdict::Violation;
    }
    if !report.drift.is_empty() {
        return Verdict::DriftDetected;
    }
    let has_gap = report
        .coverage
        .spec
        .iter()
        .map(|entry| entry.status())
        .chain(report.coverage.plan.iter().map(|entry| entry.status()))
        .any(|status| status.is_gap());
    if has_gap {
        return Verdict::PartiallyAligned;
    }
    Verdict::Aligned
}
