//! # RealityCheck Verdict
//!
//! Deterministic post-processing of a validated oracle report. Nothing in
//! this crate trusts a model: counts, score and verdict are recomputed from
//! the findings every time.
//!
//! ```
//! use realitycheck_protocol::{DriftFinding, PartialReport, Severity, Verdict};
//! use realitycheck_verdict::evaluate;
//!
//! let mut report = PartialReport::default();
//! report.drift.push(DriftFinding {
//!     id: "DRIFT-001".to_string(),
//!     severity: Severity::Warn,
//!     ..DriftFinding::default()
//! });
//!
//! let evaluation = evaluate(report, true);
//! assert_eq!(evaluation.verdict, Verdict::Violation);
//! assert_eq!(evaluation.score, 80);
//! ```

mod coverage;
mod determine;
mod escalate;
mod filter;
mod score;

pub use coverage::{summarize_coverage, CoverageTally};
pub use determine::determine_verdict;
pub use escalate::{escalate_drift, escalate_severity};
pub use filter::filter_by_severity;
pub use score::{compute_score, count_severities, SeverityCounts};

use realitycheck_protocol::{PartialReport, Summary, Verdict};

/// A report after escalation with its locally computed outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub report: PartialReport,
    pub counts: SeverityCounts,
    pub score: u32,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn summary(&self) -> Summary {
        Summary {
            verdict: self.verdict,
            score: self.score,
            critical_count: self.counts.critical,
            warn_count: self.counts.warn,
            info_count: self.counts.info,
        }
    }
}

/// Escalates drift once when `escalate` is set, then counts, scores and
/// classifies.
pub fn evaluate(mut report: PartialReport, escalate: bool) -> Evaluation {
    if escalate {
        escalate_drift(&mut report);
    }
    let counts = count_severities(&report);
    let score = compute_score(counts.critical, counts.warn, counts.info);
    let verdict = determine_verdict(&report);
    log::debug!(
        "Evaluated report: verdict={verdict}, score={score}, critical={}, warn={}, info={}",
        counts.critical,
        counts.warn,
        counts.info
    );
    Evaluation {
        report,
        counts,
        score,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use realitycheck_protocol::{
        CoverageStatus, DriftFinding, Severity, SpecCoverageEntry, Violation,
    };

    fn mixed_report() -> PartialReport {
        let mut report = PartialReport::default();
        report.coverage.spec.push(SpecCoverageEntry {
            id: "SPEC-001".to_string(),
            status: CoverageStatus::Partial,
            ..SpecCoverageEntry::default()
        });
        report.drift.push(DriftFinding {
            id: "DRIFT-001".to_string(),
            severity: Severity::Info,
            ..DriftFinding::default()
        });
        report.violations.push(Violation {
            id: "VIOLATION-001".to_string(),
            severity: Severity::Warn,
            ..Violation::default()
        });
        report
    }

    #[test]
    fn evaluates_without_escalation() {
        let evaluation = evaluate(mixed_report(), false);
        assert_eq!(evaluation.counts.total(), 2);
        assert_eq!(evaluation.score, 91);
        assert_eq!(evaluation.verdict, Verdict::DriftDetected);
        assert_eq!(
            evaluation.summary(),
            Summary {
                verdict: Verdict::DriftDetected,
                score: 91,
                critical_count: 0,
                warn_count: 1,
                info_count: 1,
            }
        );
    }

    #[test]
    fn escalation_feeds_score_and_verdict() {
        let evaluation = evaluate(mixed_report(), true);
        assert_eq!(evaluation.report.drift[0].severity, Severity::Warn);
        assert_eq!(evaluation.report.violations[0].severity, Severity::Warn);
        assert_eq!(evaluation.score, 86);
        assert_eq!(evaluation.verdict, Verdict::DriftDetected);
    }

    #[test]
    fn summary_serializes_with_wire_names() {
        let value = serde_json::to_value(evaluate(PartialReport::default(), false).summary())
            .expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "verdict": "ALIGNED",
                "score": 100,
                "critical_count": 0,
                "warn_count": 0,
                "info_count": 0
            })
        );
    }
}
