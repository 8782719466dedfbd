use realitycheck_protocol::{Report, Severity};

/// Drops drift findings and violations ranked below `threshold` from a
/// report that is about to be rendered. Score, counts and verdict already
/// sit in the summary and are left as computed. Findings with an
/// unrecognized severity are dropped by any threshold.
pub fn filter_by_severity(report: &mut Report, threshold: &Severity) {
    let Some(min) = threshold.rank() else {
        return;
    };
    let keep = |severity: &Severity| severity.rank().is_some_and(|rank| rank >= min);
    report.drift.retain(|finding| keep(&finding.severity));
    report.violations.retain(|violation| keep(&violation.severity));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use realitycheck_protocol::{
        Coverage, DriftFinding, Meta, RunInput, Summary, Verdict, Violation,
    };

    fn report() -> Report {
        let drift = |id: &str, severity| DriftFinding {
            id: id.to_string(),
            severity,
            ..DriftFinding::default()
        };
        Report {
            tool: "realitycheck".to_string(),
            version: "0.0.0".to_string(),
            input: RunInput::default(),
            summary: Summary {
                verdict: Verdict::DriftDetected,
                score: 84,
                critical_count: 0,
                warn_count: 2,
                info_count: 1,
            },
            coverage: Coverage::default(),
            drift: vec![
                drift("DRIFT-1", Severity::Info),
                drift("DRIFT-2", Severity::Warn),
                drift("DRIFT-3", Severity::Unrecognized("HIGH".to_string())),
            ],
            violations: vec![Violation {
                id: "VIOLATION-1".to_string(),
                severity: Severity::Warn,
                ..Violation::default()
            }],
            meta: Meta::default(),
        }
    }

    #[test]
    fn threshold_filters_output_only() {
        let mut report = report();
        filter_by_severity(&mut report, &Severity::Warn);
        let ids: Vec<&str> = report.drift.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["DRIFT-2"]);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.summary.score, 84);
        assert_eq!(report.summary.info_count, 1);
    }

    #[test]
    fn critical_threshold_drops_warnings() {
        let mut report = report();
        filter_by_severity(&mut report, &Severity::Critical);
        assert!(report.drift.is_empty());
        assert!(report.violations.is_empty());
    }
}
