use anyhow::{Context, Result};
use realitycheck_protocol::{CoverageItem, Evidence, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Self::Json),
            "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Renders the report, always ending with a newline.
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    let mut out = match format {
        OutputFormat::Json => render_json(report)?,
        OutputFormat::Markdown => render_markdown(report),
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

pub fn render_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

pub fn render_markdown(report: &Report) -> String {
    let summary = &report.summary;
    let mut md = String::new();
    md.push_str("## RealityCheck Report\n\n");
    md.push_str(&format!("**Verdict:** {}  \n", summary.verdict));
    md.push_str(&format!("**Score:** {}/100  \n", summary.score));
    md.push_str(&format!(
        "**Critical:** {} | **Warn:** {} | **Info:** {}\n\n",
        summary.critical_count, summary.warn_count, summary.info_count
    ));

    coverage_table(&mut md, "Spec Coverage", &report.coverage.spec);
    coverage_table(&mut md, "Plan Coverage", &report.coverage.plan);

    if !report.drift.is_empty() {
        md.push_str("## Drift Findings\n\n");
        for finding in &report.drift {
            details_open(&mut md, &finding.id, finding.severity.as_str(), &finding.description);
            evidence_list(&mut md, &finding.evidence);
            if !finding.why_unjustified.is_empty() {
                md.push_str(&format!(
                    "**Why unjustified:** {}\n\n",
                    escape_cell(&finding.why_unjustified)
                ));
            }
            if !finding.recommendation.is_empty() {
                md.push_str(&format!(
                    "**Recommendation:** {}\n\n",
                    escape_cell(&finding.recommendation)
                ));
            }
            md.push_str("</details>\n\n");
        }
    }

    if !report.violations.is_empty() {
        md.push_str("## Violations\n\n");
        for violation in &report.violations {
            details_open(
                &mut md,
                &violation.id,
                violation.severity.as_str(),
                &violation.description,
            );
            evidence_list(&mut md, &violation.evidence);
            if !violation.impact.is_empty() {
                md.push_str(&format!("**Impact:** {}\n\n", escape_cell(&violation.impact)));
            }
            let blocking = if violation.blocking { "yes" } else { "no" };
            md.push_str(&format!("**Blocking:** {blocking}\n\n"));
            md.push_str("</details>\n\n");
        }
    }

    md
}

fn coverage_table<E: CoverageItem>(md: &mut String, title: &str, entries: &[E]) {
    if entries.is_empty() {
        return;
    }
    md.push_str(&format!("## {title}\n\n"));
    md.push_str("| ID | Status | Notes |\n");
    md.push_str("|---|---|---|\n");
    for entry in entries {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            entry.id(),
            entry.status(),
            escape_cell(entry.notes())
        ));
    }
    md.push('\n');
}

fn details_open(md: &mut String, id: &str, severity: &str, description: &str) {
    md.push_str(&format!(
        "<details>\n<summary><strong>{id}</strong> [{severity}] \u{2014} {}</summary>\n\n",
        escape_cell(description)
    ));
}

fn evidence_list(md: &mut String, evidence: &[Evidence]) {
    if evidence.is_empty() {
        return;
    }
    md.push_str("**Evidence:**\n\n");
    for item in evidence {
        if item.symbol.is_empty() {
            md.push_str(&format!("- `{}`\n", item.path));
        } else {
            md.push_str(&format!("- `{}`: `{}`\n", item.path, item.symbol));
        }
    }
    md.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use realitycheck_protocol::{
        Coverage, CoverageStatus, DriftFinding, Meta, RunInput, Severity, SpecCoverageEntry,
        Summary, Verdict, Violation,
    };

    fn report() -> Report {
        Report {
            tool: "realitycheck".to_string(),
            version: "0.1.1".to_string(),
            input: RunInput::default(),
            summary: Summary {
                verdict: Verdict::Violation,
                score: 73,
                critical_count: 1,
                warn_count: 1,
                info_count: 0,
            },
            coverage: Coverage {
                spec: vec![SpecCoverageEntry {
                    id: "SPEC-001".to_string(),
                    status: CoverageStatus::Partial,
                    notes: "a | b\nc".to_string(),
                    ..SpecCoverageEntry::default()
                }],
                plan: Vec::new(),
            },
            drift: vec![DriftFinding {
                id: "DRIFT-001".to_string(),
                severity: Severity::Warn,
                description: "Adds a cache".to_string(),
                evidence: vec![Evidence {
                    path: "cache.go".to_string(),
                    symbol: "NewCache".to_string(),
                    confidence: None,
                }],
                recommendation: "Remove it".to_string(),
                ..DriftFinding::default()
            }],
            violations: vec![Violation {
                id: "VIOLATION-001".to_string(),
                severity: Severity::Critical,
                description: "Stores plaintext".to_string(),
                evidence: vec![Evidence {
                    path: "db.go".to_string(),
                    ..Evidence::default()
                }],
                blocking: true,
                ..Violation::default()
            }],
            meta: Meta::default(),
        }
    }

    #[test]
    fn markdown_layout() {
        let expected = "## RealityCheck Report\n\n\
**Verdict:** VIOLATION  \n\
**Score:** 73/100  \n\
**Critical:** 1 | **Warn:** 1 | **Info:** 0\n\n\
## Spec Coverage\n\n\
| ID | Status | Notes |\n\
|---|---|---|\n\
| SPEC-001 | PARTIAL | a \\| b c |\n\n\
## Drift Findings\n\n\
<details>\n<summary><strong>DRIFT-001</strong> [WARN] \u{2014} Adds a cache</summary>\n\n\
**Evidence:**\n\n\
- `cache.go`: `NewCache`\n\n\
**Recommendation:** Remove it\n\n\
</details>\n\n\
## Violations\n\n\
<details>\n<summary><strong>VIOLATION-001</strong> [CRITICAL] \u{2014} Stores plaintext</summary>\n\n\
**Evidence:**\n\n\
- `db.go`\n\n\
**Blocking:** yes\n\n\
</details>\n\n";
        assert_eq!(render_markdown(&report()), expected);
    }

    #[test]
    fn json_is_indented_and_newline_terminated() {
        let out = render(&report(), OutputFormat::Json).unwrap();
        assert!(out.starts_with("{\n  \"tool\": \"realitycheck\",\n  \"version\": \"0.1.1\","));
        assert!(out.ends_with("}\n"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["summary"]["verdict"], "VIOLATION");
        assert_eq!(value["violations"][0]["blocking"], true);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut report = report();
        report.coverage = Coverage::default();
        report.drift.clear();
        report.violations.clear();
        let md = render_markdown(&report);
        assert!(md.ends_with("**Critical:** 1 | **Warn:** 1 | **Info:** 0\n\n"));
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::parse("md"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::parse("markdown"), None);
    }
}
