//! Parsing and checking of raw oracle output.
//!
//! Only two problems are fatal: unparseable output and a missing coverage
//! collection. Everything else is corrected in place where possible and
//! reported as a diagnostic.

use once_cell::sync::Lazy;
use realitycheck_indexer::Index;
use realitycheck_protocol::{
    Confidence, Coverage, CoverageItem, DriftFinding, Evidence, Meta, PartialReport,
    PlanCoverageEntry, Reference, SpecCoverageEntry, Violation,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const FIELD_JSON_PARSE: &str = "json_parse";
pub const FIELD_REQUIRED: &str = "required_field";

static FULL_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?:`{3}|~{3})[^\n]*\n(.*?)(?:`{3}|~{3})\s*$")
        .expect("fence regex must compile")
});

static OPEN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:`{3}|~{3})[^\n]*\n").expect("open fence regex must compile"));

/// One backslash and the character it escapes. Matches are consumed left
/// to right, so the second backslash of an escaped `\\` never opens an escape.
static ESCAPE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\(.)").expect("escape regex must compile"));

const VALID_ESCAPES: &str = "\"\\/bfnrtu";

static DRIFT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^DRIFT-\d+$").expect("drift id regex must compile"));

static VIOLATION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^VIOLATION-\d+$").expect("violation id regex must compile"));

/// One problem found in an oracle response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("validation: {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Fatal errors leave no usable report and trigger the repair call.
    pub fn is_fatal(&self) -> bool {
        self.field == FIELD_JSON_PARSE || self.field == FIELD_REQUIRED
    }
}

/// Result of validating one response.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// `None` whenever a fatal error was found.
    pub report: Option<PartialReport>,
    pub errors: Vec<ValidationError>,
}

impl Validation {
    pub fn has_fatal(&self) -> bool {
        self.report.is_none() || self.errors.iter().any(ValidationError::is_fatal)
    }

    fn fatal(errors: Vec<ValidationError>) -> Self {
        Self {
            report: None,
            errors,
        }
    }
}

/// Coverage collections stay optional here so absence can be told apart
/// from an empty list.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    coverage: Option<WireCoverage>,
    #[serde(default)]
    drift: Option<Vec<DriftFinding>>,
    #[serde(default)]
    violations: Option<Vec<Violation>>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Deserialize)]
struct WireCoverage {
    #[serde(default)]
    spec: Option<Vec<SpecCoverageEntry>>,
    #[serde(default)]
    plan: Option<Vec<PlanCoverageEntry>>,
}

/// Removes a code fence around the whole response. A response cut off
/// before its closing fence loses only the opening line.
pub fn strip_enclosing_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(body) = FULL_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        return body.as_str().trim();
    }
    if let Some(opener) = OPEN_FENCE.find(trimmed) {
        return trimmed[opener.end()..].trim();
    }
    trimmed
}

/// Doubles every backslash that does not start a valid JSON escape.
pub fn repair_invalid_escapes(text: &str) -> String {
    ESCAPE_PAIR
        .replace_all(text, |caps: &Captures<'_>| {
            let escaped = &caps[1];
            if escaped.chars().all(|c| VALID_ESCAPES.contains(c)) {
                caps[0].to_string()
            } else {
                format!("\\\\{escaped}")
            }
        })
        .into_owned()
}

fn parse_envelope(text: &str) -> Result<Envelope, ValidationError> {
    match serde_json::from_str(text) {
        Ok(envelope) => Ok(envelope),
        Err(first) => {
            let repaired = repair_invalid_escapes(text);
            serde_json::from_str(&repaired)
                .map(|envelope| {
                    log::debug!("Recovered oracle output by repairing invalid escapes");
                    envelope
                })
                .map_err(|_| ValidationError::new(FIELD_JSON_PARSE, first.to_string()))
        }
    }
}

/// Parses `raw` and checks it against `index`.
///
/// Evidence citing a path missing from the index is kept with its
/// confidence lowered to LOW.
pub fn validate_response(raw: &str, index: &Index) -> Validation {
    let envelope = match parse_envelope(strip_enclosing_fence(raw)) {
        Ok(envelope) => envelope,
        Err(err) => return Validation::fatal(vec![err]),
    };

    let (spec, plan) = match envelope.coverage {
        Some(WireCoverage { spec, plan }) => (spec, plan),
        None => (None, None),
    };
    let mut errors = Vec::new();
    if spec.is_none() {
        errors.push(ValidationError::new(FIELD_REQUIRED, "coverage.spec is missing"));
    }
    if plan.is_none() {
        errors.push(ValidationError::new(FIELD_REQUIRED, "coverage.plan is missing"));
    }
    let (Some(spec), Some(plan)) = (spec, plan) else {
        return Validation::fatal(errors);
    };

    let mut report = PartialReport {
        coverage: Coverage { spec, plan },
        drift: envelope.drift.unwrap_or_default(),
        violations: envelope.violations.unwrap_or_default(),
        meta: envelope.meta.unwrap_or_default(),
    };

    check_enums(&report, &mut errors);
    check_ids(&report, &mut errors);
    check_references(&report, &mut errors);
    downgrade_unknown_paths(&mut report, &index.path_set(), &mut errors);

    Validation {
        report: Some(report),
        errors,
    }
}

fn check_enums(report: &PartialReport, errors: &mut Vec<ValidationError>) {
    check_coverage_enums("coverage.spec", &report.coverage.spec, errors);
    check_coverage_enums("coverage.plan", &report.coverage.plan, errors);
    for (i, finding) in report.drift.iter().enumerate() {
        if !finding.severity.is_known() {
            errors.push(ValidationError::new(
                format!("drift[{i}].severity"),
                format!("invalid severity {:?}", finding.severity.as_str()),
            ));
        }
        check_confidences(&format!("drift[{i}]"), &finding.evidence, errors);
    }
    for (i, violation) in report.violations.iter().enumerate() {
        if !violation.severity.is_known() {
            errors.push(ValidationError::new(
                format!("violations[{i}].severity"),
                format!("invalid severity {:?}", violation.severity.as_str()),
            ));
        }
        check_confidences(&format!("violations[{i}]"), &violation.evidence, errors);
    }
}

fn check_coverage_enums<E: CoverageItem>(
    collection: &str,
    entries: &[E],
    errors: &mut Vec<ValidationError>,
) {
    for (i, entry) in entries.iter().enumerate() {
        if !entry.status().is_known() {
            errors.push(ValidationError::new(
                format!("{collection}[{i}].status"),
                format!("invalid status {:?}", entry.status().as_str()),
            ));
        }
        check_confidences(&format!("{collection}[{i}]"), entry.evidence(), errors);
    }
}

/// An absent confidence is allowed.
fn check_confidences(base: &str, evidence: &[Evidence], errors: &mut Vec<ValidationError>) {
    for (j, item) in evidence.iter().enumerate() {
        if let Some(confidence) = item.confidence.as_ref().filter(|c| !c.is_known()) {
            errors.push(ValidationError::new(
                format!("{base}.evidence[{j}].confidence"),
                format!("invalid confidence {:?}", confidence.as_str()),
            ));
        }
    }
}

fn check_ids(report: &PartialReport, errors: &mut Vec<ValidationError>) {
    for (i, finding) in report.drift.iter().enumerate() {
        if !DRIFT_ID.is_match(&finding.id) {
            errors.push(ValidationError::new(
                format!("drift[{i}].id"),
                format!("id {:?} does not match DRIFT-\\d+", finding.id),
            ));
        }
    }
    for (i, violation) in report.violations.iter().enumerate() {
        if !VIOLATION_ID.is_match(&violation.id) {
            errors.push(ValidationError::new(
                format!("violations[{i}].id"),
                format!("id {:?} does not match VIOLATION-\\d+", violation.id),
            ));
        }
    }
}

/// An omitted reference (all zero) is not flagged.
fn check_references(report: &PartialReport, errors: &mut Vec<ValidationError>) {
    let mut check = |field: String, reference: &Reference| {
        let omitted = reference.line_start == 0 && reference.line_end == 0;
        if !omitted && !reference.is_well_formed() {
            errors.push(ValidationError::new(
                field,
                format!(
                    "line range {}-{} is not a valid 1-indexed range",
                    reference.line_start, reference.line_end
                ),
            ));
        }
    };
    for (i, entry) in report.coverage.spec.iter().enumerate() {
        check(format!("coverage.spec[{i}].spec_reference"), entry.reference());
    }
    for (i, entry) in report.coverage.plan.iter().enumerate() {
        check(format!("coverage.plan[{i}].plan_reference"), entry.reference());
    }
    for (i, violation) in report.violations.iter().enumerate() {
        check(
            format!("violations[{i}].spec_reference"),
            &violation.spec_reference,
        );
    }
}

fn downgrade_unknown_paths(
    report: &mut PartialReport,
    known: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    for (i, entry) in report.coverage.spec.iter_mut().enumerate() {
        downgrade_evidence(&format!("coverage.spec[{i}]"), entry.evidence_mut(), known, errors);
    }
    for (i, entry) in report.coverage.plan.iter_mut().enumerate() {
        downgrade_evidence(&format!("coverage.plan[{i}]"), entry.evidence_mut(), known, errors);
    }
    for (i, finding) in report.drift.iter_mut().enumerate() {
        downgrade_evidence(&format!("drift[{i}]"), &mut finding.evidence, known, errors);
    }
    for (i, violation) in report.violations.iter_mut().enumerate() {
        downgrade_evidence(
            &format!("violations[{i}]"),
            &mut violation.evidence,
            known,
            errors,
        );
    }
}

fn downgrade_evidence(
    base: &str,
    evidence: &mut [Evidence],
    known: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    for (j, item) in evidence.iter_mut().enumerate() {
        if item.path.is_empty() || known.contains(item.path.as_str()) {
            continue;
        }
        item.confidence = Some(Confidence::Low);
        errors.push(ValidationError::new(
            format!("{base}.evidence[{j}].path"),
            format!(
                "path {:?} not found in code index; confidence downgraded to LOW",
                item.path
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use realitycheck_indexer::{FileEntry, ManifestEntry};
    use realitycheck_protocol::{CoverageStatus, Severity};
    use realitycheck_symbols::Language;

    fn index() -> Index {
        Index {
            files: vec![FileEntry {
                path: "internal/api/server.go".to_string(),
                language: Language::Go,
            }],
            dependency_manifests: vec![ManifestEntry {
                path: "go.mod".to_string(),
                content: "module x\n".to_string(),
            }],
            config_files: vec!["config.yaml".to_string()],
            ..Index::default()
        }
    }

    const MINIMAL: &str = r#"{"coverage":{"spec":[],"plan":[]},"drift":[],"violations":[],"meta":{"model":"m","temperature":0.2}}"#;

    #[test]
    fn strips_full_and_orphaned_fences() {
        assert_eq!(strip_enclosing_fence("```json\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_enclosing_fence("~~~\n{}\n~~~"), "{}");
        assert_eq!(strip_enclosing_fence("  ```json\n{\"a\":1"), "{\"a\":1");
        assert_eq!(strip_enclosing_fence(" {} "), "{}");
        assert_eq!(strip_enclosing_fence("```\n```"), "");
    }

    #[test]
    fn repairs_regex_like_escapes() {
        assert_eq!(
            repair_invalid_escapes(r#"{"q":"^\d+$ and \n"}"#),
            r#"{"q":"^\\d+$ and \n"}"#
        );
    }

    #[test]
    fn minimal_report_is_clean() {
        let validation = validate_response(MINIMAL, &index());
        assert!(!validation.has_fatal());
        assert!(validation.errors.is_empty(), "{:?}", validation.errors);
        assert_eq!(validation.report.unwrap().meta.model, "m");
    }

    #[test]
    fn fenced_report_with_bad_escape_parses() {
        let raw = "```json\n{\"coverage\":{\"spec\":[],\"plan\":[]},\"drift\":[{\"id\":\"DRIFT-001\",\"severity\":\"INFO\",\"description\":\"matches \\d+\"}]}\n```";
        let validation = validate_response(raw, &index());
        let report = validation.report.expect("report");
        assert_eq!(report.drift[0].description, r"matches \d+");
        assert!(validation.errors.is_empty(), "{:?}", validation.errors);
    }

    #[test]
    fn unparseable_output_is_fatal() {
        let validation = validate_response("I could not analyze this.", &index());
        assert!(validation.report.is_none());
        assert_eq!(validation.errors.len(), 1);
        assert_eq!(validation.errors[0].field, FIELD_JSON_PARSE);
        assert!(validation.errors[0].is_fatal());
    }

    #[test]
    fn missing_coverage_collections_are_fatal() {
        let validation = validate_response(r#"{"coverage":{"spec":[]},"drift":[]}"#, &index());
        assert!(validation.has_fatal());
        assert_eq!(
            validation.errors,
            vec![ValidationError::new(FIELD_REQUIRED, "coverage.plan is missing")]
        );

        let validation = validate_response(r#"{"drift":[]}"#, &index());
        let messages: Vec<&str> = validation
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec!["coverage.spec is missing", "coverage.plan is missing"]
        );

        let validation =
            validate_response(r#"{"coverage":{"spec":null,"plan":[]}}"#, &index());
        assert!(validation.report.is_none());
    }

    #[test]
    fn bad_enums_and_ids_are_reported_but_kept() {
        let raw = r#"{
          "coverage": {
            "spec": [{"id":"SPEC-001","status":"DONE","evidence":[{"path":"go.mod","confidence":"SURE"}]}],
            "plan": [{"id":"PLAN-001","status":"PARTIAL"}]
          },
          "drift": [{"id":"D-1","severity":"HIGH"}],
          "violations": [{"id":"VIOLATION-7","severity":"CRITICAL"}]
        }"#;
        let validation = validate_response(raw, &index());
        assert!(!validation.has_fatal());
        let fields: Vec<&str> = validation.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "coverage.spec[0].status",
                "coverage.spec[0].evidence[0].confidence",
                "drift[0].severity",
                "drift[0].id",
            ]
        );
        assert_eq!(validation.errors[0].message, r#"invalid status "DONE""#);
        assert_eq!(validation.errors[3].message, r#"id "D-1" does not match DRIFT-\d+"#);

        let report = validation.report.unwrap();
        assert_eq!(
            report.coverage.spec[0].status,
            CoverageStatus::Unrecognized("DONE".to_string())
        );
        assert_eq!(report.drift[0].severity, Severity::Unrecognized("HIGH".to_string()));
        assert_eq!(report.violations[0].severity, Severity::Critical);
    }

    #[test]
    fn unknown_evidence_paths_are_downgraded() {
        let raw = r#"{
          "coverage": {
            "spec": [{"id":"SPEC-001","status":"IMPLEMENTED","evidence":[
              {"path":"internal/api/server.go","symbol":"Serve","confidence":"HIGH"},
              {"path":"internal/api/ghost.go","symbol":"Ghost","confidence":"HIGH"}
            ]}],
            "plan": []
          },
          "drift": [{"id":"DRIFT-001","severity":"WARN","evidence":[{"path":"","symbol":"x"},{"path":"config.yaml"}]}],
          "violations": [{"id":"VIOLATION-001","severity":"INFO","evidence":[{"path":"cmd/fake.go"}]}]
        }"#;
        let validation = validate_response(raw, &index());
        let report = validation.report.clone().unwrap();

        let spec_evidence = &report.coverage.spec[0].evidence;
        assert_eq!(spec_evidence[0].confidence, Some(Confidence::High));
        assert_eq!(spec_evidence[1].confidence, Some(Confidence::Low));
        assert_eq!(report.drift[0].evidence[0].confidence, None);
        assert_eq!(report.drift[0].evidence[1].confidence, None);
        assert_eq!(report.violations[0].evidence[0].confidence, Some(Confidence::Low));

        assert_eq!(
            validation.errors,
            vec![
                ValidationError::new(
                    "coverage.spec[0].evidence[1].path",
                    r#"path "internal/api/ghost.go" not found in code index; confidence downgraded to LOW"#
                ),
                ValidationError::new(
                    "violations[0].evidence[0].path",
                    r#"path "cmd/fake.go" not found in code index; confidence downgraded to LOW"#
                ),
            ]
        );
        assert!(!validation.has_fatal());
    }

    #[test]
    fn inverted_references_are_flagged() {
        let raw = r#"{"coverage":{"spec":[{"id":"SPEC-001","status":"IMPLEMENTED","spec_reference":{"line_start":9,"line_end":3}}],"plan":[{"id":"PLAN-001","status":"IMPLEMENTED"}]}}"#;
        let validation = validate_response(raw, &index());
        assert_eq!(validation.errors.len(), 1);
        assert_eq!(validation.errors[0].field, "coverage.spec[0].spec_reference");
        assert!(!validation.errors[0].is_fatal());
    }

    #[test]
    fn escaped_backslashes_survive_escape_repair() {
        assert_eq!(
            repair_invalid_escapes(r#""C:\\temp\\data with \d+ and \"q\"""#),
            r#""C:\\temp\\data with \\d+ and \"q\"""#
        );
        assert_eq!(repair_invalid_escapes(r#""\\\d""#), r#""\\\\d""#);
    }

    #[test]
    fn windows_path_next_to_bare_regex_is_recovered() {
        let raw = r#"{"coverage":{"spec":[{"id":"SPEC-001","status":"IMPLEMENTED","notes":"reads C:\\temp\\data with \d+"}],"plan":[]},"drift":[],"violations":[]}"#;
        let validation = validate_response(raw, &index());
        assert!(validation.errors.is_empty(), "{:?}", validation.errors);
        let report = validation.report.unwrap();
        assert_eq!(
            report.coverage.spec[0].notes,
            r"reads C:\temp\data with \d+"
        );
    }

    #[test]
    fn null_fields_are_not_parse_failures() {
        let raw = r#"{
            "coverage": {
                "spec": [{"id": "SPEC-001", "status": "IMPLEMENTED", "notes": null, "evidence": null}],
                "plan": [{"id": "PLAN-001", "status": null}]
            },
            "drift": [{
                "id": "DRIFT-001",
                "severity": null,
                "description": "Adds a cache",
                "evidence": [{"path": "internal/api/server.go", "symbol": null}]
            }],
            "violations": null,
            "meta": null
        }"#;
        let validation = validate_response(raw, &index());
        assert!(!validation.has_fatal());
        assert_eq!(
            validation.errors,
            vec![
                ValidationError::new("coverage.plan[0].status", r#"invalid status """#),
                ValidationError::new("drift[0].severity", r#"invalid severity """#),
            ]
        );
        let report = validation.report.unwrap();
        assert_eq!(report.coverage.spec[0].notes, "");
        assert!(report.coverage.spec[0].evidence.is_empty());
        assert_eq!(report.drift[0].severity, Severity::Unrecognized(String::new()));
        assert_eq!(report.drift[0].evidence[0].symbol, "");
        assert!(report.violations.is_empty());
    }

    #[test]
    fn error_display() {
        let err = ValidationError::new("drift[0].id", "bad");
        assert_eq!(err.to_string(), "validation: drift[0].id: bad");
    }
}
