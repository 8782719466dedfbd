use crate::values::{
    null_as_default, optional_confidence, Confidence, CoverageStatus, Severity, Verdict,
};
use serde::{Deserialize, Serialize};

/// A line range inside one of the intent documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    #[serde(deserialize_with = "null_as_default")]
    pub line_start: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub line_end: i64,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub quote: String,
}

impl Reference {
    /// Both ends positive and ordered.
    pub fn is_well_formed(&self) -> bool {
        self.line_start > 0 && self.line_end > 0 && self.line_start <= self.line_end
    }
}

/// A citation from a finding back into the code inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub symbol: String,
    #[serde(
        deserialize_with = "optional_confidence",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<Confidence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecCoverageEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub status: CoverageStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub spec_reference: Reference,
    #[serde(deserialize_with = "null_as_default")]
    pub evidence: Vec<Evidence>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanCoverageEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub status: CoverageStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub plan_reference: Reference,
    #[serde(deserialize_with = "null_as_default")]
    pub evidence: Vec<Evidence>,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub notes: String,
}

/// Shared view over spec and plan coverage entries.
pub trait CoverageItem {
    fn id(&self) -> &str;
    fn status(&self) -> &CoverageStatus;
    fn reference(&self) -> &Reference;
    fn evidence(&self) -> &[Evidence];
    fn evidence_mut(&mut self) -> &mut Vec<Evidence>;
    fn notes(&self) -> &str;
}

macro_rules! coverage_item {
    ($ty:ty, $reference:ident) => {
        impl CoverageItem for $ty {
            fn id(&self) -> &str {
                &self.id
            }
            fn status(&self) -> &CoverageStatus {
                &self.status
            }
            fn reference(&self) -> &Reference {
                &self.$reference
            }
            fn evidence(&self) -> &[Evidence] {
                &self.evidence
            }
            fn evidence_mut(&mut self) -> &mut Vec<Evidence> {
                &mut self.evidence
            }
            fn notes(&self) -> &str {
                &self.notes
            }
        }
    };
}

coverage_item!(SpecCoverageEntry, spec_reference);
coverage_item!(PlanCoverageEntry, plan_reference);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coverage {
    pub spec: Vec<SpecCoverageEntry>,
    pub plan: Vec<PlanCoverageEntry>,
}

/// Code behavior with no supporting authorization in the intent documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftFinding {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub severity: Severity,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub evidence: Vec<Evidence>,
    #[serde(deserialize_with = "null_as_default")]
    pub why_unjustified: String,
    #[serde(deserialize_with = "null_as_default")]
    pub impact: String,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendation: String,
}

/// Code behavior that contradicts a declared constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Violation {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub severity: Severity,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub spec_reference: Reference,
    #[serde(deserialize_with = "null_as_default")]
    pub evidence: Vec<Evidence>,
    #[serde(deserialize_with = "null_as_default")]
    pub impact: String,
    #[serde(deserialize_with = "null_as_default")]
    pub blocking: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub temperature: f64,
}

/// The oracle-produced part of a report, after validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialReport {
    pub coverage: Coverage,
    pub drift: Vec<DriftFinding>,
    pub violations: Vec<Violation>,
    pub meta: Meta,
}

/// What the run was asked to check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInput {
    pub spec_file: String,
    pub plan_file: String,
    pub code_root: String,
    pub profile: String,
    pub strict: bool,
}

/// Locally computed figures; never taken from the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub verdict: Verdict,
    pub score: u32,
    pub critical_count: usize,
    pub warn_count: usize,
    pub info_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub tool: String,
    pub version: String,
    pub input: RunInput,
    pub summary: Summary,
    pub coverage: Coverage,
    pub drift: Vec<DriftFinding>,
    pub violations: Vec<Violation>,
    pub meta: Meta,
}
