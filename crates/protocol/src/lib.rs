//! # RealityCheck Protocol
//!
//! Shared data model for intent audits: the findings an oracle proposes,
//! the validated partial report, and the final report with locally
//! computed score and verdict.
//!
//! Oracle-facing enums accept any string so that malformed values reach the
//! validator as data rather than as parse failures.

use anyhow::Result;
use serde::Serialize;

mod report;
mod values;

pub use report::{
    Coverage, CoverageItem, DriftFinding, Evidence, Meta, PartialReport, PlanCoverageEntry,
    Reference, Report, RunInput, SpecCoverageEntry, Summary, Violation,
};
pub use values::{Confidence, CoverageStatus, Severity, UnknownValue, Verdict};

pub const TOOL_NAME: &str = "realitycheck";

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
