//! The two document dialects RealityCheck reads: specs and plans.

use crate::error::Result;
use crate::markdown;
use crate::segment::{Item, Segmenter};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub const SPEC_ID_PREFIX: &str = "SPEC";
pub const PLAN_ID_PREFIX: &str = "PLAN";

/// `Step 3:` / `Sub-step 2b:` headers used by execution plans.
static PLAN_STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Sub-step\s+\d+[a-zA-Z]?|Step\s+\d+[a-zA-Z]?):\s*")
        .expect("plan step regex must compile")
});

fn is_plan_item(line: &str) -> bool {
    markdown::is_numbered_item(line) || PLAN_STEP.is_match(line.trim())
}

fn strip_plan_prefix(line: &str) -> String {
    let trimmed = line.trim();
    match PLAN_STEP.find(trimmed) {
        Some(step) => trimmed[step.end()..].trim().to_string(),
        None => markdown::strip_list_prefix(line),
    }
}

/// Ordered lists and bullets, IDs `SPEC-NNN`.
pub fn spec_segmenter() -> Segmenter {
    Segmenter::new(SPEC_ID_PREFIX)
}

/// Spec dialect plus `Step N:` headers, IDs `PLAN-NNN`.
pub fn plan_segmenter() -> Segmenter {
    Segmenter::new(PLAN_ID_PREFIX)
        .with_item_matcher(is_plan_item)
        .with_prefix_stripper(strip_plan_prefix)
}

pub fn parse_spec(path: impl AsRef<Path>) -> Result<Vec<Item>> {
    spec_segmenter().parse_file(path)
}

pub fn parse_plan(path: impl AsRef<Path>) -> Result<Vec<Item>> {
    plan_segmenter().parse_file(path)
}
