use super::{all_captures, unique_captures};
use once_cell::sync::Lazy;
use regex::Regex;

static DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^def\s+(\w+)\s*\(").expect("python def regex must compile"));
static CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^class\s+(\w+)").expect("python class regex must compile"));
static TEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^def\s+(test_\w+)\s*\(").expect("python test regex must compile")
});

/// Module-level functions and classes only; methods are indented.
pub fn symbols(content: &str) -> Vec<String> {
    unique_captures(content, &[&DEF, &CLASS])
}

pub fn test_cases(content: &str) -> Vec<String> {
    all_captures(content, &TEST)
}
