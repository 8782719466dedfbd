use super::{all_captures, unique_captures};
use once_cell::sync::Lazy;
use regex::Regex;

static FUNC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^func\s+(\w+)\s*\(").expect("go func regex must compile"));
static METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^func\s+\([^)]+\)\s+(\w+)\s*\(").expect("go method regex must compile")
});
static TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^type\s+(\w+)\s+(?:struct|interface)").expect("go type regex must compile")
});
static TEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^func\s+(Test\w+)\s*\(").expect("go test regex must compile"));

/// Functions, methods, and struct/interface types.
pub fn symbols(content: &str) -> Vec<String> {
    unique_captures(content, &[&FUNC, &METHOD, &TYPE])
}

pub fn test_cases(content: &str) -> Vec<String> {
    all_captures(content, &TEST)
}
