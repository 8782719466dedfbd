use super::{all_captures, unique_captures};
use once_cell::sync::Lazy;
use regex::Regex;

static FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfunction\s+(\w+)\s*\(").expect("js function regex must compile"));
static CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\s+(\w+)").expect("js class regex must compile"));
static EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bexport\s+(?:default\s+)?(?:function|class)\s+(\w+)")
        .expect("js export regex must compile")
});
static TEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:it|test|describe)\s*\(\s*['"]([^'"]+)['"]"#)
        .expect("js test regex must compile")
});

/// Shared by JavaScript and TypeScript sources.
pub fn symbols(content: &str) -> Vec<String> {
    unique_captures(content, &[&FUNCTION, &CLASS, &EXPORT])
}

/// Titles of `it(...)`, `test(...)` and `describe(...)` blocks.
pub fn test_cases(content: &str) -> Vec<String> {
    all_captures(content, &TEST)
}
