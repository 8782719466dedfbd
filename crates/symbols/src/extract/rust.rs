use super::unique_captures;
use once_cell::sync::Lazy;
use regex::Regex;

static FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfn\s+(\w+)\s*\(").expect("rust fn regex must compile"));
static STRUCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bstruct\s+(\w+)").expect("rust struct regex must compile"));
// Generic parameters are skipped so `impl<T> Foo<T>` yields `Foo`.
static IMPL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bimpl(?:<[^>]+>)?\s+(\w+)").expect("rust impl regex must compile"));

pub fn symbols(content: &str) -> Vec<String> {
    unique_captures(content, &[&FN, &STRUCT, &IMPL])
}
