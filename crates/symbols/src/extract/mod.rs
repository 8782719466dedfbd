//! Regex-based declaration extractors, one module per language family.
//!
//! These are deliberately shallow: they look for declaration keywords at
//! predictable positions and never build a syntax tree.

pub mod go;
pub mod javascript;
pub mod python;
pub mod rust;

use regex::Regex;
use std::collections::HashSet;

/// First capture group of every match, de-duplicated in first-seen order.
/// Patterns are scanned one after another, so ordering is pattern-major.
pub(crate) fn unique_captures(content: &str, patterns: &[&Regex]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for pattern in patterns {
        for caps in pattern.captures_iter(content) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if seen.insert(name) {
                    out.push(name.to_string());
                }
            }
        }
    }
    out
}

/// First capture group of every match, duplicates kept.
pub(crate) fn all_captures(content: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
