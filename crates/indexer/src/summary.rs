use crate::index::Index;
use crate::limits::MAX_SUMMARY_BYTES;
use serde::Serialize;

const SYMBOL_SECTION_HEADER: &str = "\n=== Symbols ===\n";

/// Room kept after the kept symbols for the truncation notice line.
const TRUNCATION_NOTICE_RESERVE: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryBudget {
    pub max_bytes: usize,
    pub used_bytes: usize,
    pub truncated: bool,
    pub omitted_symbols: usize,
}

/// Rendered inventory plus the accounting of how it fit the budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryPack {
    pub text: String,
    pub budget: SummaryBudget,
}

impl Index {
    /// Text inventory for the oracle, bounded by [`MAX_SUMMARY_BYTES`].
    pub fn summary(&self) -> String {
        self.summary_with_budget(MAX_SUMMARY_BYTES).text
    }

    /// Renders the file tree, tests, manifests, config paths and symbols.
    ///
    /// When the whole rendering exceeds `max_bytes`, only the symbol list is
    /// cut: symbol lines are kept in order while they fit what remains after
    /// the other sections, and a notice with the omitted count is appended.
    pub fn summary_with_budget(&self, max_bytes: usize) -> SummaryPack {
        let head = self.render_non_symbol_sections();
        let symbol_lines: Vec<String> = self
            .symbols
            .iter()
            .map(|entry| format!("  {}: {}\n", entry.path, entry.symbol))
            .collect();
        let full_len = head.len()
            + SYMBOL_SECTION_HEADER.len()
            + symbol_lines.iter().map(String::len).sum::<usize>();

        let mut text = head;
        text.push_str(SYMBOL_SECTION_HEADER);

        if full_len <= max_bytes {
            for line in &symbol_lines {
                text.push_str(line);
            }
            return SummaryPack {
                budget: SummaryBudget {
                    max_bytes,
                    used_bytes: text.len(),
                    truncated: false,
                    omitted_symbols: 0,
                },
                text,
            };
        }

        let symbol_budget = max_bytes
            .saturating_sub(text.len())
            .saturating_sub(TRUNCATION_NOTICE_RESERVE);
        let mut used = 0;
        let mut kept = 0;
        for line in &symbol_lines {
            if used + line.len() > symbol_budget {
                break;
            }
            text.push_str(line);
            used += line.len();
            kept += 1;
        }

        let omitted = symbol_lines.len() - kept;
        log::warn!(
            "Inventory summary truncated: {omitted} symbols omitted ({full_len} bytes > {max_bytes} limit)"
        );
        text.push_str(&format!(
            "[TRUNCATED: {omitted} symbols omitted to fit context limit]\n"
        ));

        SummaryPack {
            budget: SummaryBudget {
                max_bytes,
                used_bytes: text.len(),
                truncated: true,
                omitted_symbols: omitted,
            },
            text,
        }
    }

    fn render_non_symbol_sections(&self) -> String {
        let mut out = String::from("=== File Tree ===\n");
        for file in &self.files {
            out.push_str(&format!("  {} ({})\n", file.path, file.language));
        }
        if !self.tests.is_empty() {
            out.push_str("\n=== Tests ===\n");
            for test in &self.tests {
                out.push_str(&format!("  {}: {}\n", test.path, test.function));
            }
        }
        if !self.dependency_manifests.is_empty() {
            out.push_str("\n=== Dependency Manifests ===\n");
            for manifest in &self.dependency_manifests {
                out.push_str(&format!("--- {} ---\n{}\n", manifest.path, manifest.content));
            }
        }
        if !self.config_files.is_empty() {
            out.push_str("\n=== Config Files ===\n");
            for config in &self.config_files {
                out.push_str(&format!("  {config}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FileEntry, ManifestEntry, SymbolEntry, TestEntry};
    use pretty_assertions::assert_eq;
    use realitycheck_symbols::Language;

    fn sample_index(symbols: usize) -> Index {
        Index {
            files: vec![
                FileEntry {
                    path: "cmd/main.go".to_string(),
                    language: Language::Go,
                },
                FileEntry {
                    path: "cmd/main_test.go".to_string(),
                    language: Language::Go,
                },
            ],
            symbols: (0..symbols)
                .map(|n| SymbolEntry {
                    path: "cmd/main.go".to_string(),
                    symbol: format!("Handler{n:04}"),
                })
                .collect(),
            tests: vec![TestEntry {
                path: "cmd/main_test.go".to_string(),
                function: "TestMain".to_string(),
            }],
            dependency_manifests: vec![ManifestEntry {
                path: "go.mod".to_string(),
                content: "module example.com/app\n".to_string(),
            }],
            config_files: vec!["config.yaml".to_string()],
        }
    }

    #[test]
    fn renders_sections_in_order() {
        let text = sample_index(1).summary();
        let expected = "=== File Tree ===\n  cmd/main.go (Go)\n  cmd/main_test.go (Go)\n\n=== Tests ===\n  cmd/main_test.go: TestMain\n\n=== Dependency Manifests ===\n--- go.mod ---\nmodule example.com/app\n\n\n=== Config Files ===\n  config.yaml\n\n=== Symbols ===\n  cmd/main.go: Handler0000\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let index = Index {
            files: vec![FileEntry {
                path: "README.md".to_string(),
                language: Language::Markdown,
            }],
            ..Index::default()
        };
        assert_eq!(
            index.summary(),
            "=== File Tree ===\n  README.md (Markdown)\n\n=== Symbols ===\n"
        );
    }

    #[test]
    fn oversized_summary_truncates_only_symbols() {
        let index = sample_index(100);
        let full = index.summary_with_budget(usize::MAX);
        assert!(!full.budget.truncated);

        let max = 1_000;
        let pack = index.summary_with_budget(max);
        assert!(pack.budget.truncated);
        assert!(pack.text.len() <= max);
        assert_eq!(pack.budget.used_bytes, pack.text.len());
        assert!(pack.text.contains("  cmd/main_test.go: TestMain\n"));
        assert!(pack.text.contains("--- go.mod ---"));
        assert!(pack.text.contains("  config.yaml\n"));

        let kept = pack.text.matches(": Handler").count();
        assert!(kept > 0 && kept < 100);
        assert_eq!(pack.budget.omitted_symbols, 100 - kept);
        assert!(pack.text.ends_with(&format!(
            "[TRUNCATED: {} symbols omitted to fit context limit]\n",
            100 - kept
        )));
    }

    #[test]
    fn non_symbol_sections_survive_even_when_alone_over_budget() {
        let index = sample_index(3);
        let pack = index.summary_with_budget(10);
        assert!(pack.budget.truncated);
        assert_eq!(pack.budget.omitted_symbols, 3);
        assert!(pack.text.starts_with("=== File Tree ==="));
        assert!(pack.text.contains("[TRUNCATED: 3 symbols omitted"));
    }
}
