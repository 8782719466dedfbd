use crate::conventions::is_test_file;
use crate::extract;
use std::collections::HashMap;
use std::path::Path;

/// Extraction function: source text in, declared names out.
pub type Extractor = fn(&str) -> Vec<String>;

/// How to pull names out of one kind of source file
#[derive(Clone, Copy)]
pub struct ExtractionStrategy {
    /// Declarations (functions, types, classes) in regular source files
    pub symbols: Extractor,
    /// Test-function names, used instead of `symbols` for test files
    pub tests: Option<Extractor>,
}

/// Names found in one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub symbols: Vec<String>,
    pub tests: Vec<String>,
}

/// Registry mapping file extensions to extraction strategies.
///
/// The inventory walk only asks the registry for a strategy; adding a
/// language means registering one more entry.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_extension: HashMap<String, ExtractionStrategy>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Go, JavaScript/TypeScript, Python and Rust.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "go",
            ExtractionStrategy {
                symbols: extract::go::symbols,
                tests: Some(extract::go::test_cases),
            },
        );
        let js = ExtractionStrategy {
            symbols: extract::javascript::symbols,
            tests: Some(extract::javascript::test_cases),
        };
        for ext in ["ts", "tsx", "js"] {
            registry.register(ext, js);
        }
        // JSX has symbols but no test-file convention.
        registry.register(
            "jsx",
            ExtractionStrategy {
                symbols: extract::javascript::symbols,
                tests: None,
            },
        );
        registry.register(
            "py",
            ExtractionStrategy {
                symbols: extract::python::symbols,
                tests: Some(extract::python::test_cases),
            },
        );
        registry.register(
            "rs",
            ExtractionStrategy {
                symbols: extract::rust::symbols,
                tests: None,
            },
        );
        registry
    }

    /// Adds or replaces the strategy for `extension` (without the dot).
    pub fn register(&mut self, extension: &str, strategy: ExtractionStrategy) {
        self.by_extension
            .insert(extension.trim_start_matches('.').to_string(), strategy);
    }

    pub fn strategy_for(&self, path: impl AsRef<Path>) -> Option<&ExtractionStrategy> {
        let ext = path.as_ref().extension()?.to_str()?;
        self.by_extension.get(ext)
    }

    pub fn supports(&self, path: impl AsRef<Path>) -> bool {
        self.strategy_for(path).is_some()
    }

    /// Runs the matching strategy. Test files yield test names only;
    /// other files yield symbols only.
    pub fn extract(&self, path: impl AsRef<Path>, content: &str) -> Extraction {
        let path = path.as_ref();
        let Some(strategy) = self.strategy_for(path) else {
            return Extraction::default();
        };
        if is_test_file(path) {
            Extraction {
                symbols: Vec::new(),
                tests: strategy.tests.map(|tests| tests(content)).unwrap_or_default(),
            }
        } else {
            Extraction {
                symbols: (strategy.symbols)(content),
                tests: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_files_yield_tests_not_symbols() {
        let registry = ExtractorRegistry::builtin();
        let src = "func TestGet(t *testing.T) {}\nfunc helper() {}\n";
        let out = registry.extract("store_test.go", src);
        assert_eq!(out.tests, vec!["TestGet"]);
        assert!(out.symbols.is_empty());

        let out = registry.extract("store.go", src);
        assert_eq!(out.symbols, vec!["TestGet", "helper"]);
        assert!(out.tests.is_empty());
    }

    #[test]
    fn unknown_extensions_yield_nothing() {
        let registry = ExtractorRegistry::builtin();
        assert!(!registry.supports("Main.java"));
        assert_eq!(registry.extract("Main.java", "class Main {}"), Extraction::default());
    }

    #[test]
    fn custom_strategies_can_be_registered() {
        fn lua_functions(content: &str) -> Vec<String> {
            content
                .lines()
                .filter_map(|line| line.strip_prefix("function "))
                .filter_map(|rest| rest.split('(').next())
                .map(str::to_string)
                .collect()
        }

        let mut registry = ExtractorRegistry::builtin();
        registry.register(
            ".lua",
            ExtractionStrategy {
                symbols: lua_functions,
                tests: None,
            },
        );
        let out = registry.extract("init.lua", "function setup(opts)\nend\n");
        assert_eq!(out.symbols, vec!["setup"]);
    }
}
