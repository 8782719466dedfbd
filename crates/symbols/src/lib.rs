//! # RealityCheck Symbols
//!
//! Language labels and shallow, regex-based extraction of declared names
//! (functions, types, classes, test cases) from source files.
//!
//! ## Architecture
//!
//! ```text
//! path + content
//!     │
//!     ├──> Language::from_path        → label for the file tree
//!     │
//!     └──> ExtractorRegistry (extension → strategy)
//!            ├─> test file?  → strategy.tests
//!            └─> otherwise   → strategy.symbols
//! ```

mod conventions;
mod extract;
mod language;
mod strategy;

pub use conventions::is_test_file;
pub use language::Language;
pub use strategy::{Extraction, ExtractionStrategy, Extractor, ExtractorRegistry};
