//! # RealityCheck Indexer
//!
//! Language-aware inventory of a code tree, without full parsing.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> InventoryScanner (fixed + extra ignore set)
//!     │      ├─> manifests   → full text
//!     │      ├─> config      → path only
//!     │      └─> source      → language label
//!     │
//!     ├──> ExtractorRegistry (per extension)
//!     │      └─> symbols / test names
//!     │
//!     └──> Index::summary()
//!            └─> bounded text; only symbols are truncated
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use realitycheck_indexer::build_index;
//!
//! fn main() -> anyhow::Result<()> {
//!     let index = build_index("/path/to/project", &["fixtures"])?;
//!     println!("{} files", index.files.len());
//!     print!("{}", index.summary());
//!     Ok(())
//! }
//! ```

mod error;
mod index;
mod limits;
mod scanner;
mod summary;

pub use error::{IndexerError, Result};
pub use index::{
    normalize_relative_path, FileEntry, FileKind, Index, ManifestEntry, SymbolEntry, TestEntry,
};
pub use limits::{DEFAULT_IGNORED_DIRS, MAX_FILE_SIZE_BYTES, MAX_SUMMARY_BYTES};
pub use scanner::{build_index, InventoryScanner};
pub use summary::{SummaryBudget, SummaryPack};
