/// Files above this size are listed but never read for symbols.
pub const MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024;

/// Upper bound for the rendered inventory summary.
pub const MAX_SUMMARY_BYTES: usize = 40_000;

/// Directory base names skipped anywhere below the root.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "vendor",
    "node_modules",
    "__pycache__",
    ".build",
    "dist",
    "build",
    "target",
];

/// Dependency manifests captured verbatim.
pub const MANIFEST_NAMES: &[&str] = &[
    "go.mod",
    "package.json",
    "requirements.txt",
    "Cargo.toml",
    "pyproject.toml",
    "pom.xml",
];

pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "toml", "json"];
