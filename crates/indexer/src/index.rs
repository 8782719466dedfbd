use crate::limits::{CONFIG_EXTENSIONS, MANIFEST_NAMES};
use realitycheck_symbols::Language;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Relative to the code root, `/`-separated
    pub path: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolEntry {
    pub path: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestEntry {
    pub path: String,
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub content: String,
}

/// Snapshot of a code tree, built once per run and read-only afterwards.
///
/// `files` excludes manifests and config files. Config files are recorded
/// by path only; their content never leaves the machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Index {
    pub files: Vec<FileEntry>,
    pub symbols: Vec<SymbolEntry>,
    pub tests: Vec<TestEntry>,
    pub dependency_manifests: Vec<ManifestEntry>,
    pub config_files: Vec<String>,
}

impl Index {
    /// Every path evidence may legitimately cite.
    pub fn path_set(&self) -> HashSet<&str> {
        self.files
            .iter()
            .map(|file| file.path.as_str())
            .chain(
                self.dependency_manifests
                    .iter()
                    .map(|manifest| manifest.path.as_str()),
            )
            .chain(self.config_files.iter().map(String::as_str))
            .collect()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.files.iter().any(|file| file.path == path)
            || self
                .dependency_manifests
                .iter()
                .any(|manifest| manifest.path == path)
            || self.config_files.iter().any(|config| config == path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dependency_manifests.is_empty() && self.config_files.is_empty()
    }
}

/// How a file found during the walk is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Manifest,
    Config,
    Source(Language),
}

impl FileKind {
    pub fn classify(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if MANIFEST_NAMES.contains(&name) {
            return FileKind::Manifest;
        }
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        if CONFIG_EXTENSIONS.contains(&ext) || name.starts_with(".env") {
            return FileKind::Config;
        }
        FileKind::Source(Language::from_path(path))
    }
}

/// Path relative to `root` with `/` separators on every platform.
pub fn normalize_relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}
