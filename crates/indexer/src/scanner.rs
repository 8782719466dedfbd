use crate::error::{IndexerError, Result};
use crate::index::{
    normalize_relative_path, FileEntry, FileKind, Index, ManifestEntry, SymbolEntry, TestEntry,
};
use crate::limits::{DEFAULT_IGNORED_DIRS, MAX_FILE_SIZE_BYTES};
use ignore::{DirEntry, WalkBuilder};
use realitycheck_symbols::ExtractorRegistry;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Walks a code tree and builds its [`Index`].
///
/// The walk does not honor `.gitignore` or hidden-file rules: the auditor
/// needs to see everything the build could see. Only the fixed ignore set
/// plus caller-supplied directory names are skipped.
pub struct InventoryScanner {
    root: PathBuf,
    ignored_dirs: Arc<HashSet<String>>,
    registry: ExtractorRegistry,
    max_file_size: u64,
}

impl InventoryScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ignored_dirs: Arc::new(DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect()),
            registry: ExtractorRegistry::builtin(),
            max_file_size: MAX_FILE_SIZE_BYTES,
        }
    }

    /// Additional directory base names to skip.
    #[must_use]
    pub fn with_ignored_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ignored = (*self.ignored_dirs).clone();
        ignored.extend(names.into_iter().map(Into::into));
        self.ignored_dirs = Arc::new(ignored);
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scan(&self) -> Result<Index> {
        self.check_root()?;

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));
        let ignored = Arc::clone(&self.ignored_dirs);
        builder.filter_entry(move |entry| !Self::is_ignored_dir(entry, &ignored));

        let mut index = Index::default();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            self.record(&mut index, entry.path());
        }

        log::info!(
            "Inventoried {} files, {} symbols, {} tests, {} manifests, {} config files",
            index.files.len(),
            index.symbols.len(),
            index.tests.len(),
            index.dependency_manifests.len(),
            index.config_files.len()
        );
        Ok(index)
    }

    fn check_root(&self) -> Result<()> {
        let meta = fs::metadata(&self.root).map_err(|err| IndexerError::InvalidRoot {
            path: self.root.clone(),
            reason: err.to_string(),
        })?;
        if !meta.is_dir() {
            return Err(IndexerError::InvalidRoot {
                path: self.root.clone(),
                reason: "not a directory".to_string(),
            });
        }
        fs::read_dir(&self.root).map_err(|source| IndexerError::Walk {
            path: self.root.clone(),
            source,
        })?;
        Ok(())
    }

    /// The root itself is never skipped, even if its name is in the set.
    fn is_ignored_dir(entry: &DirEntry, ignored: &HashSet<String>) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            return false;
        }
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| ignored.contains(name))
    }

    fn record(&self, index: &mut Index, path: &Path) {
        let Some(rel) = normalize_relative_path(&self.root, path) else {
            log::debug!("Skipping {} outside root", path.display());
            return;
        };

        match FileKind::classify(path) {
            FileKind::Manifest => match fs::read_to_string(path) {
                Ok(content) => index
                    .dependency_manifests
                    .push(ManifestEntry { path: rel, content }),
                Err(err) => log::debug!("Skipping unreadable manifest {}: {err}", path.display()),
            },
            FileKind::Config => index.config_files.push(rel),
            FileKind::Source(language) => {
                index.files.push(FileEntry {
                    path: rel.clone(),
                    language,
                });
                if !self.registry.supports(path) {
                    return;
                }
                let Some(content) = self.read_source(path) else {
                    return;
                };
                let extraction = self.registry.extract(path, &content);
                index
                    .symbols
                    .extend(extraction.symbols.into_iter().map(|symbol| SymbolEntry {
                        path: rel.clone(),
                        symbol,
                    }));
                index
                    .tests
                    .extend(extraction.tests.into_iter().map(|function| TestEntry {
                        path: rel.clone(),
                        function,
                    }));
            }
        }
    }

    fn read_source(&self, path: &Path) -> Option<String> {
        match fs::metadata(path) {
            Ok(meta) if meta.len() > self.max_file_size => {
                log::debug!(
                    "Skipping large file {} ({} bytes > {})",
                    path.display(),
                    meta.len(),
                    self.max_file_size
                );
                return None;
            }
            Ok(_) => {}
            Err(err) => {
                log::debug!("Skipping {}: {err}", path.display());
                return None;
            }
        }
        match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                log::debug!("Skipping unreadable file {}: {err}", path.display());
                None
            }
        }
    }
}

/// Builds an [`Index`] for `root`, skipping the default ignore set plus
/// `extra_ignored` directory names.
pub fn build_index<S: AsRef<str>>(root: impl AsRef<Path>, extra_ignored: &[S]) -> Result<Index> {
    InventoryScanner::new(root)
        .with_ignored_dirs(extra_ignored.iter().map(|name| name.as_ref().to_string()))
        .scan()
}
