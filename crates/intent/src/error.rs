use std::path::PathBuf;
use thiserror::Error;

/// Result type for segmentation entry points
pub type Result<T> = std::result::Result<T, IntentError>;

/// Errors that can occur while reading an intent document
#[derive(Error, Debug)]
pub enum IntentError {
    /// The document could not be opened or read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from a non-file source failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntentError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
