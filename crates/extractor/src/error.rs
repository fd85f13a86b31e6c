use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Errors that can occur while reading an artifact
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// File could not be read
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is neither a structured config nor a source test
    #[error("Unsupported artifact type: {0}")]
    UnsupportedKind(PathBuf),
}

impl ExtractorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
