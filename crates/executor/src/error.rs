use std::path::PathBuf;
use thiserror::Error;

/// Result type for execution operations
pub type Result<T> = std::result::Result<T, ExecutorError>;

/// Failures that prevent a run from being attempted.
///
/// A run that starts and then fails, times out, or cannot spawn its
/// process is reported through `ExecutionResult`, not through this type.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Injector error: {0}")]
    InjectorError(#[from] artifact_injector::InjectorError),

    #[error("Invalid execution config: {0}")]
    InvalidConfig(String),
}

impl ExecutorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
