use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Extractor error: {0}")]
    ExtractorError(#[from] artifact_extractor::ExtractorError),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid search config: {0}")]
    InvalidConfig(String),
}
