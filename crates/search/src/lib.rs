//! # Artifact Search
//!
//! Ranked search over machine-annotated artifacts.
//!
//! ```text
//! config roots ──> *.yml / *.yaml ─┐
//!                                  ├─> extract ─> score ─> drop 0 ─> sort desc
//! test roots   ──> *Test*.java ────┘
//! ```

mod config;
mod engine;
mod error;
mod scanner;
pub mod scoring;

pub use config::{SearchConfig, DEFAULT_RELATED_SCORE};
pub use engine::{build_match, ArtifactSearch, TestTarget};
pub use error::{Result, SearchError};
pub use scanner::ArtifactScanner;
