//! # Artifact Extractor
//!
//! Pulls declared metadata out of raw artifact text.
//!
//! ## Syntaxes
//!
//! ```text
//! structured-config (.yml/.yaml)
//!     ├──> `# @key: value` directive comments (repeats accumulate)
//!     ├──> `metadata:` mapping in the parsed document (wins on collision)
//!     └──> `sql:` literal block → query payload
//!
//! source-test (.java)
//!     ├──> `@Meta(key = "value")` / `@Metadata(...)` annotations
//!     ├──> `package a.b.c;`        → metadata["package"]
//!     ├──> first `class Name`      → class identifier
//!     └──> `@Test ... void name(`  → metadata["test_methods"]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use artifact_extractor::extract;
//! use artifact_protocol::{ArtifactKind, MetadataValue};
//!
//! let text = "# @report_type: wash_trade\nname: wash\n";
//! let extraction = extract(text, ArtifactKind::StructuredConfig);
//! assert_eq!(
//!     extraction.metadata.get("report_type"),
//!     Some(&MetadataValue::from("wash_trade"))
//! );
//! ```

mod error;
mod source;
mod structured;

use artifact_protocol::{ArtifactKind, Metadata};
use std::path::Path;

pub use error::{ExtractorError, Result};
pub use source::{extract_class_name, extract_package, extract_test_methods};
pub use structured::{extract_query_block, render_directives};

/// Everything extracted from one file's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: Metadata,
    /// `sql:` block, structured configs only
    pub query: Option<String>,
    /// First declared class, source tests only
    pub class_name: Option<String>,
    /// Every `@Test` method in declaration order, source tests only
    pub test_methods: Vec<String>,
}

impl Extraction {
    pub fn primary_method(&self) -> Option<&str> {
        self.test_methods.first().map(String::as_str)
    }
}

/// Extract metadata from `text` using the syntax implied by `kind`. Never fails.
pub fn extract(text: &str, kind: ArtifactKind) -> Extraction {
    match kind {
        ArtifactKind::StructuredConfig => structured::extract(text),
        ArtifactKind::SourceTest => source::extract(text),
    }
}

/// Read a file, pick its kind from the extension and return both with the raw text.
pub fn read_artifact(path: &Path) -> Result<(ArtifactKind, String)> {
    let kind = ArtifactKind::from_path(path)
        .ok_or_else(|| ExtractorError::UnsupportedKind(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path).map_err(|err| ExtractorError::io(path, err))?;
    Ok((kind, text))
}
