use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Which annotation syntax a file carries; decided once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// `.yml` / `.yaml` document with `# @key: value` directives
    StructuredConfig,
    /// `.java` file with `@Meta(key = "value")` annotations
    SourceTest,
}

impl ArtifactKind {
    pub const CONFIG_EXTENSIONS: &'static [&'static str] = &["yml", "yaml"];
    pub const SOURCE_EXTENSION: &'static str = "java";

    /// Kind implied by the file extension, if it is one we understand.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if Self::CONFIG_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::StructuredConfig)
        } else if ext == Self::SOURCE_EXTENSION {
            Some(Self::SourceTest)
        } else {
            None
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StructuredConfig => "structured-config",
            Self::SourceTest => "source-test",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata value: repeated keys accumulate into an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Single(String),
    List(Vec<String>),
}

impl MetadataValue {
    /// Append a value, promoting a single value to a list on the second occurrence.
    pub fn push(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::List(vec![first, value]);
            }
            Self::List(values) => values.push(value),
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::List(values) => values,
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::List(_) => None,
        }
    }

    /// Case-insensitive equality against any held value.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.values()
            .iter()
            .any(|value| value.eq_ignore_ascii_case(needle))
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// Lower-cased key to value mapping extracted from one file.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Record `value` under `key`, accumulating repeats into a list.
pub fn accumulate(metadata: &mut Metadata, key: &str, value: impl Into<String>) {
    let key = key.to_lowercase();
    let value = value.into();
    match metadata.get_mut(&key) {
        Some(existing) => existing.push(value),
        None => {
            metadata.insert(key, MetadataValue::Single(value));
        }
    }
}

/// What a query asks for. Built once, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub capability: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn report_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = Some(report_type.into());
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// True when no signal could ever contribute to a score.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.report_type.is_none()
            && self.domain.is_none()
            && self.capability.is_none()
            && self.tags.is_empty()
    }
}

/// One scanned file with what was extracted from it and how well it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMatch {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub metadata: Metadata,
    /// Literal `sql:` block (structured configs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// First declared class (source tests only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// First `@Test` method (source tests only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_method: Option<String>,
    pub score: f64,
    /// Full raw text; callers may clear it before printing
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl ArtifactMatch {
    pub fn report_type(&self) -> Option<&str> {
        self.metadata.get("report_type").and_then(MetadataValue::first)
    }

    /// `package.ClassName` when both are known.
    pub fn qualified_class_name(&self) -> Option<String> {
        let class_name = self.class_name.as_deref()?;
        match self.metadata.get("package").and_then(MetadataValue::first) {
            Some(package) if !package.is_empty() => Some(format!("{package}.{class_name}")),
            _ => Some(class_name.to_string()),
        }
    }

    pub fn file_stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }
}
