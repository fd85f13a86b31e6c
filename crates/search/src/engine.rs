use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::scanner::ArtifactScanner;
use crate::scoring;
use artifact_extractor::{extract, read_artifact};
use artifact_protocol::{ArtifactKind, ArtifactMatch, MetadataValue, SearchCriteria};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const UNKNOWN_REPORT_TYPE: &str = "unknown";

/// A runnable test class discovered under the test roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTarget {
    pub class_name: String,
    /// `package.ClassName`, or the bare class name without a package
    pub full_name: String,
    pub package: Option<String>,
    pub file_path: PathBuf,
    pub test_methods: Vec<String>,
}

/// Ranked search over structured configs and source tests below one project root
pub struct ArtifactSearch {
    root: PathBuf,
    config: SearchConfig,
    scanner: ArtifactScanner,
}

impl ArtifactSearch {
    pub fn new(root: impl AsRef<Path>, config: SearchConfig) -> Result<Self> {
        config.validate().map_err(SearchError::InvalidConfig)?;
        let root = root.as_ref();
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        Ok(Self {
            scanner: ArtifactScanner::new(&root),
            root,
            config,
        })
    }

    /// All positively scored artifacts, highest score first.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<ArtifactMatch> {
        let candidates = self
            .scanner
            .config_files(&self.config.config_dirs)
            .into_iter()
            .chain(self.scanner.test_files(&self.config.test_dirs));

        let mut matches: Vec<ArtifactMatch> = candidates
            .filter_map(|path| load_match(&path, criteria))
            .filter(|artifact| artifact.score > 0.0)
            .collect();

        sort_by_score(&mut matches);
        log::info!("Search matched {} artifacts", matches.len());
        matches
    }

    /// [`search`](Self::search) plus the related tests of every matched config,
    /// merged by path (higher score kept) and re-sorted.
    pub fn search_with_related(&self, criteria: &SearchCriteria) -> Vec<ArtifactMatch> {
        let matches = self.search(criteria);
        let related: Vec<ArtifactMatch> = matches
            .iter()
            .filter(|artifact| artifact.kind == ArtifactKind::StructuredConfig)
            .flat_map(|config| self.related_tests(config))
            .collect();

        let mut merged: Vec<ArtifactMatch> = Vec::with_capacity(matches.len() + related.len());
        for artifact in matches.into_iter().chain(related) {
            match merged.iter_mut().find(|seen| seen.path == artifact.path) {
                Some(seen) if seen.score < artifact.score => *seen = artifact,
                Some(_) => {}
                None => merged.push(artifact),
            }
        }

        sort_by_score(&mut merged);
        merged
    }

    /// Test sources that mention `config`'s file stem, each at the fixed related score.
    pub fn related_tests(&self, config: &ArtifactMatch) -> Vec<ArtifactMatch> {
        let Some(stem) = config.file_stem().filter(|stem| !stem.is_empty()) else {
            return Vec::new();
        };
        let criteria = SearchCriteria::new().keywords([stem]);

        let mut related: Vec<ArtifactMatch> = self
            .scanner
            .source_files(&self.config.test_dirs)
            .into_iter()
            .filter_map(|path| load_match(&path, &criteria))
            .filter(|artifact| artifact.content.contains(stem))
            .map(|mut artifact| {
                artifact.score = self.config.related_score;
                artifact
            })
            .collect();

        sort_by_score(&mut related);
        related
    }

    /// Every candidate artifact, unfiltered, grouped by its `report_type`.
    pub fn catalog(&self) -> BTreeMap<String, Vec<ArtifactMatch>> {
        let criteria = SearchCriteria::new();
        let mut catalog: BTreeMap<String, Vec<ArtifactMatch>> = BTreeMap::new();

        let candidates = self
            .scanner
            .config_files(&self.config.config_dirs)
            .into_iter()
            .chain(self.scanner.test_files(&self.config.test_dirs));

        for artifact in candidates.filter_map(|path| load_match(&path, &criteria)) {
            let report_type = artifact
                .report_type()
                .unwrap_or(UNKNOWN_REPORT_TYPE)
                .to_string();
            catalog.entry(report_type).or_default().push(artifact);
        }

        for group in catalog.values_mut() {
            group.sort_by(|a, b| a.path.cmp(&b.path));
        }
        catalog
    }

    /// Extract a single file without filtering; relative paths resolve against the root.
    pub fn inspect(&self, path: impl AsRef<Path>) -> Result<ArtifactMatch> {
        let path = self.resolve(path.as_ref());
        if !path.is_file() {
            return Err(SearchError::NotFound(path));
        }
        let (kind, text) = read_artifact(&path)?;
        Ok(build_match(path, kind, text, &SearchCriteria::new()))
    }

    /// Test classes below the test roots, in path order. `class_filter` keeps classes
    /// whose simple name contains it, ignoring case.
    pub fn list_tests(&self, class_filter: Option<&str>) -> Vec<TestTarget> {
        let class_filter = class_filter.map(str::to_lowercase);
        self.scanner
            .test_files(&self.config.test_dirs)
            .into_iter()
            .filter_map(|path| load_match(&path, &SearchCriteria::new()))
            .filter_map(|artifact| {
                let full_name = artifact.qualified_class_name()?;
                let class_name = artifact.class_name?;
                let package = artifact
                    .metadata
                    .get("package")
                    .and_then(MetadataValue::first)
                    .map(str::to_string);
                let test_methods = artifact
                    .metadata
                    .get("test_methods")
                    .map(|methods| methods.values().to_vec())
                    .unwrap_or_default();
                if let Some(filter) = &class_filter {
                    if !class_name.to_lowercase().contains(filter.as_str()) {
                        return None;
                    }
                }
                Some(TestTarget {
                    class_name,
                    full_name,
                    package,
                    file_path: artifact.path,
                    test_methods,
                })
            })
            .collect()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Extract and score one file; unreadable files are logged and skipped.
fn load_match(path: &Path, criteria: &SearchCriteria) -> Option<ArtifactMatch> {
    match read_artifact(path) {
        Ok((kind, text)) => Some(build_match(path.to_path_buf(), kind, text, criteria)),
        Err(err) => {
            log::warn!("Skipping {}: {err}", path.display());
            None
        }
    }
}

pub fn build_match(
    path: PathBuf,
    kind: ArtifactKind,
    text: String,
    criteria: &SearchCriteria,
) -> ArtifactMatch {
    let extraction = extract(&text, kind);
    let score = scoring::score(&extraction.metadata, &text, criteria);
    let test_method = extraction.primary_method().map(str::to_string);

    ArtifactMatch {
        path,
        kind,
        metadata: extraction.metadata,
        query: extraction.query,
        class_name: extraction.class_name,
        test_method,
        score,
        content: text,
    }
}

/// Descending by score; equal scores keep scan order.
fn sort_by_score(matches: &mut [ArtifactMatch]) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
}
