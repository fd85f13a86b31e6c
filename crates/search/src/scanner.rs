use artifact_protocol::ArtifactKind;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Marker a source file name must contain to count as a test.
const TEST_MARKER: &str = "Test";

/// Finds candidate artifacts below a set of root directories
pub struct ArtifactScanner {
    base: PathBuf,
}

impl ArtifactScanner {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// Every `.yml` / `.yaml` file below the config roots
    pub fn config_files(&self, roots: &[String]) -> Vec<PathBuf> {
        self.collect(roots, |path| {
            ArtifactKind::from_path(path) == Some(ArtifactKind::StructuredConfig)
        })
    }

    /// Every `*Test*.java` file below the test roots
    pub fn test_files(&self, roots: &[String]) -> Vec<PathBuf> {
        self.collect(roots, Self::is_test_file)
    }

    /// Every `.java` file below the test roots, test marker or not
    pub fn source_files(&self, roots: &[String]) -> Vec<PathBuf> {
        self.collect(roots, |path| {
            ArtifactKind::from_path(path) == Some(ArtifactKind::SourceTest)
        })
    }

    fn is_test_file(path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        name.contains(TEST_MARKER)
            && ArtifactKind::from_path(path) == Some(ArtifactKind::SourceTest)
    }

    fn collect(&self, roots: &[String], accept: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
        // Overlapping roots must not yield the same file twice.
        let mut files = BTreeSet::new();

        for root in roots {
            let dir = self.base.join(root);
            if !dir.is_dir() {
                log::debug!("Skipping missing root {}", dir.display());
                continue;
            }

            for entry in WalkDir::new(&dir).sort_by_file_name() {
                match entry {
                    Ok(entry) => {
                        if !entry.file_type().is_file() {
                            continue;
                        }
                        if accept(entry.path()) {
                            files.insert(entry.into_path());
                        }
                    }
                    Err(e) => log::warn!("Failed to read entry: {e}"),
                }
            }
        }

        log::debug!("Found {} candidate files", files.len());
        files.into_iter().collect()
    }
}
