use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// File-name patterns that count as a report
pub const REPORT_PATTERNS: &[&str] = &["*.html", "*.pdf", "*.csv", "*.xlsx", "*report*"];

static REPORT_GLOBS: Lazy<GlobSet> = Lazy::new(|| {
    let mut builder = GlobSetBuilder::new();
    for pattern in REPORT_PATTERNS {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("valid report pattern");
        builder.add(glob);
    }
    builder.build().expect("valid report pattern set")
});

pub fn is_report_name(file_name: &str) -> bool {
    REPORT_GLOBS.is_match(file_name)
}

/// Most recently modified report-like file anywhere below `dir`.
pub fn find_report(dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        log::debug!("Report directory {} does not exist", dir.display());
        return None;
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Failed to read entry under {}: {err}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_report_name(name) {
            continue;
        }
        let Some(modified) = entry.metadata().ok().and_then(|meta| meta.modified().ok()) else {
            continue;
        };

        let candidate = (modified, entry.into_path());
        if newest.as_ref().map_or(true, |current| candidate > *current) {
            newest = Some(candidate);
        }
    }

    newest.map(|(_, path)| path)
}
