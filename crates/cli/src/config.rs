use anyhow::{Context, Result};
use artifact_executor::ExecutionConfig;
use artifact_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "artifact-finder.toml";

/// Contents of `artifact-finder.toml`; every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinderConfig {
    pub search: SearchConfig,
    pub execution: ExecutionConfig,
}

impl FinderConfig {
    /// Load `explicit` if given (it must exist), otherwise `<project>/artifact-finder.toml`
    /// when present, otherwise defaults.
    pub fn load(project: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = project.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", project.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.search.validate().map_err(anyhow::Error::msg)?;
        config.execution.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(mut self, timeout_secs: Option<u64>, output_dir: Option<PathBuf>) -> Self {
        if let Some(timeout_secs) = timeout_secs {
            self.execution.timeout_secs = timeout_secs;
        }
        if output_dir.is_some() {
            self.execution.output_dir = output_dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = FinderConfig::parse(
            r#"
[search]
config_dirs = ["surveillance/configs"]

[execution]
timeout_secs = 60
java_home = "/opt/jdk"
scratch_dir = "target/scratch"
"#,
        )
        .unwrap();

        assert_eq!(config.search.config_dirs, vec!["surveillance/configs"]);
        assert_eq!(config.search.test_dirs, SearchConfig::default().test_dirs);
        assert_eq!(config.search.related_score, 5.0);
        assert_eq!(config.execution.timeout_secs, 60);
        assert_eq!(config.execution.java_home, Some(PathBuf::from("/opt/jdk")));
        assert_eq!(config.execution.output_dir, None);
        assert_eq!(
            config.execution.scratch_dir,
            Some(PathBuf::from("target/scratch"))
        );
    }

    #[test]
    fn unknown_sections_and_bad_values_are_rejected() {
        assert!(FinderConfig::parse("[searhc]\nconfig_dirs = []\n").is_err());
        assert!(FinderConfig::parse("[execution]\ntimeout_secs = 0\n").is_err());
        assert!(FinderConfig::parse("[search]\nrelated_score = -2.0\n").is_err());
    }

    #[test]
    fn missing_default_file_means_defaults() {
        let dir = tempdir().unwrap();
        let config = FinderConfig::load(dir.path(), None).unwrap();
        assert_eq!(config, FinderConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(FinderConfig::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn project_file_is_picked_up_and_overridden() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[execution]\ntimeout_secs = 30\noutput_dir = \"out\"\n",
        )
        .unwrap();

        let config = FinderConfig::load(dir.path(), None)
            .unwrap()
            .with_overrides(Some(5), None);
        assert_eq!(config.execution.timeout_secs, 5);
        assert_eq!(config.execution.output_dir, Some(PathBuf::from("out")));
    }
}
