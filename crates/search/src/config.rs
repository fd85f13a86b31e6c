use serde::{Deserialize, Serialize};

/// Score assigned to test files that literally mention a config's file stem.
pub const DEFAULT_RELATED_SCORE: f64 = 5.0;

/// Which directories are searched, relative to the project root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Roots holding `.yml` / `.yaml` structured configs
    pub config_dirs: Vec<String>,

    /// Roots holding `*Test*.java` source tests
    pub test_dirs: Vec<String>,

    /// Fixed score for "directly referenced" test files
    pub related_score: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            config_dirs: vec!["configs".into(), "config".into(), "yml".into()],
            test_dirs: vec!["src/test".into(), "test".into(), "tests".into()],
            related_score: DEFAULT_RELATED_SCORE,
        }
    }
}

impl SearchConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.related_score.is_finite() || self.related_score <= 0.0 {
            return Err(format!(
                "related_score must be a positive number (got {})",
                self.related_score
            ));
        }

        let blank = self
            .config_dirs
            .iter()
            .chain(&self.test_dirs)
            .any(|dir| dir.trim().is_empty());
        if blank {
            return Err("search directories must not be blank".to_string());
        }

        Ok(())
    }
}
