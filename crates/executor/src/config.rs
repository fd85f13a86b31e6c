use artifact_protocol::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// `[execution]` settings; installation paths fall back to the environment when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Wall-clock bound for one test run
    pub timeout_secs: u64,

    /// Where reports are looked for, relative to the working directory.
    /// The working directory itself when unset.
    pub output_dir: Option<PathBuf>,

    /// Parent of the per-run scratch copies; the system temp dir when unset
    pub scratch_dir: Option<PathBuf>,

    pub java_home: Option<PathBuf>,
    pub maven_home: Option<PathBuf>,
    pub gradle_home: Option<PathBuf>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            output_dir: None,
            scratch_dir: None,
            java_home: None,
            maven_home: None,
            gradle_home: None,
        }
    }
}

impl ExecutionConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five_minutes() {
        let config = ExecutionConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = ExecutionConfig {
            timeout_secs: 0,
            ..ExecutionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
