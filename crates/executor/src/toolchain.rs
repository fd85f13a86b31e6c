use crate::config::ExecutionConfig;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const JAVA_HOME_VAR: &str = "JAVA_HOME";
pub const MAVEN_HOME_VAR: &str = "MAVEN_HOME";
pub const GRADLE_HOME_VAR: &str = "GRADLE_HOME";

/// Installation directories of the external tools, resolved once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    pub java_home: Option<PathBuf>,
    pub maven_home: Option<PathBuf>,
    pub gradle_home: Option<PathBuf>,
}

impl Toolchain {
    /// Explicit config values first, then `JAVA_HOME` / `MAVEN_HOME` / `GRADLE_HOME`.
    pub fn resolve(config: &ExecutionConfig) -> Self {
        Self::resolve_with(config, |name| std::env::var_os(name))
    }

    pub fn resolve_with(config: &ExecutionConfig, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let pick = |explicit: &Option<PathBuf>, var: &str| {
            explicit.clone().or_else(|| {
                lookup(var)
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
        };

        Self {
            java_home: pick(&config.java_home, JAVA_HOME_VAR),
            maven_home: pick(&config.maven_home, MAVEN_HOME_VAR),
            gradle_home: pick(&config.gradle_home, GRADLE_HOME_VAR),
        }
    }

    pub fn java(&self) -> PathBuf {
        binary(self.java_home.as_deref(), "java")
    }

    pub fn maven(&self) -> PathBuf {
        binary(self.maven_home.as_deref(), "mvn")
    }

    pub fn gradle(&self) -> PathBuf {
        binary(self.gradle_home.as_deref(), "gradle")
    }

    /// `(name, value)` pairs to set on the child: `JAVA_HOME` and a `PATH`
    /// with the JDK's `bin` first. Empty when no JDK is configured.
    pub fn env_overrides(&self, current_path: Option<OsString>) -> Vec<(&'static str, OsString)> {
        let Some(java_home) = &self.java_home else {
            return Vec::new();
        };

        let mut entries = vec![java_home.join("bin")];
        if let Some(current) = &current_path {
            entries.extend(std::env::split_paths(current));
        }
        let path = std::env::join_paths(entries)
            .unwrap_or_else(|_| java_home.join("bin").into_os_string());

        vec![
            (JAVA_HOME_VAR, java_home.clone().into_os_string()),
            ("PATH", path),
        ]
    }
}

/// `<home>/bin/<name>`, or the bare name to be found on `PATH`.
fn binary(home: Option<&Path>, name: &str) -> PathBuf {
    home.map_or_else(|| PathBuf::from(name), |home| home.join("bin").join(name))
}
