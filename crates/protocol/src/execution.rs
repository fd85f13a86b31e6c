use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything needed to run one named test. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub class_name: String,
    #[serde(default)]
    pub method_name: Option<String>,
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
    #[serde(default)]
    pub system_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub classpath: Vec<PathBuf>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
    /// Where reports are searched for; the working directory when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl ExecutionRequest {
    pub fn new(class_name: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: None,
            arguments: BTreeMap::new(),
            system_properties: BTreeMap::new(),
            classpath: Vec::new(),
            working_dir: working_dir.into(),
            timeout: DEFAULT_TIMEOUT,
            output_dir: None,
        }
    }

    #[must_use]
    pub fn method(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn system_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.system_properties.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn classpath_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.classpath.push(entry.into());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    /// Output directory resolved against the working directory.
    pub fn report_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => self.working_dir.join(dir),
            None => self.working_dir.clone(),
        }
    }

    /// `Class` or `Class#method`, for log lines.
    pub fn target_label(&self) -> String {
        match &self.method_name {
            Some(method) => format!("{}#{method}", self.class_name),
            None => self.class_name.clone(),
        }
    }
}

/// Outcome of exactly one pipeline run; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub execution_time_ms: u64,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
    #[serde(default)]
    pub error_message: Option<String>,
}

pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn report_dir_falls_back_to_working_dir() {
        let request = ExecutionRequest::new("FooTest", "/work");
        assert_eq!(request.report_dir(), Path::new("/work"));

        let request = request.output_dir("reports");
        assert_eq!(request.report_dir(), Path::new("/work/reports"));

        let request = request.output_dir("/var/reports");
        assert_eq!(request.report_dir(), Path::new("/var/reports"));
    }

    #[test]
    fn target_label_includes_method() {
        let request = ExecutionRequest::new("com.x.FooTest", ".").method("testRun");
        assert_eq!(request.target_label(), "com.x.FooTest#testRun");
    }
}
