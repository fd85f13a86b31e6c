use crate::config::ExecutionConfig;
use crate::error::{ExecutorError, Result};
use crate::report::find_report;
use crate::runner::{detect_build_tool, CommandLine};
use crate::toolchain::Toolchain;
use artifact_extractor::extract_package;
use artifact_injector::{inject_with_report, ParameterValue};
use artifact_protocol::{duration_millis, ExecutionRequest, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Exit code reported when the process never produced one
pub const NO_EXIT_CODE: i32 = -1;

pub const TIMEOUT_MESSAGE: &str = "Execution timed out";

/// Result of running a rewritten copy of a test source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedExecution {
    pub result: ExecutionResult,
    pub modified_source: String,
    /// Requested names that matched no declaration
    pub unmatched: Vec<String>,
}

/// Runs one test target at a time through the build tool found in its working directory.
#[derive(Debug, Clone, Default)]
pub struct TestExecutor {
    toolchain: Toolchain,
    scratch_root: Option<PathBuf>,
}

impl TestExecutor {
    pub fn new(toolchain: Toolchain) -> Self {
        Self {
            toolchain,
            scratch_root: None,
        }
    }

    pub fn from_config(config: &ExecutionConfig) -> Result<Self> {
        config.validate().map_err(ExecutorError::InvalidConfig)?;
        let executor = Self::new(Toolchain::resolve(config));
        Ok(match &config.scratch_dir {
            Some(dir) => executor.scratch_in(dir),
            None => executor,
        })
    }

    /// Create scratch copies below `dir` instead of the system temp dir.
    pub fn scratch_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    /// The command `request` would run, without running it.
    pub fn plan(&self, request: &ExecutionRequest) -> CommandLine {
        detect_build_tool(&request.working_dir)
            .runner()
            .command(request, &self.toolchain)
    }

    /// Run the test once. Timeouts, spawn failures and non-zero exits come back as
    /// an unsuccessful result, never as an error.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let tool = detect_build_tool(&request.working_dir);
        let line = tool.runner().command(request, &self.toolchain);
        log::info!("Running {} via {tool}: {line}", request.target_label());

        let mut command = tokio::process::Command::new(&line.program);
        command
            .args(&line.args)
            .current_dir(&request.working_dir)
            .envs(self.toolchain.env_overrides(std::env::var_os("PATH")))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let started = Instant::now();
        let output = match timeout(request.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                let message = format!("Failed to start {}: {err}", line.program.display());
                log::warn!("{message}");
                return failure(message, started.elapsed());
            }
            Err(_) => {
                log::warn!(
                    "{} exceeded {}s and was killed",
                    request.target_label(),
                    request.timeout.as_secs_f64()
                );
                return ExecutionResult {
                    success: false,
                    exit_code: NO_EXIT_CODE,
                    stdout: String::new(),
                    stderr: TIMEOUT_MESSAGE.to_string(),
                    execution_time_ms: duration_millis(request.timeout),
                    report_path: None,
                    error_message: Some(TIMEOUT_MESSAGE.to_string()),
                };
            }
        };
        let elapsed = started.elapsed();

        let exit_code = output.status.code().unwrap_or(NO_EXIT_CODE);
        let report_path = find_report(&request.report_dir());
        log::info!(
            "{} finished with exit code {exit_code} in {}ms",
            request.target_label(),
            elapsed.as_millis()
        );

        ExecutionResult {
            success: output.status.success(),
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            execution_time_ms: duration_millis(elapsed),
            report_path,
            error_message: None,
        }
    }

    /// Rewrite `source_path` with `modifications` into a scratch directory, put that
    /// directory on the classpath, and run. The scratch directory is removed on every path.
    pub async fn execute_with_modifications(
        &self,
        source_path: &Path,
        modifications: &BTreeMap<String, ParameterValue>,
        request: &ExecutionRequest,
    ) -> Result<ModifiedExecution> {
        let original =
            fs::read_to_string(source_path).map_err(|err| ExecutorError::io(source_path, err))?;
        let injection = inject_with_report(&original, modifications)?;
        for name in &injection.unmatched {
            log::warn!(
                "Parameter `{name}` matched no declaration in {}",
                source_path.display()
            );
        }

        let scratch_root = self
            .scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let scratch = tempfile::Builder::new()
            .prefix("artifact-finder-")
            .tempdir_in(&scratch_root)
            .map_err(|err| ExecutorError::io(&scratch_root, err))?;
        let target = scratch.path().join(scratch_relative_path(
            source_path,
            &injection.source,
            &request.working_dir,
        ));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| ExecutorError::io(parent, err))?;
        }
        fs::write(&target, &injection.source).map_err(|err| ExecutorError::io(&target, err))?;
        log::debug!("Wrote modified source to {}", target.display());

        let adjusted = request.clone().classpath_entry(scratch.path());
        let result = self.execute(&adjusted).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(err) = scratch.close() {
            log::warn!("Failed to remove {}: {err}", scratch_path.display());
        }

        Ok(ModifiedExecution {
            result,
            modified_source: injection.source,
            unmatched: injection.unmatched,
        })
    }
}

fn failure(message: String, elapsed: Duration) -> ExecutionResult {
    ExecutionResult {
        success: false,
        exit_code: NO_EXIT_CODE,
        stdout: String::new(),
        stderr: message.clone(),
        execution_time_ms: duration_millis(elapsed),
        report_path: None,
        error_message: Some(message),
    }
}

/// Where the rewritten file goes inside the scratch directory: its package
/// directories when it declares one, else its path below `working_dir`, else its name.
fn scratch_relative_path(source_path: &Path, source: &str, working_dir: &Path) -> PathBuf {
    let file_name = source_path
        .file_name()
        .map_or_else(|| PathBuf::from("Source.java"), PathBuf::from);

    if let Some(package) = extract_package(source) {
        return package.split('.').collect::<PathBuf>().join(file_name);
    }
    source_path
        .strip_prefix(working_dir)
        .map(Path::to_path_buf)
        .unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scratch_layout_follows_package() {
        let path = scratch_relative_path(
            Path::new("/repo/src/test/java/com/x/WashTradeTest.java"),
            "package com.x;\npublic class WashTradeTest {}",
            Path::new("/elsewhere"),
        );
        assert_eq!(path, PathBuf::from("com/x/WashTradeTest.java"));
    }

    #[test]
    fn scratch_layout_without_package() {
        let source = "public class T {}";
        assert_eq!(
            scratch_relative_path(Path::new("/repo/tests/T.java"), source, Path::new("/repo")),
            PathBuf::from("tests/T.java")
        );
        assert_eq!(
            scratch_relative_path(Path::new("/other/T.java"), source, Path::new("/repo")),
            PathBuf::from("T.java")
        );
    }

    #[tokio::test]
    async fn missing_binary_is_a_failed_result() {
        let dir = tempfile::tempdir().unwrap();
        let executor = TestExecutor::new(Toolchain {
            java_home: Some(dir.path().join("no-such-jdk")),
            ..Toolchain::default()
        });
        let request = ExecutionRequest::new("com.x.T", dir.path());

        let result = executor.execute(&request).await;
        assert!(!result.success);
        assert_eq!(result.exit_code, NO_EXIT_CODE);
        assert!(result
            .error_message
            .as_deref()
            .is_some_and(|message| message.starts_with("Failed to start")));
    }
}
