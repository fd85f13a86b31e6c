#![cfg(unix)]

use artifact_executor::{TestExecutor, Toolchain, JUNIT_RUNNER_CLASS, NO_EXIT_CODE};
use artifact_injector::ParameterValue;
use artifact_protocol::{ExecutionRequest, ExecutionResult};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tempfile::{tempdir, TempDir};

/// Installs `<home>/bin/<name>` as a shell script standing in for a real tool.
fn fake_tool(home: &Path, name: &str, body: &str) -> PathBuf {
    let bin = home.join("bin");
    fs::create_dir_all(&bin).unwrap();
    let path = bin.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

struct Sandbox {
    _temp: TempDir,
    home: PathBuf,
    work: PathBuf,
}

fn sandbox() -> Sandbox {
    let temp = tempdir().unwrap();
    let home = temp.path().join("tools");
    let work = temp.path().join("project");
    fs::create_dir_all(&work).unwrap();
    Sandbox {
        _temp: temp,
        home,
        work,
    }
}

fn java_executor(home: &Path) -> TestExecutor {
    TestExecutor::new(Toolchain {
        java_home: Some(home.to_path_buf()),
        ..Toolchain::default()
    })
}

#[tokio::test]
async fn direct_run_uses_junit_runner_and_jdk_env() {
    let sb = sandbox();
    fake_tool(&sb.home, "java", r#"echo "args: $*"; echo "home: $JAVA_HOME""#);

    let request = ExecutionRequest::new("com.x.WashTradeTest", &sb.work)
        .system_property("env", "uat")
        .classpath_entry("lib/a.jar");
    let result = java_executor(&sb.home).execute(&request).await;

    assert!(result.success, "stderr: {}", result.stderr);
    assert_eq!(result.exit_code, 0);
    assert_eq!(
        result.stdout,
        format!(
            "args: -Denv=uat -cp lib/a.jar {JUNIT_RUNNER_CLASS} com.x.WashTradeTest\nhome: {}\n",
            sb.home.display()
        )
    );
    assert_eq!(result.error_message, None);
}

#[tokio::test]
async fn maven_project_runs_mvn_with_method_filter() {
    let sb = sandbox();
    fs::write(sb.work.join("pom.xml"), "<project/>").unwrap();
    fake_tool(&sb.home, "mvn", r#"echo "$*""#);

    let executor = TestExecutor::new(Toolchain {
        maven_home: Some(sb.home.clone()),
        ..Toolchain::default()
    });
    let request = ExecutionRequest::new("com.x.WashTradeTest", &sb.work).method("testWash");
    let result = executor.execute(&request).await;

    assert!(result.success);
    assert_eq!(result.stdout.trim(), "test -Dtest=com.x.WashTradeTest#testWash");
}

#[tokio::test]
async fn non_zero_exit_is_reported_not_raised() {
    let sb = sandbox();
    fake_tool(&sb.home, "java", "echo 'assertion failed' >&2; exit 3");

    let request = ExecutionRequest::new("T", &sb.work);
    let result = java_executor(&sb.home).execute(&request).await;

    assert!(!result.success);
    assert_eq!(result.exit_code, 3);
    assert_eq!(result.stderr.trim(), "assertion failed");
    assert_eq!(result.error_message, None);
}

#[tokio::test]
async fn slow_process_times_out() {
    let sb = sandbox();
    fake_tool(&sb.home, "java", "exec sleep 5");

    let request = ExecutionRequest::new("T", &sb.work).timeout(Duration::from_secs(1));
    let started = Instant::now();
    let result = java_executor(&sb.home).execute(&request).await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(!result.success);
    assert_eq!(result.exit_code, NO_EXIT_CODE);
    assert_eq!(result.execution_time_ms, 1000);
    assert!(result
        .error_message
        .as_deref()
        .is_some_and(|message| message.contains("timed out")));
    assert_eq!(result.report_path, None);
}

#[tokio::test]
async fn newest_report_in_output_dir_is_returned() {
    let sb = sandbox();
    let reports = sb.work.join("reports");
    fs::create_dir_all(&reports).unwrap();
    let old = reports.join("old_report.csv");
    fs::write(&old, "a,b").unwrap();
    File::options()
        .write(true)
        .open(&old)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(3600))
        .unwrap();
    fake_tool(&sb.home, "java", "echo 'c,d' > reports/new_report.csv");

    let request = ExecutionRequest::new("T", &sb.work).output_dir("reports");
    let result = java_executor(&sb.home).execute(&request).await;

    assert!(result.success);
    assert_eq!(result.report_path, Some(reports.join("new_report.csv")));
}

#[tokio::test]
async fn modified_source_runs_from_scratch_dir_and_is_cleaned_up() {
    let sb = sandbox();
    let source_dir = sb.work.join("src/test/java/com/x");
    fs::create_dir_all(&source_dir).unwrap();
    let source_path = source_dir.join("WashTradeTest.java");
    fs::write(
        &source_path,
        "package com.x;\n\npublic class WashTradeTest {\n    @Parameter(\"startDate\")\n    private String startDate = \"2024-01-01\";\n}\n",
    )
    .unwrap();
    fake_tool(
        &sb.home,
        "java",
        r#"while [ "$#" -gt 0 ]; do
  if [ "$1" = "-cp" ]; then cp="$2"; fi
  shift
done
echo "$cp"
cat "$cp/com/x/WashTradeTest.java""#,
    );

    let mods = BTreeMap::from([
        ("startDate".to_string(), ParameterValue::from("2025-06-01")),
        ("noSuchField".to_string(), ParameterValue::from(1)),
    ]);
    let request = ExecutionRequest::new("com.x.WashTradeTest", &sb.work);
    let outcome = java_executor(&sb.home)
        .execute_with_modifications(&source_path, &mods, &request)
        .await
        .unwrap();

    assert!(outcome.result.success, "stderr: {}", outcome.result.stderr);
    assert_eq!(outcome.unmatched, vec!["noSuchField".to_string()]);
    assert!(outcome
        .modified_source
        .contains("private String startDate = \"2025-06-01\";"));

    let mut lines = outcome.result.stdout.lines();
    let scratch = PathBuf::from(lines.next().unwrap());
    assert!(!scratch.exists(), "scratch dir left behind: {}", scratch.display());
    let printed: Vec<&str> = lines.collect();
    assert_eq!(printed.join("\n"), outcome.modified_source.trim_end());

    let on_disk = fs::read_to_string(&source_path).unwrap();
    assert!(on_disk.contains("\"2024-01-01\""));
}

const PARAMETERIZED: &str = "package com.x;\n\npublic class WashTradeTest {\n    @Parameter(\"minTradeCount\")\n    private int minTradeCount = 3;\n}\n";

/// Runs a rewritten copy of `PARAMETERIZED` with scratch copies kept below `scratch`,
/// asserting the run failed and nothing is left in `scratch` afterwards.
async fn assert_scratch_removed_after_failure(
    sb: &Sandbox,
    executor: TestExecutor,
    request: ExecutionRequest,
) -> ExecutionResult {
    let scratch = sb.work.join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    let source_path = sb.work.join("WashTradeTest.java");
    fs::write(&source_path, PARAMETERIZED).unwrap();

    let mods = BTreeMap::from([("minTradeCount".to_string(), ParameterValue::from(10))]);
    let outcome = executor
        .scratch_in(&scratch)
        .execute_with_modifications(&source_path, &mods, &request)
        .await
        .unwrap();

    assert!(!outcome.result.success);
    let leftovers: Vec<PathBuf> = fs::read_dir(&scratch)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(leftovers, Vec::<PathBuf>::new());
    outcome.result
}

#[tokio::test]
async fn scratch_dir_is_removed_when_the_tool_is_missing() {
    let sb = sandbox();
    let request = ExecutionRequest::new("com.x.WashTradeTest", &sb.work);

    let result = assert_scratch_removed_after_failure(&sb, java_executor(&sb.home), request).await;
    assert_eq!(result.exit_code, NO_EXIT_CODE);
    assert!(result.error_message.is_some());
}

#[tokio::test]
async fn scratch_dir_is_removed_after_a_timeout() {
    let sb = sandbox();
    fake_tool(&sb.home, "java", "exec sleep 5");
    let request =
        ExecutionRequest::new("com.x.WashTradeTest", &sb.work).timeout(Duration::from_secs(1));

    let result = assert_scratch_removed_after_failure(&sb, java_executor(&sb.home), request).await;
    assert_eq!(result.exit_code, NO_EXIT_CODE);
    assert_eq!(result.execution_time_ms, 1000);
}

#[tokio::test]
async fn scratch_dir_is_removed_after_a_failing_run() {
    let sb = sandbox();
    fake_tool(&sb.home, "java", "exit 1");
    let request = ExecutionRequest::new("com.x.WashTradeTest", &sb.work);

    let result = assert_scratch_removed_after_failure(&sb, java_executor(&sb.home), request).await;
    assert_eq!(result.exit_code, 1);
}

#[tokio::test]
async fn unreadable_source_is_an_error() {
    let sb = sandbox();
    let request = ExecutionRequest::new("T", &sb.work);
    let result = java_executor(&sb.home)
        .execute_with_modifications(&sb.work.join("Missing.java"), &BTreeMap::new(), &request)
        .await;
    assert!(result.is_err());
}
