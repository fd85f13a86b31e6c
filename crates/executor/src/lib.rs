//! # Artifact Executor
//!
//! Runs a named test through whichever build tool governs its working
//! directory, bounded by a timeout, then looks for the report it produced.
//!
//! ```text
//! ExecutionRequest ─> detect_build_tool(working_dir)
//!                         ├─ pom.xml                  → mvn test -Dtest=C#m -Dk=v
//!                         ├─ build.gradle(.kts)       → gradle test --tests C.m -Dk=v
//!                         └─ (none)                   → java -Dk=v -cp … JUnitCore C
//!                  ─> spawn (timeout, kill on expiry) ─> newest report under output dir
//!                  ─> ExecutionResult
//! ```
//!
//! `execute_with_modifications` puts an injected copy of the source in a
//! scratch directory that lives only for the duration of the run.

mod config;
mod error;
mod executor;
mod report;
mod runner;
mod toolchain;

pub use config::ExecutionConfig;
pub use error::{ExecutorError, Result};
pub use executor::{ModifiedExecution, TestExecutor, NO_EXIT_CODE, TIMEOUT_MESSAGE};
pub use report::{find_report, is_report_name, REPORT_PATTERNS};
pub use runner::{
    detect_build_tool, BuildTool, CommandLine, DirectRunner, GradleRunner, MavenRunner,
    TestRunner, JUNIT_RUNNER_CLASS,
};
pub use toolchain::{Toolchain, GRADLE_HOME_VAR, JAVA_HOME_VAR, MAVEN_HOME_VAR};
