use crate::toolchain::Toolchain;
use artifact_protocol::ExecutionRequest;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Entry point used when the project has no build tool
pub const JUNIT_RUNNER_CLASS: &str = "org.junit.runner.JUnitCore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTool {
    Maven,
    Gradle,
    Direct,
}

impl BuildTool {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Gradle => "gradle",
            Self::Direct => "direct",
        }
    }

    pub fn runner(self) -> &'static dyn TestRunner {
        match self {
            Self::Maven => &MavenRunner,
            Self::Gradle => &GradleRunner,
            Self::Direct => &DirectRunner,
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `pom.xml` selects Maven, `build.gradle(.kts)` selects Gradle, anything else runs java directly.
pub fn detect_build_tool(working_dir: &Path) -> BuildTool {
    if working_dir.join("pom.xml").is_file() {
        BuildTool::Maven
    } else if working_dir.join("build.gradle").is_file()
        || working_dir.join("build.gradle.kts").is_file()
    {
        BuildTool::Gradle
    } else {
        BuildTool::Direct
    }
}

/// A program and its arguments, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandLine {
    fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Turns an execution request into the command line of one build tool.
pub trait TestRunner: Send + Sync {
    fn command(&self, request: &ExecutionRequest, toolchain: &Toolchain) -> CommandLine;
}

pub struct MavenRunner;

impl TestRunner for MavenRunner {
    fn command(&self, request: &ExecutionRequest, toolchain: &Toolchain) -> CommandLine {
        let mut line = CommandLine::new(toolchain.maven());
        let target = match &request.method_name {
            Some(method) => format!("{}#{method}", request.class_name),
            None => request.class_name.clone(),
        };
        line.arg("test").arg(format!("-Dtest={target}"));
        push_properties(&mut line, request);
        line
    }
}

pub struct GradleRunner;

impl TestRunner for GradleRunner {
    fn command(&self, request: &ExecutionRequest, toolchain: &Toolchain) -> CommandLine {
        let mut line = CommandLine::new(toolchain.gradle());
        let target = match &request.method_name {
            Some(method) => format!("{}.{method}", request.class_name),
            None => request.class_name.clone(),
        };
        line.arg("test").arg("--tests").arg(target);
        push_properties(&mut line, request);
        line
    }
}

pub struct DirectRunner;

impl TestRunner for DirectRunner {
    fn command(&self, request: &ExecutionRequest, toolchain: &Toolchain) -> CommandLine {
        let mut line = CommandLine::new(toolchain.java());
        push_properties(&mut line, request);
        if !request.classpath.is_empty() {
            match std::env::join_paths(&request.classpath) {
                Ok(classpath) => {
                    line.arg("-cp").arg(classpath);
                }
                Err(err) => log::warn!("Ignoring classpath: {err}"),
            }
        }
        line.arg(JUNIT_RUNNER_CLASS).arg(request.class_name.as_str());
        line
    }
}

/// `-Dkey=value` for every system property, then every argument.
fn push_properties(line: &mut CommandLine, request: &ExecutionRequest) {
    for (key, value) in request.system_properties.iter().chain(&request.arguments) {
        line.arg(format!("-D{key}={value}"));
    }
}
