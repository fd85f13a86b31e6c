use crate::config::FinderConfig;
use crate::{RunArgs, SearchArgs};
use anyhow::{bail, Context, Result};
use artifact_executor::{detect_build_tool, BuildTool, TestExecutor};
use artifact_injector::{extract_parameters, inject_with_report, ParameterValue};
use artifact_protocol::{
    ArtifactMatch, CommandResponse, ExecutionRequest, ExecutionResult, SearchCriteria,
};
use artifact_search::ArtifactSearch;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct SearchOutput {
    criteria: SearchCriteria,
    total: usize,
    matches: Vec<ArtifactMatch>,
}

#[derive(Serialize)]
struct RelatedOutput {
    config: ArtifactMatch,
    tests: Vec<ArtifactMatch>,
}

#[derive(Serialize)]
struct PlanOutput {
    build_tool: BuildTool,
    command: String,
    working_dir: PathBuf,
}

#[derive(Serialize)]
struct RunOutput {
    build_tool: BuildTool,
    result: ExecutionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified_source: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unmatched: Vec<String>,
}

pub(crate) struct App {
    project: PathBuf,
    config: FinderConfig,
    include_content: bool,
}

impl App {
    pub(crate) fn new(project: PathBuf, config: FinderConfig, include_content: bool) -> Self {
        Self {
            project,
            config,
            include_content,
        }
    }

    fn engine(&self) -> Result<ArtifactSearch> {
        ArtifactSearch::new(&self.project, self.config.search.clone())
            .context("Failed to set up search")
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project.join(path)
        }
    }

    fn trim(&self, mut artifact: ArtifactMatch) -> ArtifactMatch {
        if !self.include_content {
            artifact.content.clear();
        }
        artifact
    }

    fn trim_all(&self, artifacts: Vec<ArtifactMatch>) -> Vec<ArtifactMatch> {
        artifacts.into_iter().map(|artifact| self.trim(artifact)).collect()
    }

    fn read_source(&self, file: &Path) -> Result<String> {
        let path = self.resolve(file);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub(crate) fn search(&self, args: SearchArgs) -> Result<CommandResponse> {
        let mut criteria = SearchCriteria::new().keywords(args.keywords).tags(args.tags);
        criteria.report_type = args.report_type;
        criteria.domain = args.domain;
        criteria.capability = args.capability;

        let engine = self.engine()?;
        let mut matches = if args.with_related {
            engine.search_with_related(&criteria)
        } else {
            engine.search(&criteria)
        };
        let total = matches.len();
        if let Some(limit) = args.limit {
            matches.truncate(limit);
        }

        let mut response = CommandResponse::ok(&SearchOutput {
            criteria: criteria.clone(),
            total,
            matches: self.trim_all(matches),
        })?;
        if criteria.is_empty() {
            response = response.with_hint("No criteria given; use `catalog` to list everything");
        }
        Ok(response)
    }

    pub(crate) fn catalog(&self) -> Result<CommandResponse> {
        let catalog: BTreeMap<String, Vec<ArtifactMatch>> = self
            .engine()?
            .catalog()
            .into_iter()
            .map(|(report_type, group)| (report_type, self.trim_all(group)))
            .collect();
        CommandResponse::ok(&catalog)
    }

    pub(crate) fn inspect(&self, file: &Path) -> Result<CommandResponse> {
        let artifact = self.engine()?.inspect(file)?;
        CommandResponse::ok(&self.trim(artifact))
    }

    pub(crate) fn related(&self, file: &Path) -> Result<CommandResponse> {
        let engine = self.engine()?;
        let config = engine.inspect(file)?;
        let tests = engine.related_tests(&config);
        CommandResponse::ok(&RelatedOutput {
            config: self.trim(config),
            tests: self.trim_all(tests),
        })
    }

    pub(crate) fn tests(&self, class_filter: Option<&str>) -> Result<CommandResponse> {
        CommandResponse::ok(&self.engine()?.list_tests(class_filter))
    }

    pub(crate) fn params(&self, file: &Path) -> Result<CommandResponse> {
        let source = self.read_source(file)?;
        CommandResponse::ok(&extract_parameters(&source))
    }

    pub(crate) fn inject(&self, file: &Path, set: &[(String, String)]) -> Result<CommandResponse> {
        let source = self.read_source(file)?;
        let report = inject_with_report(&source, &modifications(set))?;
        let mut response = CommandResponse::ok(&report)?;
        if !report.unmatched.is_empty() {
            response = response.with_hint(format!(
                "No declaration found for: {}",
                report.unmatched.join(", ")
            ));
        }
        Ok(response)
    }

    pub(crate) async fn run(&self, args: RunArgs) -> Result<CommandResponse> {
        let working_dir = args
            .working_dir
            .as_deref()
            .map_or_else(|| self.project.clone(), |dir| self.resolve(dir));

        let mut request = ExecutionRequest::new(args.class, &working_dir)
            .timeout(self.config.execution.timeout());
        if let Some(method) = args.method {
            request = request.method(method);
        }
        if let Some(output_dir) = &self.config.execution.output_dir {
            request = request.output_dir(output_dir);
        }
        for (key, value) in args.props {
            request = request.system_property(key, value);
        }
        for (key, value) in args.args {
            request = request.argument(key, value);
        }
        for entry in args.classpath {
            request = request.classpath_entry(entry);
        }

        let mut execution = self.config.execution.clone();
        execution.scratch_dir = execution.scratch_dir.map(|dir| self.resolve(&dir));
        let executor = TestExecutor::from_config(&execution)?;
        let build_tool = detect_build_tool(&working_dir);

        if args.dry_run {
            return CommandResponse::ok(&PlanOutput {
                build_tool,
                command: executor.plan(&request).to_string(),
                working_dir,
            });
        }

        let output = match args.source {
            Some(source) => {
                let outcome = executor
                    .execute_with_modifications(
                        &self.resolve(&source),
                        &modifications(&args.set),
                        &request,
                    )
                    .await?;
                RunOutput {
                    build_tool,
                    result: outcome.result,
                    modified_source: Some(outcome.modified_source),
                    unmatched: outcome.unmatched,
                }
            }
            None if !args.set.is_empty() => bail!("--set requires --source"),
            None => RunOutput {
                build_tool,
                result: executor.execute(&request).await,
                modified_source: None,
                unmatched: Vec::new(),
            },
        };

        CommandResponse::ok(&output)
    }
}

/// `name=value` pairs as typed values: JSON when the text parses as JSON, plain text otherwise.
fn modifications(set: &[(String, String)]) -> BTreeMap<String, ParameterValue> {
    set.iter()
        .map(|(name, raw)| (name.clone(), parameter_value(raw)))
        .collect()
}

fn parameter_value(raw: &str) -> ParameterValue {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(ParameterValue::from)
        .unwrap_or_else(|_| ParameterValue::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_are_typed_when_they_look_like_json() {
        assert_eq!(parameter_value("42"), ParameterValue::Integer(42));
        assert_eq!(parameter_value("true"), ParameterValue::Bool(true));
        assert_eq!(parameter_value("null"), ParameterValue::Null);
        assert_eq!(
            parameter_value(r#"["AAPL","MSFT"]"#),
            ParameterValue::from(vec!["AAPL", "MSFT"])
        );
        assert_eq!(
            parameter_value("2025-06-01"),
            ParameterValue::Text("2025-06-01".into())
        );
        assert_eq!(parameter_value(r#""007""#), ParameterValue::Text("007".into()));
    }
}
