use anyhow::{Context as AnyhowContext, Result};
use artifact_protocol::{serialize_json, serialize_json_pretty, CommandResponse};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
pub mod config;

pub use config::{FinderConfig, CONFIG_FILE_NAME};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "artifact-finder")]
#[command(about = "Find annotated report configs and tests, tweak their parameters, run them", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root to search and run in
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Config file (default: <project>/artifact-finder.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override [execution].timeout_secs
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Override [execution].output_dir
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Include full file text in artifact output
    #[arg(long, global = true)]
    content: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank configs and tests against search criteria
    Search(SearchArgs),

    /// List every artifact grouped by report type
    Catalog,

    /// Show what is extracted from one file
    Inspect(FileArgs),

    /// Tests that reference a config file by name
    Related(FileArgs),

    /// List runnable test classes
    Tests(TestsArgs),

    /// Show the @Parameter fields of a test source
    Params(FileArgs),

    /// Rewrite parameters of a test source and print the result (nothing is written)
    Inject(InjectArgs),

    /// Run a test class through the project's build tool
    Run(RunArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Keywords to look for in file text
    keywords: Vec<String>,

    #[arg(long)]
    report_type: Option<String>,

    #[arg(long)]
    domain: Option<String>,

    #[arg(long)]
    capability: Option<String>,

    /// Tag to match in metadata (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Also include tests that reference matched configs
    #[arg(long)]
    with_related: bool,

    /// Maximum number of results
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct TestsArgs {
    /// Keep classes whose name contains this text (case-insensitive)
    #[arg(long)]
    class: Option<String>,
}

#[derive(Args)]
struct FileArgs {
    /// File path, relative to the project root
    file: PathBuf,
}

#[derive(Args)]
struct InjectArgs {
    /// Java test source, relative to the project root
    file: PathBuf,

    /// Parameter to rewrite, as name=value (value parsed as JSON when possible)
    #[arg(long = "set", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

#[derive(Args)]
struct RunArgs {
    /// Fully qualified test class
    class: String,

    /// Single test method
    #[arg(long)]
    method: Option<String>,

    /// Test source to rewrite with --set before running
    #[arg(long)]
    source: Option<PathBuf>,

    /// Parameter to rewrite in --source, as name=value
    #[arg(long = "set", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// System property passed as -Dname=value
    #[arg(long = "prop", value_parser = parse_assignment)]
    props: Vec<(String, String)>,

    /// Test argument passed as -Dname=value
    #[arg(long = "arg", value_parser = parse_assignment)]
    args: Vec<(String, String)>,

    /// Extra classpath entry (repeatable)
    #[arg(long)]
    classpath: Vec<PathBuf>,

    /// Directory to run in (default: the project root)
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Print the command that would run without running it
    #[arg(long)]
    dry_run: bool,
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

pub async fn main_entry() -> ExitCode {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let pretty = cli.pretty;
    let response = match run(cli).await {
        Ok(response) => response,
        Err(err) => {
            log::error!("{err:#}");
            CommandResponse::error(format!("{err:#}"))
        }
    };

    let rendered = if pretty {
        serialize_json_pretty(&response)
    } else {
        serialize_json(&response)
    };
    let printed = rendered.and_then(|text| print_stdout(&text));
    if let Err(err) = printed {
        eprintln!("Failed to write output: {err:#}");
        return ExitCode::FAILURE;
    }

    if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> Result<CommandResponse> {
    let project = cli
        .project
        .canonicalize()
        .with_context(|| format!("Invalid project path {}", cli.project.display()))?;
    let config = FinderConfig::load(&project, cli.config.as_deref())?
        .with_overrides(cli.timeout_secs, cli.output_dir);
    let app = commands::App::new(project, config, cli.content);

    match cli.command {
        Commands::Search(args) => app.search(args),
        Commands::Catalog => app.catalog(),
        Commands::Inspect(args) => app.inspect(&args.file),
        Commands::Related(args) => app.related(&args.file),
        Commands::Tests(args) => app.tests(args.class.as_deref()),
        Commands::Params(args) => app.params(&args.file),
        Commands::Inject(args) => app.inject(&args.file, &args.set),
        Commands::Run(args) => app.run(args).await,
    }
}
