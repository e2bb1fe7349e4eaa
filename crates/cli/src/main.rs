//! pagegen CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: `.env` via `dotenvy`, then flags and environment
//!    variables via `clap`, then the optional rule-configuration file.
//! 2. **Wire observability**: `tracing-subscriber` with an `EnvFilter`, a
//!    pretty or JSON formatter, and an OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure**: `ChromeSnapshotSource`, `OpenAiProvider`,
//!    and `FileArtifactStore` with a terminal or always-yes confirmer, all
//!    injected into `PipelineExecutor`.
//! 4. **Run one target** in the selected mode and map the outcome to an exit
//!    code: 0 on success (including declined overwrites), 1 when the run
//!    fails, 2 for usage or configuration errors.

mod telemetry;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use browser::{ChromeConfig, ChromeSnapshotSource};
use clap::{Args, Parser, Subcommand};
use filestore::FileArtifactStore;
use llm::{OpenAiConfig, OpenAiProvider};
use nodes::{PipelineExecutor, SuiteMode};
use pipeline::{AlwaysConfirm, Confirmer, RuleConfiguration, RunReport};
use telemetry::LogFormat;
use terminal::TerminalConfirmer;
use tracing::{error, info};

/// Address used when none is given, matching the historical default.
const DEFAULT_ADDRESS: &str = "https://example.com/login";

const EXIT_RUN_FAILED: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "pagegen", version)]
#[command(about = "Generate Playwright page objects and test suites from live pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory under which `pages/` and `tests/` are written.
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// JSON file replacing the built-in rule configuration.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Overwrite existing files without asking.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// API key for the chat-completions service.
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, global = true, env = "OPENAI_BASE_URL", default_value = llm::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, global = true, env = "PAGEGEN_MODEL", default_value = llm::DEFAULT_MODEL)]
    model: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Snapshot the page, generate its page object, then its test suite.
    Generate {
        #[command(flatten)]
        target: TargetArgs,

        /// Seconds to wait for the page to finish loading.
        #[arg(long, default_value_t = browser::DEFAULT_NAVIGATION_TIMEOUT.as_secs())]
        navigation_timeout_secs: u64,
    },
    /// Regenerate only the test suite from the page object already on disk.
    Suite {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Page to generate for; must start with http:// or https://.
    #[arg(default_value = DEFAULT_ADDRESS)]
    url: String,

    /// Describe the tests to write instead of exercising every method.
    #[arg(long)]
    instruction: Option<String>,
}

impl TargetArgs {
    fn mode(&self) -> SuiteMode {
        match &self.instruction {
            Some(text) => SuiteMode::Instruction(text.clone()),
            None => SuiteMode::Capabilities,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: .env: {e}");
        }
    }

    let cli = Cli::parse();

    let _telemetry = match telemetry::init(cli.log_format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let executor = match build_executor(&cli) {
        Ok(executor) => executor,
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let outcome = match &cli.command {
        Commands::Generate { target, .. } => executor.run(&target.url, &target.mode()).await,
        Commands::Suite { target } => executor.run_suite_only(&target.url, &target.mode()).await,
    };

    match outcome {
        Ok(report) => {
            print_report(&report, cli.log_format);
            info!(run_id = %report.run_id, "run complete");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            print_report(&failure.report, cli.log_format);
            error!(run_id = %failure.report.run_id, error = %failure.error, "run failed");
            ExitCode::from(EXIT_RUN_FAILED)
        }
    }
}

fn build_executor(cli: &Cli) -> anyhow::Result<PipelineExecutor> {
    let rules = load_rules(cli.rules.as_deref())?;

    let generator = OpenAiProvider::new(OpenAiConfig {
        api_key: cli.api_key.clone(),
        base_url: cli.base_url.clone(),
        model: cli.model.clone(),
        ..OpenAiConfig::default()
    })
    .context("configuring generation client")?;

    let navigation_timeout = match &cli.command {
        Commands::Generate {
            navigation_timeout_secs,
            ..
        } => Duration::from_secs(*navigation_timeout_secs),
        Commands::Suite { .. } => browser::DEFAULT_NAVIGATION_TIMEOUT,
    };
    let snapshots = ChromeSnapshotSource::new(ChromeConfig {
        navigation_timeout,
        ..ChromeConfig::default()
    });

    let confirmer: Arc<dyn Confirmer> = if cli.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(TerminalConfirmer)
    };
    let store = FileArtifactStore::new(&cli.output_dir, confirmer);

    info!(
        output_dir = %store.root().display(),
        model = %cli.model,
        endpoint = %generator.endpoint(),
        "configuration loaded"
    );

    Ok(PipelineExecutor::new(
        Arc::new(snapshots),
        Arc::new(generator),
        Arc::new(store),
        Arc::new(rules),
    ))
}

fn load_rules(path: Option<&std::path::Path>) -> anyhow::Result<RuleConfiguration> {
    let Some(path) = path else {
        return Ok(RuleConfiguration::builtin()?);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading rules file {}", path.display()))?;
    RuleConfiguration::from_json(&json)
        .with_context(|| format!("parsing rules file {}", path.display()))
}

fn print_report(report: &RunReport, format: LogFormat) {
    if format == LogFormat::Json {
        match serde_json::to_string(report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("warning: could not serialize run report: {e}"),
        }
        return;
    }

    println!("run       {}", report.run_id);
    println!("started   {}", report.started_at);
    println!("target    {}", report.address);
    if let Some(page) = &report.page {
        println!("page      {page}");
    }
    if let Some(suite) = &report.suite {
        println!("suite     {suite}");
    }
    if !report.capabilities.is_empty() {
        let names: Vec<&str> = report.capabilities.iter().map(|n| n.as_str()).collect();
        println!("methods   {}", names.join(", "));
    }
}
