use crate::model::{RunConfig, SpacesReport};
use crate::orchestrator;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "pathfind-spaces",
    version,
    about = "Build and run the pathfinding simulator, then plot its CSPACE and WSPACE grids"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build the simulator, run it until it prints ===DONE===, then plot both spaces
    Run {
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Plot the spaces from an existing log without building or running anything
    Plot {
        /// Log file to read (default: configured log path)
        #[arg(long)]
        log: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the default configuration as TOML
    ExampleConfig,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// Build tool to invoke
    #[arg(long)]
    pub build_program: Option<String>,

    /// Board passed to the build with -b
    #[arg(long)]
    pub board: Option<String>,

    /// Application directory to build
    #[arg(long)]
    pub app_dir: Option<PathBuf>,

    /// Reuse the previous build directory instead of a pristine build
    #[arg(long)]
    pub no_pristine: bool,

    /// Simulator executable produced by the build
    #[arg(long)]
    pub executable: Option<PathBuf>,

    /// File that captures the simulator's stdout and stderr
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// How often the log is re-read for the completion marker
    #[arg(long)]
    pub poll_interval: Option<humantime::Duration>,

    /// Give up if the completion marker has not appeared after this long
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Grace period between the stop request and a kill (at most --poll-interval)
    #[arg(long)]
    pub terminate_grace: Option<humantime::Duration>,

    /// Run the existing executable without building
    #[arg(long)]
    pub skip_build: bool,

    /// Parse the log even if the simulator timed out
    #[arg(long)]
    pub continue_on_timeout: bool,
}

#[derive(Debug, Args, Clone, Default)]
pub struct OutputArgs {
    /// Print the classified spaces as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    let base = load_base_config(args.config.as_deref())?;

    match args.command {
        Command::ExampleConfig => {
            let example = toml::to_string_pretty(&RunConfig::default())
                .context("serialize default configuration")?;
            print_lines([example.trim_end().to_string()])
        }
        Command::Run { run, output } => {
            let cfg = build_config(base, &run);
            tracing::debug!(?cfg, "run configuration");
            let report = orchestrator::run_pipeline(&cfg).await?;
            present(report, &output).await
        }
        Command::Plot { log, output } => {
            let mut cfg = base;
            if let Some(log) = log {
                cfg.log_path = log;
            }
            let report = orchestrator::load_report(&cfg, None)?;
            present(report, &output).await
        }
    }
}

/// Configuration file if given, otherwise built-in defaults.
fn load_base_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(p) => RunConfig::from_file(p).context("load configuration"),
        None => Ok(RunConfig::default()),
    }
}

/// Apply CLI overrides on top of the file/default configuration.
pub fn build_config(mut cfg: RunConfig, args: &RunArgs) -> RunConfig {
    if let Some(program) = args.build_program.as_ref() {
        cfg.build.program = program.clone();
    }
    if let Some(board) = args.board.as_ref() {
        cfg.build.board = board.clone();
    }
    if let Some(app_dir) = args.app_dir.as_ref() {
        cfg.build.app_dir = app_dir.clone();
    }
    if args.no_pristine {
        cfg.build.pristine = false;
    }
    if let Some(executable) = args.executable.as_ref() {
        cfg.executable = executable.clone();
    }
    if let Some(log) = args.log.as_ref() {
        cfg.log_path = log.clone();
    }
    if let Some(d) = args.poll_interval {
        cfg.poll_interval = d.into();
    }
    if let Some(d) = args.timeout {
        cfg.timeout = d.into();
    }
    if let Some(d) = args.terminate_grace {
        cfg.terminate_grace = d.into();
    }
    cfg.skip_build |= args.skip_build;
    cfg.continue_on_timeout |= args.continue_on_timeout;
    cfg
}

/// Hand the report to the selected renderer.
async fn present(report: SpacesReport, output: &OutputArgs) -> Result<()> {
    if let Some(p) = output.export_json.as_deref() {
        orchestrator::export_json(p, &report)?;
        tracing::info!(path = %p.display(), "exported JSON");
    }

    if output.json {
        let out = serde_json::to_string_pretty(&report)?;
        return print_lines([out]);
    }

    if !output.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(report).await;
        }
    }

    let summary = crate::text_summary::build_text_summary(&report);
    print_lines(summary.lines)
}

fn print_lines(lines: impl IntoIterator<Item = String>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = std::io::LineWriter::new(stdout.lock());
    for line in lines {
        writeln!(out, "{line}").context("write to stdout")?;
    }
    out.flush().context("flush stdout")?;
    Ok(())
}
