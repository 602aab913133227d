use anyhow::{Context, Result};
use clap::Parser;
use pathfind_spaces::cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("install log subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    setup_logging(args.verbose)?;
    cli::run(args).await
}
