//! Run lifecycle controller.
//!
//! Sequences build → run → outcome check → parse and stops at the first fatal stage.

use super::post_process::load_report;
use super::process::{self, CaptureParams};
use crate::error::{SpacesError, SpacesResult};
use crate::model::{ProcessOutcome, RunConfig, RunSummary, SpacesReport};
use anyhow::{Context, Result};

/// Build the simulator, run it until it reports completion, then classify its output.
pub(crate) async fn run_pipeline(cfg: &RunConfig) -> Result<SpacesReport> {
    let build = if cfg.skip_build {
        tracing::info!(artifact = %cfg.executable.display(), "skipping build");
        None
    } else {
        Some(
            process::build(&cfg.build, &cfg.executable)
                .await
                .context("build stage failed")?,
        )
    };

    let outcome = process::run_and_capture(CaptureParams {
        executable: &cfg.executable,
        log_path: &cfg.log_path,
        poll_interval: cfg.poll_interval,
        timeout: cfg.timeout,
        terminate_grace: cfg.terminate_grace,
    })
    .await
    .context("run stage failed")?;

    check_outcome(&outcome, cfg).context("run stage failed")?;

    let summary = RunSummary::new(&outcome, build.as_ref());
    tracing::info!("{}", summary.to_message());
    load_report(cfg, Some(summary)).context("parse stage failed")
}

/// Decide whether the captured log is safe to parse.
///
/// A timeout is fatal unless `continue_on_timeout` is set; an early exit is always fatal.
pub(crate) fn check_outcome(outcome: &ProcessOutcome, cfg: &RunConfig) -> SpacesResult<()> {
    match *outcome {
        ProcessOutcome::Completed { .. } => Ok(()),
        ProcessOutcome::TimedOut { elapsed } if cfg.continue_on_timeout => {
            tracing::warn!(
                ?elapsed,
                log = %cfg.log_path.display(),
                "no completion marker; parsing possibly incomplete log"
            );
            Ok(())
        }
        ProcessOutcome::TimedOut { .. } => Err(SpacesError::ProcessTimeout {
            timeout: cfg.timeout,
            log: cfg.log_path.clone(),
        }),
        ProcessOutcome::ExitedEarly { elapsed, status } => Err(SpacesError::ProcessExitedEarly {
            status,
            elapsed,
            log: cfg.log_path.clone(),
        }),
    }
}
