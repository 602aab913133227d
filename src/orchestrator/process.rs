//! Simulator process control: build, spawn with captured output, poll for completion.

use crate::error::{SpacesError, SpacesResult};
use crate::model::{BuildConfig, BuildResult, ProcessOutcome, DONE_MARKER};
use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::Instant;

/// Lines of build stderr quoted in a build failure.
const BUILD_ERROR_TAIL: usize = 20;

/// The operations the poll loop needs from a running child.
pub(crate) trait ChildProcess {
    fn id(&self) -> Option<u32>;
    /// Non-blocking exit check.
    fn try_exit_status(&mut self) -> io::Result<Option<ExitStatus>>;
    /// Ask the process to stop (SIGTERM on Unix).
    fn request_terminate(&mut self) -> io::Result<()>;
    /// Forceful kill; does not wait.
    fn kill(&mut self) -> io::Result<()>;
    async fn wait(&mut self) -> io::Result<ExitStatus>;
}

impl ChildProcess for tokio::process::Child {
    fn id(&self) -> Option<u32> {
        tokio::process::Child::id(self)
    }

    fn try_exit_status(&mut self) -> io::Result<Option<ExitStatus>> {
        self.try_wait()
    }

    #[cfg(unix)]
    fn request_terminate(&mut self) -> io::Result<()> {
        // No pid means the child was already reaped.
        let Some(pid) = tokio::process::Child::id(self) else {
            return Ok(());
        };
        let pid = libc::pid_t::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
        // SAFETY: kill(2) has no memory-safety preconditions.
        if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn request_terminate(&mut self) -> io::Result<()> {
        self.start_kill()
    }

    fn kill(&mut self) -> io::Result<()> {
        self.start_kill()
    }

    async fn wait(&mut self) -> io::Result<ExitStatus> {
        tokio::process::Child::wait(self).await
    }
}

/// Parameters for one simulator run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CaptureParams<'a> {
    pub executable: &'a Path,
    pub log_path: &'a Path,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub terminate_grace: Duration,
}

/// Run the build tool and check that it produced `artifact`.
pub(crate) async fn build(cfg: &BuildConfig, artifact: &Path) -> SpacesResult<BuildResult> {
    run_build_command(&cfg.program, &cfg.args(), artifact).await
}

pub(crate) async fn run_build_command(
    program: &str,
    args: &[String],
    artifact: &Path,
) -> SpacesResult<BuildResult> {
    let command_line = format!("{program} {}", args.join(" "));
    tracing::info!(command = %command_line, "building simulator");
    let start = Instant::now();

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| SpacesError::Build {
            reason: format!("could not run `{command_line}`: {e}"),
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        tracing::debug!(target: "build", "{line}");
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        tracing::debug!(target: "build", "{line}");
    }

    if !output.status.success() {
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(BUILD_ERROR_TAIL)..].join("\n");
        return Err(SpacesError::Build {
            reason: format!("`{command_line}` exited with {}\n{tail}", output.status),
        });
    }

    if !artifact.is_file() {
        return Err(SpacesError::Build {
            reason: format!(
                "`{command_line}` succeeded but {} does not exist",
                artifact.display()
            ),
        });
    }

    let duration = start.elapsed();
    tracing::info!(artifact = %artifact.display(), ?duration, "build finished");
    Ok(BuildResult {
        artifact: artifact.to_path_buf(),
        duration,
    })
}

/// Spawn the simulator with stdout and stderr truncating into the log, then poll for the marker.
pub(crate) async fn run_and_capture(params: CaptureParams<'_>) -> SpacesResult<ProcessOutcome> {
    let log_context = || format!("open log {}", params.log_path.display());
    let stdout = File::create(params.log_path).map_err(|e| SpacesError::io(log_context(), e))?;
    let stderr = stdout
        .try_clone()
        .map_err(|e| SpacesError::io(log_context(), e))?;

    let mut child = Command::new(params.executable)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SpacesError::io(format!("spawn {}", params.executable.display()), e))?;
    let started = Instant::now();

    tracing::info!(
        pid = ?child.id(),
        executable = %params.executable.display(),
        log = %params.log_path.display(),
        "simulator started"
    );

    poll_for_marker(&mut child, params, started).await
}

/// Poll loop, separated from spawning so it runs against any `ChildProcess`.
///
/// Each round: marker check, then exit check, then deadline check, then sleep. The first
/// check happens before any sleep and no sleep runs past `started + timeout`. Stopping the
/// child waits at most one poll interval before killing it, so a `Completed` or `TimedOut`
/// result is returned no later than one interval after it is detected.
pub(crate) async fn poll_for_marker<C: ChildProcess>(
    child: &mut C,
    params: CaptureParams<'_>,
    started: Instant,
) -> SpacesResult<ProcessOutcome> {
    let deadline = started + params.timeout;
    let grace = params.terminate_grace.min(params.poll_interval);
    let mut polls = 0u64;

    loop {
        polls += 1;
        if log_has_marker(params.log_path)? {
            tracing::info!(elapsed = ?started.elapsed(), polls, "completion marker found");
            terminate(child, grace).await?;
            return Ok(ProcessOutcome::Completed {
                elapsed: started.elapsed(),
            });
        }

        let exited = child
            .try_exit_status()
            .map_err(|e| SpacesError::io("check simulator status", e))?;
        if let Some(status) = exited {
            let elapsed = started.elapsed();
            // The marker may have been flushed right before exit.
            if log_has_marker(params.log_path)? {
                tracing::info!(?elapsed, %status, "simulator finished after printing marker");
                return Ok(ProcessOutcome::Completed { elapsed });
            }
            tracing::warn!(?elapsed, %status, "simulator exited before completion marker");
            return Ok(ProcessOutcome::ExitedEarly { elapsed, status });
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(
                elapsed = ?(now - started),
                timeout = ?params.timeout,
                "simulator timed out, terminating"
            );
            terminate(child, grace).await?;
            return Ok(ProcessOutcome::TimedOut {
                elapsed: started.elapsed(),
            });
        }

        tracing::debug!(elapsed = ?(now - started), polls, "waiting for completion marker");
        tokio::time::sleep_until((now + params.poll_interval).min(deadline)).await;
    }
}

/// Re-read the whole log and look for the completion marker.
fn log_has_marker(log_path: &Path) -> SpacesResult<bool> {
    let bytes = std::fs::read(log_path)
        .map_err(|e| SpacesError::io(format!("read log {}", log_path.display()), e))?;
    // A partial write can end mid-character; lossy decoding keeps the search going.
    Ok(String::from_utf8_lossy(&bytes).contains(DONE_MARKER))
}

/// Stop the child: graceful request, bounded wait, then kill. Failures are returned.
pub(crate) async fn terminate<C: ChildProcess>(
    child: &mut C,
    grace: Duration,
) -> SpacesResult<ExitStatus> {
    let pid = child.id();
    let failed = |source| SpacesError::Terminate { pid, source };

    if let Some(status) = child.try_exit_status().map_err(failed)? {
        tracing::debug!(%status, "simulator already exited");
        return Ok(status);
    }

    match child.request_terminate() {
        Ok(()) => {
            match tokio::time::timeout(grace, child.wait()).await {
                Ok(waited) => {
                    let status = waited.map_err(failed)?;
                    tracing::info!(?pid, %status, "simulator terminated");
                    return Ok(status);
                }
                Err(_) => {
                    tracing::warn!(?pid, ?grace, "simulator ignored terminate request, killing");
                }
            }
        }
        Err(e) => {
            tracing::warn!(?pid, error = %e, "terminate request failed, killing");
        }
    }

    child.kill().map_err(failed)?;
    let status = child.wait().await.map_err(failed)?;
    tracing::info!(?pid, %status, "simulator killed");
    Ok(status)
}
