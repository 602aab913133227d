use crate::error::ConfigError;
use crate::spaces::{ClassifiedSpace, CodeTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

/// Literal the simulator prints once both spaces have been written.
pub const DONE_MARKER: &str = "===DONE===";

/// Everything one build/run/parse pass needs. Loaded from TOML, then overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Artifact produced by the build and launched as the simulator.
    pub executable: PathBuf,
    /// Combined stdout/stderr of the simulator; truncated on every run.
    pub log_path: PathBuf,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// How long to wait after a graceful stop request before killing the simulator.
    /// Never longer than `poll_interval`.
    #[serde(with = "humantime_serde")]
    pub terminate_grace: Duration,
    /// Parse whatever was captured even if the completion marker never arrived.
    pub continue_on_timeout: bool,
    pub skip_build: bool,
    pub build: BuildConfig,
    pub cspace_codes: CodeTable,
    pub wspace_codes: CodeTable,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("build/zephyr/zephyr.exe"),
            log_path: PathBuf::from("pathfind.txt"),
            poll_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
            terminate_grace: Duration::from_millis(500),
            continue_on_timeout: false,
            skip_build: false,
            build: BuildConfig::default(),
            cspace_codes: CodeTable::cspace(),
            wspace_codes: CodeTable::wspace(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }
}

/// West build invocation for the simulator target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub program: String,
    pub board: String,
    pub app_dir: PathBuf,
    /// Pass `-p` to force a clean rebuild.
    pub pristine: bool,
    pub extra_args: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: "west".into(),
            board: "native_sim".into(),
            app_dir: PathBuf::from("app"),
            pristine: true,
            extra_args: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Arguments after the program name, e.g. `build -p -b native_sim app`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        if self.pristine {
            args.push("-p".into());
        }
        args.push("-b".into());
        args.push(self.board.clone());
        args.push(self.app_dir.display().to_string());
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Successful build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub artifact: PathBuf,
    pub duration: Duration,
}

/// How a simulator run ended. Elapsed time is measured from spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The completion marker was observed.
    Completed { elapsed: Duration },
    /// The deadline passed before the marker appeared.
    TimedOut { elapsed: Duration },
    /// The process exited without printing the marker.
    ExitedEarly {
        elapsed: Duration,
        status: ExitStatus,
    },
}

impl ProcessOutcome {
    pub fn elapsed(&self) -> Duration {
        match *self {
            ProcessOutcome::Completed { elapsed }
            | ProcessOutcome::TimedOut { elapsed }
            | ProcessOutcome::ExitedEarly { elapsed, .. } => elapsed,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            ProcessOutcome::Completed { .. } => OutcomeKind::Completed,
            ProcessOutcome::TimedOut { .. } => OutcomeKind::TimedOut,
            ProcessOutcome::ExitedEarly { .. } => OutcomeKind::ExitedEarly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Completed,
    TimedOut,
    ExitedEarly,
}

/// Serializable summary of the orchestration stage.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcome: OutcomeKind,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_ms: Option<u64>,
}

impl RunSummary {
    pub fn new(outcome: &ProcessOutcome, build: Option<&BuildResult>) -> Self {
        Self {
            outcome: outcome.kind(),
            elapsed_ms: outcome.elapsed().as_millis() as u64,
            build_ms: build.map(|b| b.duration.as_millis() as u64),
        }
    }

    /// Render a one-line status for UI/CLI layers.
    pub fn to_message(&self) -> String {
        let secs = self.elapsed_ms as f64 / 1000.0;
        match self.outcome {
            OutcomeKind::Completed => format!("Simulator completed in {secs:.1}s"),
            OutcomeKind::TimedOut => format!("Simulator timed out after {secs:.1}s"),
            OutcomeKind::ExitedEarly => format!("Simulator exited early after {secs:.1}s"),
        }
    }
}

/// Final product of a pass: both classified spaces plus where they came from.
#[derive(Debug, Clone, Serialize)]
pub struct SpacesReport {
    pub timestamp_utc: String,
    pub log_path: PathBuf,
    /// Absent when an existing log was plotted without running the simulator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunSummary>,
    pub cspace: ClassifiedSpace,
    pub wspace: ClassifiedSpace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_west_pathfind() {
        let cfg = RunConfig::default();
        assert_eq!(
            cfg.build.args(),
            ["build", "-p", "-b", "native_sim", "app"]
        );
        assert_eq!(cfg.executable, PathBuf::from("build/zephyr/zephyr.exe"));
        assert_eq!(cfg.log_path, PathBuf::from("pathfind.txt"));
        assert_eq!(cfg.poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.timeout, Duration::from_secs(15));
        assert!(!cfg.continue_on_timeout);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: RunConfig = toml::from_str(
            r#"
            log_path = "out/log.txt"
            timeout = "30s"
            poll_interval = "250ms"

            [build]
            board = "qemu_x86"
            pristine = false

            [wspace_codes]
            0 = "free"
            1 = "wall"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.log_path, PathBuf::from("out/log.txt"));
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.build.args(), ["build", "-b", "qemu_x86", "app"]);
        assert_eq!(cfg.wspace_codes.label(1), Some("wall"));
        assert_eq!(cfg.cspace_codes, CodeTable::cspace());
        assert_eq!(cfg.terminate_grace, Duration::from_millis(500));
    }

    #[test]
    fn invalid_code_table_is_a_parse_error() {
        let err = toml::from_str::<RunConfig>("[cspace_codes]\n12 = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("single digit"));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = RunConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
        assert!(err.to_string().contains("missing.toml"));

        std::fs::write(&path, "timeout = 5").unwrap();
        let err = RunConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn run_summary_messages() {
        let summary = RunSummary::new(
            &ProcessOutcome::TimedOut {
                elapsed: Duration::from_millis(15_400),
            },
            None,
        );
        assert_eq!(summary.to_message(), "Simulator timed out after 15.4s");
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({ "outcome": "timed_out", "elapsed_ms": 15400 })
        );
    }
}
