//! Error types for the build/run/parse pipeline.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort the pipeline. Each names the stage and input location that failed.
#[derive(Debug, Error)]
pub enum SpacesError {
    /// The build tool could not be started or exited unsuccessfully.
    #[error("build failed: {reason}")]
    Build { reason: String },

    /// The completion marker never appeared before the deadline.
    #[error("simulator did not print the completion marker within {timeout:?} (log: {log})")]
    ProcessTimeout { timeout: Duration, log: PathBuf },

    /// The child exited on its own before printing the completion marker.
    #[error("simulator exited early with {status} after {elapsed:?} (log: {log})")]
    ProcessExitedEarly {
        status: ExitStatus,
        elapsed: Duration,
        log: PathBuf,
    },

    /// Termination was requested but could not be confirmed.
    #[error("failed to terminate simulator (pid {pid:?}): {source}")]
    Terminate {
        pid: Option<u32>,
        #[source]
        source: std::io::Error,
    },

    /// A required `===NAME===` section is missing or not closed.
    #[error("section {section} not found: expected two `==={section}===` markers")]
    MissingSection { section: String },

    /// The section body contains no rows.
    #[error("grid is empty")]
    EmptyGrid,

    /// A row contains something other than a single decimal digit.
    #[error("row {row}: invalid character {character:?} at column {column}")]
    MalformedRow {
        row: usize,
        column: usize,
        character: char,
    },

    /// A row differs in length from the first row.
    #[error("row {row}: expected {expected} cells, found {actual}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A cell code has no label in the code table.
    #[error("unknown cell code {code} at ({row}, {col})")]
    UnknownCode { code: u8, row: usize, col: usize },

    /// A grid error wrapped with the section it came from.
    #[error("{section}: {source}")]
    InSection {
        section: String,
        #[source]
        source: Box<SpacesError>,
    },

    /// IO error on the log or artifact.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl SpacesError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Attach the section name to a parse or classification error.
    pub(crate) fn in_section(self, section: &str) -> Self {
        Self::InSection {
            section: section.to_string(),
            source: Box::new(self),
        }
    }

    /// Strip any section wrapper, for matching on the underlying cause.
    pub fn root(&self) -> &SpacesError {
        match self {
            Self::InSection { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for pipeline operations.
pub type SpacesResult<T> = std::result::Result<T, SpacesError>;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
