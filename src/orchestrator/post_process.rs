//! Post-run processing utilities.
//!
//! Turns a captured log into a report and handles exports.

use crate::model::{RunConfig, RunSummary, SpacesReport};
use crate::spaces::load_spaces;
use anyhow::{Context, Result};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Parse and classify both spaces from the configured log.
pub(crate) fn load_report(cfg: &RunConfig, run: Option<RunSummary>) -> Result<SpacesReport> {
    let bytes = std::fs::read(&cfg.log_path)
        .with_context(|| format!("read log {}", cfg.log_path.display()))?;
    // Stray non-UTF-8 bytes become U+FFFD and surface as malformed rows if inside a section.
    let content = String::from_utf8_lossy(&bytes);

    let spaces = load_spaces(&content, &cfg.cspace_codes, &cfg.wspace_codes)
        .with_context(|| format!("parse {}", cfg.log_path.display()))?;

    tracing::info!(
        cspace_rows = spaces.cspace.grid.rows(),
        cspace_cols = spaces.cspace.grid.cols(),
        wspace_rows = spaces.wspace.grid.rows(),
        wspace_cols = spaces.wspace.grid.cols(),
        "spaces loaded"
    );

    Ok(SpacesReport {
        timestamp_utc: rfc3339(OffsetDateTime::now_utc())?,
        log_path: cfg.log_path.clone(),
        run,
        cspace: spaces.cspace,
        wspace: spaces.wspace,
    })
}

fn rfc3339(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339).context("format report timestamp")
}

/// Write the report as pretty JSON.
pub(crate) fn export_json(path: &Path, report: &SpacesReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
