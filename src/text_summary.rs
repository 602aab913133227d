//! Text summary builder for CLI output.
//!
//! Formats shapes and per-label counts for text mode.

use crate::metrics;
use crate::model::SpacesReport;
use crate::spaces::ClassifiedSpace;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary from a finished report.
pub(crate) fn build_text_summary(report: &SpacesReport) -> TextSummary {
    let mut lines = Vec::new();

    lines.push(format!("Log: {}", report.log_path.display()));
    if let Some(run) = report.run.as_ref() {
        lines.push(run.to_message());
        if let Some(ms) = run.build_ms {
            lines.push(format!("Build: {:.1}s", ms as f64 / 1000.0));
        }
    }

    push_space(&mut lines, &report.cspace);
    push_space(&mut lines, &report.wspace);

    TextSummary { lines }
}

fn push_space(lines: &mut Vec<String>, space: &ClassifiedSpace) {
    lines.push(format!(
        "{} - Rows: {}, Columns: {}",
        space.kind.section_name(),
        space.grid.rows(),
        space.grid.cols()
    ));
    for share in metrics::label_shares(&space.points) {
        lines.push(format!(
            "  {:<10} {:>7} ({:.1}%)",
            share.label,
            share.count,
            share.share * 100.0
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OutcomeKind, RunSummary};
    use crate::spaces::{load_spaces, CodeTable};

    #[test]
    fn summary_lists_shapes_and_counts() {
        let log = "===CSPACE===\n00\n11\n===CSPACE===\n===WSPACE===\n01\n23\n===WSPACE===";
        let spaces = load_spaces(log, &CodeTable::cspace(), &CodeTable::wspace()).unwrap();
        let report = SpacesReport {
            timestamp_utc: "2026-01-01T00:00:00Z".into(),
            log_path: "pathfind.txt".into(),
            run: Some(RunSummary {
                outcome: OutcomeKind::Completed,
                elapsed_ms: 2_300,
                build_ms: Some(41_000),
            }),
            cspace: spaces.cspace,
            wspace: spaces.wspace,
        };

        let lines = build_text_summary(&report).lines;
        assert_eq!(lines[0], "Log: pathfind.txt");
        assert_eq!(lines[1], "Simulator completed in 2.3s");
        assert_eq!(lines[2], "Build: 41.0s");
        assert_eq!(lines[3], "CSPACE - Rows: 2, Columns: 2");
        assert_eq!(lines[4], "  theta0           2 (50.0%)");
        assert!(lines.contains(&"WSPACE - Rows: 2, Columns: 2".to_string()));
        assert!(lines.contains(&"  end              1 (25.0%)".to_string()));
    }
}
