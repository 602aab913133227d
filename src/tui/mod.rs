mod charts;

use crate::model::{OutcomeKind, SpacesReport};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use std::{io, time::Duration};

/// Show both spaces side by side until the user quits.
pub async fn run(report: SpacesReport) -> Result<()> {
    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    tokio::task::spawn_blocking(move || run_threaded(&report))
        .await
        .map_err(|_| anyhow::anyhow!("TUI thread panicked"))?
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(report: &SpacesReport) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let res = match Terminal::new(backend).context("create terminal") {
        Ok(mut terminal) => {
            terminal.clear().ok();
            event_loop(&mut terminal, report)
        }
        Err(e) => Err(e),
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    report: &SpacesReport,
) -> Result<()> {
    loop {
        terminal
            .draw(|f| draw(f.area(), f, report))
            .context("draw frame")?;

        // Poll input with a short timeout so resizes are redrawn.
        if !event::poll(Duration::from_millis(250)).unwrap_or(false) {
            continue;
        }
        if let Ok(Event::Key(k)) = event::read() {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            match (k.modifiers, k.code) {
                (_, KeyCode::Char('q'))
                | (_, KeyCode::Esc)
                | (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(()),
                _ => {}
            }
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, report: &SpacesReport) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)].as_ref())
        .split(area);

    let spaces = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(main[0]);

    charts::render_space_chart(f, spaces[0], &report.cspace);
    charts::render_space_chart(f, spaces[1], &report.wspace);

    let mut status = vec![Span::raw(format!("Log: {}", report.log_path.display()))];
    if let Some(run) = report.run.as_ref() {
        status.push(Span::raw("  "));
        status.push(Span::styled(
            run.to_message(),
            Style::default().fg(outcome_color(run.outcome)),
        ));
    }
    status.push(Span::raw("  "));
    status.push(Span::styled("q", Style::default().fg(Color::Yellow)));
    status.push(Span::raw(" quit"));

    f.render_widget(
        Paragraph::new(Line::from(status))
            .block(Block::default().borders(Borders::ALL).title("Status")),
        main[1],
    );
}

/// Status colour for a run outcome. Timed-out runs only get here with `--continue-on-timeout`.
fn outcome_color(kind: OutcomeKind) -> Color {
    match kind {
        OutcomeKind::Completed => Color::Green,
        OutcomeKind::TimedOut => Color::Yellow,
        OutcomeKind::ExitedEarly => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunSummary;
    use crate::spaces::{load_spaces, CodeTable};
    use ratatui::backend::TestBackend;

    fn report(outcome: OutcomeKind) -> SpacesReport {
        let log = "===CSPACE===\n01\n===CSPACE===\n===WSPACE===\n01\n===WSPACE===";
        let spaces = load_spaces(log, &CodeTable::cspace(), &CodeTable::wspace()).unwrap();
        SpacesReport {
            timestamp_utc: "2026-10-16T12:00:00Z".into(),
            log_path: "pathfind.txt".into(),
            run: Some(RunSummary {
                outcome,
                elapsed_ms: 15_000,
                build_ms: None,
            }),
            cspace: spaces.cspace,
            wspace: spaces.wspace,
        }
    }

    /// Foreground colour of the first cell of `needle` on the status row.
    fn status_color(report: &SpacesReport, needle: &str) -> Option<Color> {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f.area(), f, report)).unwrap();
        let buffer = terminal.backend().buffer();
        let row = 22u16;
        let line: String = (0..100u16)
            .map(|x| buffer[(x, row)].symbol().to_string())
            .collect();
        let col = line[..line.find(needle)?].chars().count() as u16;
        Some(buffer[(col, row)].fg)
    }

    #[test]
    fn status_colour_follows_outcome() {
        let timed_out = report(OutcomeKind::TimedOut);
        assert_eq!(
            status_color(&timed_out, "Simulator timed out"),
            Some(Color::Yellow)
        );
        let completed = report(OutcomeKind::Completed);
        assert_eq!(
            status_color(&completed, "Simulator completed"),
            Some(Color::Green)
        );
    }
}
