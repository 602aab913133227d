use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::metrics::{self, LabelShare};
use crate::spaces::ClassifiedSpace;

/// Colours indexed by cell code, so a code keeps its colour in both spaces.
const CODE_COLORS: [Color; 10] = [
    Color::Blue,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::LightRed,
    Color::LightGreen,
    Color::LightBlue,
    Color::White,
];

pub fn code_color(code: u8) -> Color {
    CODE_COLORS[code as usize % CODE_COLORS.len()]
}

/// Scatter points per label as `(x, y) = (col, row)`, with legend name and colour.
fn label_series(space: &ClassifiedSpace) -> Vec<(String, Color, Vec<(f64, f64)>)> {
    space
        .points
        .labels
        .iter()
        .map(|entry| {
            let data = entry
                .points
                .iter()
                .map(|&(row, col)| (col as f64, row as f64))
                .collect();
            (
                format!("{} ({})", entry.label, entry.points.len()),
                code_color(entry.code),
                data,
            )
        })
        .collect()
}

/// Render one classified space as a scatter chart with label shares inside the same bordered box.
pub fn render_space_chart(f: &mut Frame, area: Rect, space: &ClassifiedSpace) {
    // Get inner area (accounting for borders)
    let inner = if area.width > 2 && area.height > 2 {
        Rect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        }
    } else {
        area
    };

    let chart_metrics = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)].as_ref())
        .split(inner);

    let series = label_series(space);
    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(name, color, data)| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(*color))
                .data(data)
        })
        .collect();

    let (rows, cols) = space.grid.shape();
    let (x_title, y_title) = space.kind.axis_titles();
    let x_axis = Axis::default()
        .title(x_title)
        .style(Style::default().fg(Color::Gray))
        .bounds(metrics::axis_bounds(cols))
        .labels(["0".to_string(), cols.saturating_sub(1).to_string()]);
    let y_axis = Axis::default()
        .title(y_title)
        .style(Style::default().fg(Color::Gray))
        .bounds(metrics::axis_bounds(rows))
        .labels(["0".to_string(), rows.saturating_sub(1).to_string()]);

    f.render_widget(
        Chart::new(datasets).x_axis(x_axis).y_axis(y_axis),
        chart_metrics[0],
    );

    let shares = metrics::label_shares(&space.points);
    let codes: Vec<u8> = space.points.labels.iter().map(|e| e.code).collect();
    f.render_widget(
        Paragraph::new(render_shares_text(&shares, &codes)).alignment(Alignment::Center),
        chart_metrics[1],
    );

    let title = Line::from(vec![
        Span::raw(format!("{} ", space.kind.section_name())),
        Span::styled(format!("{rows}×{cols}"), Style::default().fg(Color::Gray)),
    ]);
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(block, area);
}

/// One line of `label share%` pairs, each share in its label's colour.
fn render_shares_text<'a>(shares: &[LabelShare], codes: &[u8]) -> Line<'a> {
    let mut spans = Vec::new();
    for (share, &code) in shares.iter().zip(codes) {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            share.label.clone(),
            Style::default().fg(Color::Gray),
        ));
        spans.push(Span::styled(
            format!(" {:.1}%", share.share * 100.0),
            Style::default().fg(code_color(code)),
        ));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{load_space, CodeTable, SpaceKind};

    #[test]
    fn series_use_column_as_x() {
        let log = "===WSPACE===\n01\n23\n===WSPACE===";
        let space = load_space(log, SpaceKind::Workspace, &CodeTable::wspace()).unwrap();
        let series = label_series(&space);
        assert_eq!(series.len(), 4);
        assert_eq!(series[1].0, "occupied (1)");
        assert_eq!(series[1].1, Color::Red);
        assert_eq!(series[1].2, vec![(1.0, 0.0)]);
        assert_eq!(series[2].2, vec![(0.0, 1.0)]);
    }

    #[test]
    fn renders_into_test_backend() {
        use ratatui::{backend::TestBackend, Terminal};

        let log = "===CSPACE===\n0124\n1100\n===CSPACE===";
        let space = load_space(log, SpaceKind::Configuration, &CodeTable::cspace()).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| render_space_chart(f, f.area(), &space))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let top: String = (0..60u16)
            .map(|x| buffer[(x, 0u16)].symbol().to_string())
            .collect();
        assert!(top.contains("CSPACE"));
    }
}
