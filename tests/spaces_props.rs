//! Property-based tests for log sections, grid parsing and classification.
//!
//! Run with: cargo test --test spaces_props

use pathfind_spaces::spaces::{classify, extract, parse, section, CodeTable};
use pathfind_spaces::SpacesError;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// Strategies
// =============================================================================

/// Rows of digit codes with a fixed width, drawn from `codes`.
fn arb_grid_rows(codes: Vec<u8>) -> impl Strategy<Value = Vec<Vec<u8>>> {
    (1usize..=12, 1usize..=12).prop_flat_map(move |(rows, cols)| {
        let cell = prop::sample::select(codes.clone());
        prop::collection::vec(prop::collection::vec(cell, cols), rows)
    })
}

fn render(rows: &[Vec<u8>], line_end: &str) -> String {
    rows.iter()
        .map(|row| row.iter().map(|code| code.to_string()).collect::<String>())
        .collect::<Vec<_>>()
        .join(line_end)
}

/// Filler text that cannot form a marker on its own.
fn arb_filler() -> impl Strategy<Value = String> {
    "[a-z0-9 \t\r\n]{0,16}"
}

/// Log text with 0 to 3 `===CSPACE===` markers between filler chunks.
fn arb_marked_log() -> impl Strategy<Value = (Vec<String>, String)> {
    prop::collection::vec(arb_filler(), 1..=4).prop_map(|chunks| {
        let content = chunks.join(&section::marker("CSPACE"));
        (chunks, content)
    })
}

fn table_codes(table: &CodeTable) -> Vec<u8> {
    table.iter().map(|(code, _)| code).collect()
}

// =============================================================================
// Grid parsing
// =============================================================================

proptest! {
    #[test]
    fn parse_keeps_shape_and_round_trips(rows in arb_grid_rows((0..=9).collect())) {
        let text = render(&rows, "\n");
        let grid = parse(&text).unwrap();

        prop_assert_eq!(grid.shape(), (rows.len(), rows[0].len()));
        for (r, row) in rows.iter().enumerate() {
            for (c, &code) in row.iter().enumerate() {
                prop_assert_eq!(grid.get(r, c), Some(code));
            }
        }
        prop_assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn crlf_and_lf_parse_to_the_same_grid(rows in arb_grid_rows((0..=9).collect())) {
        let lf = parse(&render(&rows, "\n")).unwrap();
        let crlf = parse(&render(&rows, "\r\n")).unwrap();
        prop_assert_eq!(lf, crlf);
    }

    #[test]
    fn surrounding_whitespace_is_ignored(
        rows in arb_grid_rows((0..=9).collect()),
        lead in "[ \t\n]{0,4}",
        trail in "[ \t\n]{0,4}",
    ) {
        let text = render(&rows, "\n");
        let padded = format!("{lead}{text}{trail}");
        prop_assert_eq!(parse(&padded).unwrap().to_string(), text);
    }
}

// =============================================================================
// Section extraction
// =============================================================================

proptest! {
    #[test]
    fn extract_is_total(content in any::<String>()) {
        let marker = section::marker("CSPACE");
        let found = extract(&content, "CSPACE");
        prop_assert_eq!(found.is_some(), content.matches(&marker).count() >= 2);
        if let Some(section) = found {
            prop_assert_eq!(section.body, section.body.trim());
        }
    }

    #[test]
    fn extract_returns_text_between_first_two_markers((chunks, content) in arb_marked_log()) {
        let markers = chunks.len() - 1;
        match extract(&content, "CSPACE") {
            Some(section) => {
                prop_assert!(markers >= 2);
                prop_assert_eq!(section.name, "CSPACE");
                prop_assert_eq!(section.body, chunks[1].trim());
            }
            None => prop_assert!(markers < 2),
        }
    }
}

// =============================================================================
// Classification
// =============================================================================

proptest! {
    #[test]
    fn classify_partitions_cspace_grids(rows in arb_grid_rows(table_codes(&CodeTable::cspace()))) {
        check_partition(&rows, &CodeTable::cspace())?;
    }

    #[test]
    fn classify_partitions_wspace_grids(rows in arb_grid_rows(table_codes(&CodeTable::wspace()))) {
        check_partition(&rows, &CodeTable::wspace())?;
    }

    #[test]
    fn first_unknown_code_is_reported(rows in arb_grid_rows((0..=9).collect())) {
        let table = CodeTable::wspace();
        let grid = parse(&render(&rows, "\n")).unwrap();
        let first_unknown = grid.cells().find(|&(_, _, code)| table.label(code).is_none());

        match (classify(&grid, &table), first_unknown) {
            (Ok(points), None) => {
                prop_assert_eq!(points.total_points(), rows.len() * rows[0].len());
            }
            (Err(SpacesError::UnknownCode { code, row, col }), Some(expected)) => {
                prop_assert_eq!((row, col, code), expected);
            }
            (other, expected) => {
                prop_assert!(false, "got {:?}, first unknown cell {:?}", other, expected);
            }
        }
    }
}

fn check_partition(rows: &[Vec<u8>], table: &CodeTable) -> Result<(), TestCaseError> {
    let grid = parse(&render(rows, "\n")).unwrap();
    let points = classify(&grid, table).unwrap();

    prop_assert_eq!(points.labels.len(), table.len());
    let mut seen = BTreeSet::new();
    for entry in &points.labels {
        prop_assert_eq!(table.label(entry.code), Some(entry.label.as_str()));
        for &(r, c) in &entry.points {
            prop_assert!(seen.insert((r, c)), "({}, {}) listed twice", r, c);
            prop_assert_eq!(grid.get(r, c), Some(entry.code));
        }
    }
    prop_assert_eq!(seen.len(), grid.rows() * grid.cols());
    Ok(())
}
