//! Rectangular grids of single-digit cell codes.

use crate::error::{SpacesError, SpacesResult};
use serde::Serialize;
use std::fmt;

/// Immutable `rows × cols` grid of cell codes. Always non-empty and rectangular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    #[serde(skip)]
    cells: Vec<u8>,
}

impl Grid {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    /// Iterate `(row, col, code)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &code)| (i / cols, i % cols, code))
    }

    pub fn row(&self, row: usize) -> Option<&[u8]> {
        if row >= self.rows {
            return None;
        }
        Some(&self.cells[row * self.cols..(row + 1) * self.cols])
    }
}

/// Serializes back to the digit-per-cell text the simulator prints.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r > 0 {
                writeln!(f)?;
            }
            for &code in &self.cells[r * self.cols..(r + 1) * self.cols] {
                write!(f, "{code}")?;
            }
        }
        Ok(())
    }
}

/// Parse section text into a grid.
///
/// Rows are split on line breaks after trimming the whole text. A trailing `\r` on a row
/// is dropped so CRLF logs parse. Nothing is padded or truncated: a non-digit is
/// `MalformedRow`, a short or long row is `RaggedGrid`, no rows at all is `EmptyGrid`.
pub fn parse(section_text: &str) -> SpacesResult<Grid> {
    let text = section_text.trim();
    if text.is_empty() {
        return Err(SpacesError::EmptyGrid);
    }

    let mut cells = Vec::with_capacity(text.len());
    let mut cols = None;
    let mut rows = 0;

    for (row, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut width = 0;
        for (column, ch) in line.chars().enumerate() {
            let code = ch.to_digit(10).ok_or(SpacesError::MalformedRow {
                row,
                column,
                character: ch,
            })?;
            cells.push(code as u8);
            width += 1;
        }

        let expected = *cols.get_or_insert(width);
        if width != expected {
            return Err(SpacesError::RaggedGrid {
                row,
                expected,
                actual: width,
            });
        }
        rows += 1;
    }

    let cols = cols.unwrap_or(0);
    if cols == 0 {
        return Err(SpacesError::EmptyGrid);
    }

    Ok(Grid { rows, cols, cells })
}
