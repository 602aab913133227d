//! Partitioning grid cells into labelled coordinate sets.

use super::grid::Grid;
use crate::error::{SpacesError, SpacesResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// `(row, col)` of a grid cell.
pub type Coord = (usize, usize);

/// Maps cell codes to labels for one kind of space.
///
/// Codes are single digits and labels are unique and non-empty. Deserializes from a
/// string-keyed map (`"0" = "clear"`) so it can live in a TOML table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct CodeTable {
    entries: BTreeMap<u8, String>,
}

impl CodeTable {
    /// Build a table, rejecting codes above 9 and empty or duplicate labels.
    pub fn new<L: Into<String>>(
        entries: impl IntoIterator<Item = (u8, L)>,
    ) -> Result<Self, String> {
        let mut map = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for (code, label) in entries {
            let label = label.into();
            if code > 9 {
                return Err(format!("code {code} is not a single digit"));
            }
            if label.trim().is_empty() {
                return Err(format!("code {code} has an empty label"));
            }
            if !seen.insert(label.clone()) {
                return Err(format!("label {label:?} is used by more than one code"));
            }
            if map.insert(code, label).is_some() {
                return Err(format!("code {code} is listed twice"));
            }
        }
        if map.is_empty() {
            return Err("table has no codes".into());
        }
        Ok(Self { entries: map })
    }

    /// Richest configuration-space table: free/colliding joint pairs plus start and path.
    pub fn cspace() -> Self {
        Self::from_static(&[(0, "theta0"), (1, "theta1"), (2, "start"), (4, "path")])
    }

    /// Earliest configuration-space table, before start and path markers existed.
    pub fn cspace_two_code() -> Self {
        Self::from_static(&[(0, "theta0"), (1, "theta1")])
    }

    pub fn wspace() -> Self {
        Self::from_static(&[(0, "clear"), (1, "occupied"), (2, "start"), (3, "end")])
    }

    fn from_static(entries: &[(u8, &'static str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|&(code, label)| (code, label.to_string()))
                .collect(),
        }
    }

    pub fn label(&self, code: u8) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    /// `(code, label)` in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.entries.iter().map(|(&code, label)| (code, label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for CodeTable {
    type Error = String;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut entries = Vec::with_capacity(raw.len());
        for (key, label) in raw {
            let code = key
                .trim()
                .parse::<u8>()
                .map_err(|_| format!("code {key:?} is not a single digit"))?;
            entries.push((code, label));
        }
        CodeTable::new(entries)
    }
}

impl From<CodeTable> for BTreeMap<String, String> {
    fn from(table: CodeTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(code, label)| (code.to_string(), label))
            .collect()
    }
}

/// Coordinates carrying one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelPoints {
    pub code: u8,
    pub label: String,
    pub points: BTreeSet<Coord>,
}

/// Cells of one grid partitioned by label. Every label of the table is present, in code order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedPoints {
    pub rows: usize,
    pub cols: usize,
    pub labels: Vec<LabelPoints>,
}

impl ClassifiedPoints {
    pub fn get(&self, label: &str) -> Option<&BTreeSet<Coord>> {
        self.labels
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| &entry.points)
    }

    /// Points of `label` as plot coordinates `(x, y) = (col, row)`.
    pub fn get_xy(&self, label: &str) -> Option<BTreeSet<Coord>> {
        self.get(label)
            .map(|points| points.iter().map(|&(row, col)| (col, row)).collect())
    }

    pub fn total_points(&self) -> usize {
        self.labels.iter().map(|entry| entry.points.len()).sum()
    }
}

/// Collect every cell's coordinate under the label of its code.
///
/// Fails with `UnknownCode` on the first cell (row-major) whose code is not in `table`.
pub fn classify(grid: &Grid, table: &CodeTable) -> SpacesResult<ClassifiedPoints> {
    let mut by_code: BTreeMap<u8, BTreeSet<Coord>> =
        table.iter().map(|(code, _)| (code, BTreeSet::new())).collect();

    for (row, col, code) in grid.cells() {
        match by_code.get_mut(&code) {
            Some(points) => {
                points.insert((row, col));
            }
            None => return Err(SpacesError::UnknownCode { code, row, col }),
        }
    }

    let labels = table
        .iter()
        .map(|(code, label)| LabelPoints {
            code,
            label: label.to_string(),
            points: by_code.remove(&code).unwrap_or_default(),
        })
        .collect();

    Ok(ClassifiedPoints {
        rows: grid.rows(),
        cols: grid.cols(),
        labels,
    })
}
