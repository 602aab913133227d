//! Log → grid → classified points pipeline.
//!
//! Pure functions over borrowed text; safe to call from any thread on independent inputs.

pub mod classify;
pub mod grid;
pub mod section;

pub use classify::{classify, ClassifiedPoints, CodeTable, Coord, LabelPoints};
pub use grid::{parse, Grid};
pub use section::{extract, Section};

use crate::error::{SpacesError, SpacesResult};
use serde::{Deserialize, Serialize};

/// Which grid a section holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    Configuration,
    Workspace,
}

impl SpaceKind {
    pub fn section_name(self) -> &'static str {
        match self {
            SpaceKind::Configuration => "CSPACE",
            SpaceKind::Workspace => "WSPACE",
        }
    }

    /// Axis titles for plotting, `(x, y)`.
    pub fn axis_titles(self) -> (&'static str, &'static str) {
        match self {
            SpaceKind::Configuration => ("θ0", "θ1"),
            SpaceKind::Workspace => ("X", "Y"),
        }
    }
}

/// One grid and its classification.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedSpace {
    pub kind: SpaceKind,
    #[serde(skip)]
    pub grid: Grid,
    pub points: ClassifiedPoints,
}

/// Both spaces from one log.
#[derive(Debug, Clone, Serialize)]
pub struct Spaces {
    pub cspace: ClassifiedSpace,
    pub wspace: ClassifiedSpace,
}

/// Extract, parse and classify one space. Errors name the section.
pub fn load_space(
    content: &str,
    kind: SpaceKind,
    table: &CodeTable,
) -> SpacesResult<ClassifiedSpace> {
    let name = kind.section_name();
    let section = extract(content, name).ok_or_else(|| SpacesError::MissingSection {
        section: name.to_string(),
    })?;
    let grid = parse(section.body).map_err(|e| e.in_section(name))?;
    let points = classify(&grid, table).map_err(|e| e.in_section(name))?;
    tracing::debug!(
        section = name,
        rows = grid.rows(),
        cols = grid.cols(),
        "classified grid"
    );
    Ok(ClassifiedSpace { kind, grid, points })
}

/// Load both spaces from raw log text.
pub fn load_spaces(
    content: &str,
    cspace: &CodeTable,
    wspace: &CodeTable,
) -> SpacesResult<Spaces> {
    Ok(Spaces {
        cspace: load_space(content, SpaceKind::Configuration, cspace)?,
        wspace: load_space(content, SpaceKind::Workspace, wspace)?,
    })
}
