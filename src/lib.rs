//! Build, run and inspect the pathfinding simulator's configuration-space and workspace grids.
//!
//! The simulator prints two marker-bracketed grids (`===CSPACE===`, `===WSPACE===`) followed
//! by `===DONE===`. The orchestrator drives the build and the run, [`spaces`] turns the captured
//! log into classified grids, and the renderers present them.

pub mod cli;
pub mod error;
pub mod metrics;
pub mod model;
mod orchestrator;
pub mod spaces;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

pub use error::{ConfigError, SpacesError, SpacesResult};
