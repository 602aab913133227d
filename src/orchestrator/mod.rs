//! Application-level orchestration.
//!
//! This module owns the simulator lifecycle (build, spawn, completion polling, termination)
//! and post-run processing such as parsing the captured log and exports. CLI/TUI layers call
//! into this module to keep responsibilities separated.

mod controller;
mod post_process;
mod process;

pub(crate) use controller::run_pipeline;
pub(crate) use post_process::{export_json, load_report};
