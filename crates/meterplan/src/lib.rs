//! Command-line front end for the meterplan simulation library
//!
//! Runs single scenarios, sensitivity sweeps, batch exports of preset
//! combinations and the canonical regression check. Scenario files are YAML
//! or JSON serializations of [`meterplan_core::config::ScenarioSpec`].

pub mod commands;
pub mod logging;
pub mod report;
pub mod scenario_file;
pub mod util;

pub use commands::{Command, execute};
pub use logging::init_logging;
