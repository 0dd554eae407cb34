//! Sensitivity analysis.
//!
//! Every sweep derives independent [`ParameterSet`](crate::config::ParameterSet)
//! variants from a baseline and runs them with no shared mutable state. With
//! the `parallel` feature the variants run on the rayon pool. A shared
//! [`SweepProgress`] reports completion and lets callers cancel the variants
//! still queued; completed results are kept.
//!
//! ```ignore
//! use meterplan_core::analysis::{TornadoConfig, SweepProgress, tornado};
//!
//! let progress = SweepProgress::default();
//! let results = tornado(&params, &TornadoConfig::default(), Some(&progress))?;
//! for row in &results.rows {
//!     println!("{:<30} {:>12.0}", row.key.label(), row.swing());
//! }
//! ```
//!
//! # Sweeps
//!
//! - [`tornado`]: one parameter at a time, low and high, ranked by NPV swing
//! - [`preset_sweep`] and [`preset_grid`]: named presets, alone or as a
//!   cartesian product stored in a row-major [`SweepGrid`]
//! - [`compare_perspectives`]: economic vs financial on identical inputs
//! - [`scenario_analysis`]: pessimistic, base and optimistic bundles
//! - [`uncertainty`]: seeded Monte Carlo draws within calibration ranges

mod config;
mod evaluator;
mod metrics;
mod monte_carlo;

pub use config::*;
pub use evaluator::*;
pub use metrics::*;
pub use monte_carlo::*;
