//! Water meter cost-benefit simulation library
//!
//! This crate computes the discounted costs and benefits of deploying
//! residential water meters across a municipal housing stock. It supports:
//! - Continuous remote-read, periodic remote-read and manual meters
//! - Mandatory, logistic, new-construction and by-sector adoption rollouts
//! - Optimistic, realistic and pessimistic behavioral persistence regimes
//! - Two-stock household leak dynamics with a chronic long tail
//! - Economic (social) and financial (municipal budget) cost perspectives
//! - Tornado, preset, perspective and Monte Carlo sensitivity sweeps
//!
//! # Builder DSL
//!
//! ```ignore
//! use meterplan_core::config::ParameterSetBuilder;
//! use meterplan_core::model::{AdoptionPlan, PersistenceRegime};
//! use meterplan_core::simulation::run_scenario;
//!
//! let params = ParameterSetBuilder::new()
//!     .household_preset("longueuil")?
//!     .adoption(AdoptionPlan::logistic(0.6, 5.0, 0.85))
//!     .persistence(PersistenceRegime::default())
//!     .discount_rate(0.05)
//!     .years(20)
//!     .build()?;
//!
//! let result = run_scenario(&params);
//! println!("NPV {:.0} BCR {} LCOW {}", result.npv, result.bcr, result.lcow);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod adoption;
pub mod analysis;
pub mod calibration;
pub mod discount;
pub mod error;
pub mod leaks;
pub mod network;
pub mod persistence;
pub mod simulation;
pub mod trajectory;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{ParamKey, ParameterSet, ParameterSetBuilder, ScenarioSpec};
pub use error::{ConfigError, SweepError};
pub use simulation::{run_many, run_scenario};
