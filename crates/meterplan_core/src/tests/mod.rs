//! Integration tests for the meterplan simulation engine
//!
//! Tests are organized by topic:
//! - `assembly` - Parameter set assembly, validation and overrides
//! - `trajectory` - Contribution terms, perspective rules and optional modules
//! - `discounting` - Present values, indicators and the reference scenario
//! - `leak_dynamics` - Leak stock invariants inside full runs
//! - `sensitivity` - Tornado, preset, perspective and Monte Carlo sweeps
//! - `canonical` - The canonical scenario library

mod assembly;
mod discounting;
mod sensitivity;

use crate::config::{ParameterSet, ParameterSetBuilder};

/// Reference scenario: 10 000 households, AMI meters, mandatory adoption,
/// realistic persistence, two-stock leaks, 5% discount rate, 20 years.
pub(super) fn reference() -> ParameterSet {
    ParameterSetBuilder::new()
        .discount_rate(0.05)
        .years(20)
        .build()
        .expect("reference scenario is valid")
}

pub(super) fn assert_close(actual: f64, expected: f64, rel: f64, what: &str) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= rel * scale,
        "{what}: expected {expected}, got {actual}"
    );
}
