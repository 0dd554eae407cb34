//! Result types produced by sensitivity sweeps.

use serde::{Deserialize, Serialize};

use super::{PresetAxis, ScenarioCase, SweepGrid};
use crate::config::ParamKey;
use crate::error::ConfigError;
use crate::model::{Ratio, ScenarioResult, ScenarioSummary};

/// Outcome of one sweep variant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantOutcome<T> {
    Completed(T),
    /// The variant's parameters failed validation
    Failed(ConfigError),
    /// Skipped because the sweep was cancelled
    NotRun,
}

impl<T> VariantOutcome<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

impl<T> From<Option<Result<T, ConfigError>>> for VariantOutcome<T> {
    fn from(value: Option<Result<T, ConfigError>>) -> Self {
        match value {
            Some(Ok(v)) => Self::Completed(v),
            Some(Err(e)) => Self::Failed(e),
            None => Self::NotRun,
        }
    }
}

/// Low or high side of one tornado bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TornadoPoint {
    pub value: f64,
    pub npv: f64,
    pub bcr: Ratio,
    pub delta_npv: f64,
    /// BCR change versus baseline, `None` if either BCR is not applicable
    pub delta_bcr: Option<f64>,
}

/// One parameter's row in a tornado chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TornadoRow {
    pub key: ParamKey,
    pub base_value: f64,
    pub low: TornadoPoint,
    pub high: TornadoPoint,
    /// (ΔNPV/NPV) / (Δx/x), `None` when NPV or x is zero at baseline
    pub elasticity: Option<f64>,
}

impl TornadoRow {
    /// Largest absolute NPV change on either side.
    #[must_use]
    pub fn swing(&self) -> f64 {
        self.low.delta_npv.abs().max(self.high.delta_npv.abs())
    }
}

/// Ranked tornado output.
#[derive(Debug, Clone, PartialEq)]
pub struct TornadoResults {
    pub base: ScenarioSummary,
    /// Sorted by [`TornadoRow::swing`], largest first
    pub rows: Vec<TornadoRow>,
    /// Parameters whose low or high variant failed validation
    pub failures: Vec<(ParamKey, ConfigError)>,
    /// Parameters skipped after cancellation
    pub not_run: Vec<ParamKey>,
}

/// Run of one named preset within a category sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetVariant {
    pub name: String,
    pub outcome: VariantOutcome<ScenarioSummary>,
}

/// Economic and financial runs on identical physical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveComparison {
    pub economic: ScenarioResult,
    pub financial: ScenarioResult,
}

impl PerspectiveComparison {
    /// Financial NPV minus economic NPV.
    #[must_use]
    pub fn npv_gap(&self) -> f64 {
        self.financial.npv - self.economic.npv
    }
}

/// Cartesian preset sweep stored as an N-dimensional grid.
#[derive(Debug, Clone)]
pub struct PresetGridResults {
    pub axes: Vec<PresetAxis>,
    pub outcomes: SweepGrid<VariantOutcome<ScenarioSummary>>,
}

impl PresetGridResults {
    /// Preset names selected at `indices`, one per axis.
    #[must_use]
    pub fn names_at(&self, indices: &[usize]) -> Option<Vec<&str>> {
        if indices.len() != self.axes.len() {
            return None;
        }
        self.axes
            .iter()
            .zip(indices)
            .map(|(axis, &i)| axis.names.get(i).map(String::as_str))
            .collect()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.outcomes
            .data()
            .iter()
            .filter(|o| o.is_completed())
            .count()
    }
}

/// Outcome of one multiplier bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioCaseResult {
    pub case: ScenarioCase,
    pub outcome: VariantOutcome<ScenarioSummary>,
}

/// NPV distribution from Monte Carlo draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintySummary {
    pub draws: usize,
    /// Draws that passed validation and ran
    pub accepted: usize,
    /// Keys actually sampled
    pub sampled_keys: Vec<ParamKey>,
    pub mean_npv: f64,
    /// (percentile as 0-1, NPV)
    pub npv_percentiles: Vec<(f64, f64)>,
    pub probability_positive: f64,
}

impl UncertaintySummary {
    /// NPV at percentile `p` (0-1) if it was computed.
    #[must_use]
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.npv_percentiles
            .iter()
            .find(|(q, _)| (q - p).abs() < 1e-9)
            .map(|(_, v)| *v)
    }
}
