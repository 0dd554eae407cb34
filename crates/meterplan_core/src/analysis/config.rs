//! Configuration types for sensitivity sweeps.

use serde::{Deserialize, Serialize};

use crate::config::{ParamKey, PresetCategory};
use crate::model::CostPerspective;

/// N-dimensional grid storage with flat backing array and stride-based indexing.
///
/// Stores values in row-major order where the last dimension varies fastest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepGrid<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T: Clone> SweepGrid<T> {
    /// Create a new grid with the given shape, filled with `default`.
    pub fn new(shape: Vec<usize>, default: T) -> Self {
        let total_size: usize = shape.iter().product();
        let strides = compute_strides(&shape);
        Self {
            data: vec![default; total_size],
            shape,
            strides,
        }
    }
}

impl<T> SweepGrid<T> {
    /// Create a grid from row-major data; `None` if the length does not match.
    pub fn from_data(shape: Vec<usize>, data: Vec<T>) -> Option<Self> {
        let total_size: usize = shape.iter().product();
        if data.len() != total_size {
            return None;
        }
        let strides = compute_strides(&shape);
        Some(Self {
            data,
            shape,
            strides,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert multi-dimensional indices to a flat index
    pub fn flat_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (i, (&idx, &size)) in indices.iter().zip(&self.shape).enumerate() {
            if idx >= size {
                return None;
            }
            flat += idx * self.strides[i];
        }
        Some(flat)
    }

    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        self.flat_index(indices).map(|i| &self.data[i])
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all indices in row-major order
    pub fn indices(&self) -> GridIndices {
        GridIndices {
            shape: self.shape.clone(),
            current: vec![0; self.shape.len()],
            done: self.data.is_empty(),
        }
    }

    /// Iterate over (indices, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, &T)> {
        self.indices().zip(self.data.iter())
    }
}

fn compute_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return Vec::new();
    }
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Iterator over all indices in a grid
pub struct GridIndices {
    shape: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl Iterator for GridIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current.clone();

        // Last dimension varies fastest
        for i in (0..self.shape.len()).rev() {
            self.current[i] += 1;
            if self.current[i] < self.shape[i] {
                break;
            }
            self.current[i] = 0;
            if i == 0 {
                self.done = true;
            }
        }
        if self.shape.is_empty() {
            self.done = true;
        }

        Some(result)
    }
}

/// How far a tornado sweep moves a parameter from its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variation {
    /// ±delta as a fraction of the baseline value
    Relative { delta: f64 },
    /// Explicit low and high values
    Absolute { low: f64, high: f64 },
}

impl Default for Variation {
    fn default() -> Self {
        Self::Relative { delta: 0.2 }
    }
}

impl Variation {
    /// Low and high values around `base`, rounded for integer keys.
    #[must_use]
    pub fn bounds(&self, key: ParamKey, base: f64) -> (f64, f64) {
        let (low, high) = match *self {
            Self::Relative { delta } => (base * (1.0 - delta), base * (1.0 + delta)),
            Self::Absolute { low, high } => (low, high),
        };
        if key.is_integer() {
            (low.round(), high.round())
        } else {
            (low, high)
        }
    }
}

/// One parameter swept in a tornado analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepParameter {
    pub key: ParamKey,
    #[serde(default)]
    pub variation: Variation,
}

impl SweepParameter {
    #[must_use]
    pub fn relative(key: ParamKey, delta: f64) -> Self {
        Self {
            key,
            variation: Variation::Relative { delta },
        }
    }

    #[must_use]
    pub fn absolute(key: ParamKey, low: f64, high: f64) -> Self {
        Self {
            key,
            variation: Variation::Absolute { low, high },
        }
    }
}

/// Configuration for a tornado analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoConfig {
    pub parameters: Vec<SweepParameter>,
}

/// Parameters swept by default, ±20% each.
const DEFAULT_TORNADO_KEYS: &[ParamKey] = &[
    ParamKey::MeterCost,
    ParamKey::InstallHours,
    ParamKey::MaintenanceCost,
    ParamKey::PerCapitaLpcd,
    ParamKey::BehaviorInitial,
    ParamKey::DecayRate,
    ParamKey::PlateauFloor,
    ParamKey::AnyPrevalence,
    ParamKey::AnyFlow,
    ParamKey::SignificantPrevalence,
    ParamKey::SignificantFlow,
    ParamKey::RepairRate,
    ParamKey::AnyRepairCost,
    ParamKey::SocialValue,
    ParamKey::VariableCost,
    ParamKey::SocialDiscountRate,
    ParamKey::MunicipalDiscountRate,
];

impl Default for TornadoConfig {
    fn default() -> Self {
        Self {
            parameters: DEFAULT_TORNADO_KEYS
                .iter()
                .map(|&key| SweepParameter::relative(key, 0.2))
                .collect(),
        }
    }
}

impl TornadoConfig {
    /// Same parameters with a different relative delta.
    #[must_use]
    pub fn with_relative_delta(delta: f64) -> Self {
        Self {
            parameters: DEFAULT_TORNADO_KEYS
                .iter()
                .map(|&key| SweepParameter::relative(key, delta))
                .collect(),
        }
    }
}

/// One dimension of a cartesian preset sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetAxis {
    pub category: PresetCategory,
    pub names: Vec<String>,
}

impl PresetAxis {
    /// Every registered preset of `category`.
    #[must_use]
    pub fn all(category: PresetCategory) -> Self {
        Self {
            category,
            names: category.names().into_iter().map(String::from).collect(),
        }
    }

    #[must_use]
    pub fn new(category: PresetCategory, names: Vec<String>) -> Self {
        Self { category, names }
    }
}

/// Pessimistic, base, or optimistic bundle of multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCase {
    Pessimistic,
    Base,
    Optimistic,
}

impl ScenarioCase {
    pub const ALL: [ScenarioCase; 3] = [Self::Pessimistic, Self::Base, Self::Optimistic];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pessimistic => "Pessimistic",
            Self::Base => "Base",
            Self::Optimistic => "Optimistic",
        }
    }

    /// Multipliers applied to baseline values. The water value key follows
    /// the perspective.
    #[must_use]
    pub fn multipliers(&self, perspective: CostPerspective) -> Vec<(ParamKey, f64)> {
        let water = match perspective {
            CostPerspective::Economic => ParamKey::SocialValue,
            CostPerspective::Financial => ParamKey::VariableCost,
        };
        match self {
            Self::Pessimistic => vec![
                (ParamKey::MeterCost, 1.30),
                (ParamKey::RepairRate, 0.65),
                (ParamKey::BehaviorInitial, 0.60),
                (water, 0.75),
            ],
            Self::Base => Vec::new(),
            Self::Optimistic => vec![
                (ParamKey::MeterCost, 0.80),
                (ParamKey::RepairRate, 1.15),
                (ParamKey::BehaviorInitial, 1.40),
                (water, 1.25),
            ],
        }
    }
}

/// Shape of the per-key sampling distribution in uncertainty analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawDistribution {
    /// Uniform over the recommended range
    #[default]
    Uniform,
    /// Triangular over the recommended range, peaked at the baseline value
    Triangular,
}

/// Configuration for Monte Carlo uncertainty analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyConfig {
    pub draws: usize,
    pub seed: u64,
    /// Keys to sample; keys without a calibration range or inactive in the
    /// baseline are skipped.
    pub keys: Vec<ParamKey>,
    #[serde(default)]
    pub distribution: DrawDistribution,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            draws: 1000,
            seed: 42,
            keys: vec![
                ParamKey::BehaviorInitial,
                ParamKey::DecayRate,
                ParamKey::AnyPrevalence,
                ParamKey::AnyFlow,
                ParamKey::SignificantPrevalence,
                ParamKey::SignificantFlow,
                ParamKey::RepairRate,
                ParamKey::MeterCost,
            ],
            distribution: DrawDistribution::Uniform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_indexing_row_major() {
        let grid = SweepGrid::from_data(vec![2, 3], (0..6).collect::<Vec<_>>()).unwrap();
        assert_eq!(grid.get(&[0, 2]), Some(&2));
        assert_eq!(grid.get(&[1, 0]), Some(&3));
        assert_eq!(grid.flat_index(&[1, 1]), Some(4));
        assert_eq!(grid.get(&[2, 0]), None);
        assert_eq!(grid.indices().count(), 6);
    }

    #[test]
    fn test_grid_from_data_rejects_wrong_length() {
        assert!(SweepGrid::from_data(vec![2, 2], vec![1, 2, 3]).is_none());
    }

    #[test]
    fn test_variation_bounds_round_integer_keys() {
        let v = Variation::Relative { delta: 0.25 };
        assert_eq!(v.bounds(ParamKey::Horizon, 10.0), (8.0, 13.0));
        let (low, high) = v.bounds(ParamKey::MeterCost, 100.0);
        assert!((low - 75.0).abs() < 1e-12 && (high - 125.0).abs() < 1e-12);
    }

    #[test]
    fn test_base_case_has_no_multipliers() {
        assert!(ScenarioCase::Base.multipliers(CostPerspective::Economic).is_empty());
        let financial = ScenarioCase::Optimistic.multipliers(CostPerspective::Financial);
        assert!(financial.iter().any(|(k, _)| *k == ParamKey::VariableCost));
    }
}
