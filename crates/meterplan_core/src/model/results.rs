//! Scenario outputs: annual trajectory, indicators and breakdowns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CostPerspective;

/// Benefit terms of the annual trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitCategory {
    Behavior,
    Leak,
    Revenue,
    Infrastructure,
    Network,
}

impl BenefitCategory {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Behavior => "Behavior",
            Self::Leak => "Household leaks",
            Self::Revenue => "Recovered revenue",
            Self::Infrastructure => "Infrastructure deferral",
            Self::Network => "Network leaks",
        }
    }
}

/// Cost terms of the annual trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Capex,
    Opex,
    Repair,
    Incentive,
    Network,
}

impl CostCategory {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Capex => "Capital",
            Self::Opex => "Operating",
            Self::Repair => "Leak repairs",
            Self::Incentive => "Incentives",
            Self::Network => "Network program",
        }
    }
}

/// A ratio that is undefined when its denominator is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Value(f64),
    NotApplicable,
}

impl Ratio {
    /// `numerator / denominator`, or `NotApplicable` when `denominator <= 0`.
    #[must_use]
    pub fn of(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 && denominator.is_finite() && numerator.is_finite() {
            Self::Value(numerator / denominator)
        } else {
            Self::NotApplicable
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NotApplicable => None,
        }
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}"),
            Self::NotApplicable => write!(f, "n/a"),
        }
    }
}

/// Discounted payback year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    /// First year whose cumulative discounted net benefit is non-negative
    Year(u32),
    /// Not reached within the horizon
    Never,
}

impl Payback {
    #[must_use]
    pub fn year(&self) -> Option<u32> {
        match self {
            Self::Year(y) => Some(*y),
            Self::Never => None,
        }
    }
}

impl std::fmt::Display for Payback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Year(y) => write!(f, "year {y}"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// Annual series of one scenario run, indexed by year 0..=horizon.
///
/// Categories absent from the maps did not take part in the run: the module
/// was disabled or the perspective excludes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub years: Vec<u32>,
    /// Adoption fraction A(t)
    pub adoption: Vec<f64>,
    /// Effective behavioral reduction after meter efficiency
    pub alpha: Vec<f64>,
    /// Water saved by source (m³/yr)
    pub saved_m3: BTreeMap<BenefitCategory, Vec<f64>>,
    pub benefits: BTreeMap<BenefitCategory, Vec<f64>>,
    pub costs: BTreeMap<CostCategory, Vec<f64>>,
    pub total_benefits: Vec<f64>,
    pub total_costs: Vec<f64>,
    /// Discount factor 1/(1+r)^t
    pub discount_factors: Vec<f64>,
    /// Cumulative discounted net benefit
    pub cumulative_npv: Vec<f64>,
}

impl Trajectory {
    /// Number of years (horizon + 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Total water saved in year `t` across all sources.
    #[must_use]
    pub fn total_saved_m3(&self, t: usize) -> f64 {
        self.saved_m3.values().map(|series| series[t]).sum()
    }

    /// Net benefit B[t] − C[t].
    #[must_use]
    pub fn net(&self, t: usize) -> f64 {
        self.total_benefits[t] - self.total_costs[t]
    }
}

/// Present value and undiscounted sum of one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub present_value: f64,
    pub undiscounted: f64,
}

/// Secondary indicators derived from the discounted series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplementaryIndicators {
    pub pv_benefits: f64,
    pub pv_costs: f64,
    /// Present value of saved water (discounted m³)
    pub pv_saved_m3: f64,
    /// Undiscounted saved water over the horizon (m³)
    pub total_saved_m3: f64,
    /// Payback with linear interpolation inside the crossing year
    pub interpolated_payback: Option<f64>,
    /// Equivalent annual cost per household ($/yr)
    pub eac_per_household: f64,
    /// Water value at which NPV would be zero ($/m³)
    pub break_even_value_per_m3: Ratio,
    /// Annual saving per household needed to cover the EAC (m³/yr)
    pub break_even_m3_per_household: Ratio,
}

/// Household leak dynamics at full adoption, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakStockSeries {
    pub name: String,
    /// Active leaks at start of year with metering
    pub metered: Vec<f64>,
    /// Active leaks at start of year without metering
    pub counterfactual: Vec<f64>,
    /// Meter-induced repairs per year
    pub repairs: Vec<f64>,
    /// Avoided leaked volume (m³/yr)
    pub avoided_m3: Vec<f64>,
    /// Repair cost incurred, before cost allocation ($/yr)
    pub repair_cost: Vec<f64>,
}

/// Result of one scenario run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub perspective: CostPerspective,
    pub discount_rate: f64,
    pub horizon: u32,
    pub npv: f64,
    pub bcr: Ratio,
    pub discounted_payback_year: Payback,
    /// Levelized cost of saved water ($/m³)
    pub lcow: Ratio,
    pub indicators: SupplementaryIndicators,
    pub trajectory: Trajectory,
    pub benefit_breakdown: BTreeMap<BenefitCategory, CategoryTotal>,
    pub cost_breakdown: BTreeMap<CostCategory, CategoryTotal>,
    #[serde(default)]
    pub leak_stocks: Vec<LeakStockSeries>,
}

impl ScenarioResult {
    #[must_use]
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            perspective: self.perspective,
            npv: self.npv,
            bcr: self.bcr,
            discounted_payback_year: self.discounted_payback_year,
            lcow: self.lcow,
            pv_benefits: self.indicators.pv_benefits,
            pv_costs: self.indicators.pv_costs,
        }
    }
}

/// Headline indicators of a run, without series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub perspective: CostPerspective,
    pub npv: f64,
    pub bcr: Ratio,
    pub discounted_payback_year: Payback,
    pub lcow: Ratio,
    pub pv_benefits: f64,
    pub pv_costs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_not_applicable_on_zero_denominator() {
        assert_eq!(Ratio::of(10.0, 0.0), Ratio::NotApplicable);
        assert_eq!(Ratio::of(10.0, -5.0), Ratio::NotApplicable);
        assert_eq!(Ratio::of(10.0, 4.0), Ratio::Value(2.5));
        assert_eq!(Ratio::NotApplicable.to_string(), "n/a");
    }

    #[test]
    fn test_payback_display() {
        assert_eq!(Payback::Year(7).to_string(), "year 7");
        assert_eq!(Payback::Never.year(), None);
    }
}
