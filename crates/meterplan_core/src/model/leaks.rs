//! Household and network leak parameters.

use serde::{Deserialize, Serialize};

/// One class of household leaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakStock {
    /// Share of households with an active leak of this class at steady state
    pub prevalence: f64,
    /// Leaked volume per active leak (m³/yr)
    pub flow_m3: f64,
    /// Multiplier on the baseline detection rate
    #[serde(default = "default_factor")]
    pub detection_factor: f64,
    /// Multiplier on the baseline repair rate
    #[serde(default = "default_factor")]
    pub repair_factor: f64,
    /// Cost of one repair ($)
    pub repair_cost: f64,
}

fn default_factor() -> f64 {
    1.0
}

/// How the long-tail reductions combine into the chronic-leak repair rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongTailInteraction {
    /// m = repair_factor / duration_multiplier
    #[default]
    Multiplicative,
    /// m = max(0, repair_factor + 1/duration_multiplier − 1)
    Additive,
}

/// Chronic leaks that resist both natural and meter-driven repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTail {
    /// Share of households with a chronic leak (part of total prevalence)
    pub prevalence: f64,
    /// Multiplier on the repair rate of chronic leaks
    #[serde(default = "default_factor")]
    pub repair_factor: f64,
    /// How many times longer a chronic leak lasts
    pub duration_multiplier: f64,
    #[serde(default)]
    pub interaction: LongTailInteraction,
}

impl LongTail {
    /// Multiplier applied to both repair rates of the chronic sub-stock.
    #[must_use]
    pub fn rate_multiplier(&self) -> f64 {
        let stretch = 1.0 / self.duration_multiplier.max(1.0);
        match self.interaction {
            LongTailInteraction::Multiplicative => self.repair_factor * stretch,
            LongTailInteraction::Additive => (self.repair_factor + stretch - 1.0).max(0.0),
        }
    }
}

impl Default for LongTail {
    fn default() -> Self {
        Self {
            prevalence: 0.01,
            repair_factor: 1.0,
            duration_multiplier: 5.0,
            interaction: LongTailInteraction::Multiplicative,
        }
    }
}

/// Who pays for leak repairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairCostAllocation {
    /// Repair costs are left out of the analysis
    Excluded,
    /// Repair costs are shared; `municipal_share` is the city's fraction
    Shared { municipal_share: f64 },
}

impl RepairCostAllocation {
    #[must_use]
    pub fn municipal_share(&self) -> Option<f64> {
        match self {
            Self::Excluded => None,
            Self::Shared { municipal_share } => Some(*municipal_share),
        }
    }
}

/// Household leak model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakParameters {
    /// Track "any" and "significant" leaks separately; off blends them into one stock
    #[serde(default = "default_true")]
    pub differentiated: bool,
    /// All detectable leaks, significant ones included
    pub any: LeakStock,
    /// Large leaks, a subset of `any`
    pub significant: LeakStock,
    /// Share of leaks detected per year with the reference meter
    pub baseline_detection: f64,
    /// Share of detected leaks repaired within the year
    pub baseline_repair: f64,
    /// Mean leak duration without metering (years)
    pub natural_duration_years: f64,
    pub long_tail: LongTail,
    pub allocation: RepairCostAllocation,
}

fn default_true() -> bool {
    true
}

impl Default for LeakParameters {
    fn default() -> Self {
        Self {
            differentiated: true,
            any: LeakStock {
                prevalence: 0.20,
                flow_m3: 10.0,
                detection_factor: 1.0,
                repair_factor: 1.0,
                repair_cost: 100.0,
            },
            significant: LeakStock {
                prevalence: 0.05,
                flow_m3: 50.0,
                detection_factor: 1.2,
                repair_factor: 0.7,
                repair_cost: 400.0,
            },
            baseline_detection: 0.90,
            baseline_repair: 0.85,
            natural_duration_years: 4.0,
            long_tail: LongTail::default(),
            allocation: RepairCostAllocation::Shared {
                municipal_share: 0.0,
            },
        }
    }
}

impl LeakParameters {
    /// Natural (unmetered) repair rate μ.
    #[must_use]
    pub fn natural_repair_rate(&self) -> f64 {
        1.0 / self.natural_duration_years
    }

    /// Total share of households with any leak.
    #[must_use]
    pub fn total_prevalence(&self) -> f64 {
        self.any.prevalence.max(self.significant.prevalence)
    }
}

/// Trajectory of the network loss-reduction program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkRamp {
    /// Full reduction reached after `years`
    Linear { years: u32 },
    /// progress = 1 − e^{−rate·(t − start)}
    Exponential { rate: f64 },
}

/// One-off network capital outlay (district metering, sensors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCapex {
    pub amount: f64,
    pub year: u32,
}

/// Non-household (distribution network) leakage reduction program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLeakParameters {
    /// Baseline network losses (m³/yr)
    pub baseline_loss_m3: f64,
    /// Attainable share of losses eliminated
    pub max_reduction: f64,
    pub ramp: NetworkRamp,
    #[serde(default)]
    pub start_year: u32,
    /// Annual program cost at full progress
    #[serde(default)]
    pub program_cost: f64,
    /// Variable repair cost per saved m³
    #[serde(default)]
    pub repair_cost_per_m3: f64,
    #[serde(default)]
    pub capex: Option<NetworkCapex>,
    /// Scale savings and costs by household adoption
    #[serde(default = "default_true")]
    pub weight_by_adoption: bool,
}
