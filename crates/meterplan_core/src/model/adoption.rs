//! Meter rollout plans.

use serde::{Deserialize, Serialize};

/// How a sector completion year is rounded when sectors do not divide the
/// rollout period evenly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorRounding {
    /// Sector counts as complete in the year its rollout ends, rounded down
    Floor,
    /// Nearest whole year, halves rounded up
    #[default]
    Nearest,
    /// Sector counts as complete only once its last partial year has elapsed
    Ceil,
}

impl SectorRounding {
    #[must_use]
    pub fn apply(&self, value: f64) -> u32 {
        let rounded = match self {
            Self::Floor => value.floor(),
            Self::Nearest => value.round(),
            Self::Ceil => value.ceil(),
        };
        rounded.max(0.0) as u32
    }
}

/// Shape of the adoption curve A(t).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionCurve {
    /// Universal installation by by-law from the start year
    Mandatory,
    /// Voluntary uptake following a logistic ramp
    Logistic {
        /// Steepness k (1/yr)
        steepness: f64,
        /// Midpoint t₀ in years after the start year
        midpoint: f64,
    },
    /// Only new construction and major renovations are metered
    NewConstruction {
        /// Share of the stock newly built or renovated each year
        annual_rate: f64,
    },
    /// Planned neighbourhood-by-neighbourhood deployment
    BySector {
        sector_count: u32,
        /// Years needed to cover all sectors
        rollout_years: f64,
        #[serde(default)]
        rounding: SectorRounding,
    },
}

impl AdoptionCurve {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mandatory => "Mandatory",
            Self::Logistic { .. } => "Logistic",
            Self::NewConstruction { .. } => "New construction",
            Self::BySector { .. } => "By sector",
        }
    }
}

/// Adoption incentive paid to each adopting household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incentive {
    /// Total incentive per adopting household ($)
    pub total_per_household: f64,
    /// Years over which the total is paid in equal installments
    pub duration_years: u32,
}

impl Incentive {
    #[must_use]
    pub fn annual_installment(&self) -> f64 {
        if self.duration_years == 0 {
            return 0.0;
        }
        self.total_per_household / self.duration_years as f64
    }
}

fn default_ceiling() -> f64 {
    1.0
}

/// Complete rollout plan: curve shape plus timing, cost spreading and incentives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionPlan {
    pub curve: AdoptionCurve,
    /// First year of deployment; A(t) = 0 before it
    #[serde(default)]
    pub start_year: u32,
    /// Maximum attainable share of the stock
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,
    /// Charge capital as meters are installed instead of entirely at t = 0
    #[serde(default)]
    pub spread_capex: bool,
    #[serde(default)]
    pub incentive: Option<Incentive>,
}

impl Default for AdoptionPlan {
    fn default() -> Self {
        Self::mandatory()
    }
}

impl AdoptionPlan {
    #[must_use]
    pub fn mandatory() -> Self {
        Self {
            curve: AdoptionCurve::Mandatory,
            start_year: 0,
            ceiling: 1.0,
            spread_capex: false,
            incentive: None,
        }
    }

    /// Voluntary logistic uptake with capital spread over installations.
    #[must_use]
    pub fn logistic(steepness: f64, midpoint: f64, ceiling: f64) -> Self {
        Self {
            curve: AdoptionCurve::Logistic {
                steepness,
                midpoint,
            },
            ceiling,
            spread_capex: true,
            ..Self::mandatory()
        }
    }

    #[must_use]
    pub fn with_incentive(mut self, total_per_household: f64, duration_years: u32) -> Self {
        self.incentive = Some(Incentive {
            total_per_household,
            duration_years,
        });
        self
    }
}
