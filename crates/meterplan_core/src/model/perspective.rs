//! Cost perspective and value-of-water assumptions.

use serde::{Deserialize, Serialize};

/// Accounting perspective of the analysis.
///
/// The economic perspective takes the social-welfare view: transfers between
/// the municipality and households (incentives, recovered revenue) cancel out
/// and saved water is valued at its full social value. The financial
/// perspective takes the municipal-budget view: every municipal cash flow is
/// counted and saved water is worth only its avoided variable cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostPerspective {
    #[default]
    Economic,
    Financial,
}

impl CostPerspective {
    pub const ALL: [CostPerspective; 2] = [Self::Economic, Self::Financial];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Economic => "Economic",
            Self::Financial => "Financial",
        }
    }

    /// Whether pure transfers (incentives, recovered revenue) enter the accounts.
    #[must_use]
    pub fn includes_transfers(&self) -> bool {
        matches!(self, Self::Financial)
    }
}

/// Value of one cubic meter of water under each perspective ($/m³).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterValue {
    /// Full social value (long-run marginal cost incl. infrastructure)
    pub social_value: f64,
    /// Short-run variable production cost (energy, chemicals)
    pub variable_cost: f64,
    /// Retail volumetric price, informational only
    #[serde(default)]
    pub retail_price: f64,
}

impl Default for WaterValue {
    fn default() -> Self {
        Self {
            social_value: 4.69,
            variable_cost: 0.50,
            retail_price: 2.50,
        }
    }
}

impl WaterValue {
    /// Value per m³ for the given perspective.
    #[must_use]
    pub fn per_m3(&self, perspective: CostPerspective) -> f64 {
        match perspective {
            CostPerspective::Economic => self.social_value,
            CostPerspective::Financial => self.variable_cost,
        }
    }
}

/// Discount rates of each perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRates {
    /// Social discount rate (economic perspective)
    pub social: f64,
    /// Municipal borrowing rate (financial perspective)
    pub municipal: f64,
}

impl Default for DiscountRates {
    fn default() -> Self {
        Self {
            social: 0.03,
            municipal: 0.03,
        }
    }
}

impl DiscountRates {
    #[must_use]
    pub fn for_perspective(&self, perspective: CostPerspective) -> f64 {
        match perspective {
            CostPerspective::Economic => self.social,
            CostPerspective::Financial => self.municipal,
        }
    }
}

/// One-time avoided or deferred infrastructure expenditure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureDeferral {
    /// Benefit amount at full adoption ($)
    pub amount: f64,
    /// Year in which the deferral is realized
    pub year: u32,
}

/// Revenue recovered by correcting under-registering billing (financial only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecovery {
    /// Recovered revenue per metered household per year ($)
    pub per_household: f64,
}
