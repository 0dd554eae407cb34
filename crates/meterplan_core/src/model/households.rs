//! Residential housing stock served by the metering program.

use serde::{Deserialize, Serialize};

/// Liters per cubic meter.
pub const LITERS_PER_M3: f64 = 1000.0;
/// Days per year used for consumption annualization.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Household stock of a municipality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdStock {
    /// Number of residential households (meter sites)
    pub households: u64,
    /// Average number of persons per household
    pub persons_per_household: f64,
    /// Baseline per-capita daily consumption in liters
    pub per_capita_lpcd: f64,
}

impl Default for HouseholdStock {
    fn default() -> Self {
        Self {
            households: 10_000,
            persons_per_household: 2.1,
            per_capita_lpcd: 250.0,
        }
    }
}

impl HouseholdStock {
    /// Gross annual consumption of one household (m³/yr), leaks included.
    #[must_use]
    pub fn gross_consumption_m3(&self) -> f64 {
        self.per_capita_lpcd * self.persons_per_household * DAYS_PER_YEAR / LITERS_PER_M3
    }

    /// Total population of the stock.
    #[must_use]
    pub fn population(&self) -> f64 {
        self.households as f64 * self.persons_per_household
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gross_consumption() {
        let stock = HouseholdStock::default();
        // 250 L × 2.1 persons × 365 days = 191.625 m³
        assert!((stock.gross_consumption_m3() - 191.625).abs() < 1e-9);
        assert!((stock.population() - 21_000.0).abs() < 1e-9);
    }
}
