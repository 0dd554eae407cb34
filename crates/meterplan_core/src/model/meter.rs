//! Meter technologies and their unit economics.

use serde::{Deserialize, Serialize};

/// Read technology of a residential meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterKind {
    /// Continuous remote read (AMI): hourly data, the reference technology
    ContinuousRemote,
    /// Periodic remote read (AMR): drive-by collection
    PeriodicRemote,
    /// Manual read by a field agent
    Manual,
}

impl MeterKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ContinuousRemote => "Continuous remote (AMI)",
            Self::PeriodicRemote => "Periodic remote (AMR)",
            Self::Manual => "Manual",
        }
    }
}

/// Radio battery replaced on a fixed cycle for remote-read meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryReplacement {
    /// Battery life in years
    pub life_years: u32,
    /// Replacement cost per meter
    pub replacement_cost: f64,
}

impl Default for BatteryReplacement {
    fn default() -> Self {
        Self {
            life_years: 15,
            replacement_cost: 30.0,
        }
    }
}

/// Meter technology with its efficiency factors and unit costs.
///
/// Efficiency factors are relative to the continuous-remote reference (1.0):
/// they scale the behavioral effect and the leak detection rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterType {
    pub kind: MeterKind,
    /// Hardware cost per meter
    pub meter_cost: f64,
    /// Installation labour per meter (hours)
    pub install_hours: f64,
    /// Installation labour rate ($/h)
    pub hourly_rate: f64,
    /// Communication network cost per meter (remote-read only)
    #[serde(default)]
    pub network_cost: f64,
    /// Annual maintenance per meter
    pub maintenance_cost: f64,
    /// Annual reading cost per meter (zero when reads are automatic)
    #[serde(default)]
    pub reading_cost: f64,
    /// Multiplier on the behavioral saving effect
    pub behavior_efficiency: f64,
    /// Multiplier on the leak detection rate
    pub leak_detection_efficiency: f64,
    #[serde(default)]
    pub battery: Option<BatteryReplacement>,
}

impl MeterType {
    /// Continuous remote-read (AMI) reference meter.
    #[must_use]
    pub fn continuous_remote() -> Self {
        Self {
            kind: MeterKind::ContinuousRemote,
            meter_cost: 250.0,
            install_hours: 1.5,
            hourly_rate: 125.0,
            network_cost: 50.0,
            maintenance_cost: 5.0,
            reading_cost: 0.0,
            behavior_efficiency: 1.0,
            leak_detection_efficiency: 1.0,
            battery: Some(BatteryReplacement::default()),
        }
    }

    /// Periodic remote-read (AMR) meter.
    #[must_use]
    pub fn periodic_remote() -> Self {
        Self {
            kind: MeterKind::PeriodicRemote,
            meter_cost: 180.0,
            network_cost: 0.0,
            maintenance_cost: 8.0,
            reading_cost: 8.0,
            behavior_efficiency: 0.875,
            leak_detection_efficiency: 0.91,
            ..Self::continuous_remote()
        }
    }

    /// Manually read meter.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            kind: MeterKind::Manual,
            meter_cost: 80.0,
            network_cost: 0.0,
            maintenance_cost: 3.0,
            reading_cost: 25.0,
            behavior_efficiency: 0.625,
            leak_detection_efficiency: 0.765,
            battery: None,
            ..Self::continuous_remote()
        }
    }

    /// Installation labour cost per meter.
    #[must_use]
    pub fn installation_cost(&self) -> f64 {
        self.install_hours * self.hourly_rate
    }

    /// Up-front capital per meter, before any scale factor.
    #[must_use]
    pub fn unit_capex(&self) -> f64 {
        self.meter_cost + self.installation_cost() + self.network_cost
    }

    /// Up-front capital per meter with a scale factor applied to hardware and labour.
    ///
    /// Network cost is a per-site fee and does not scale.
    #[must_use]
    pub fn scaled_unit_capex(&self, scale_factor: f64) -> f64 {
        (self.meter_cost + self.installation_cost()) * scale_factor + self.network_cost
    }

    /// Annual operating cost per meter.
    #[must_use]
    pub fn annual_opex(&self) -> f64 {
        self.maintenance_cost + self.reading_cost
    }
}

impl Default for MeterType {
    fn default() -> Self {
        Self::continuous_remote()
    }
}

/// Volume discount on hardware and installation for large deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleEconomies {
    /// Step table of (minimum households, factor), ascending by threshold
    Tiered { tiers: Vec<(u64, f64)> },
    /// factor = 1 − elasticity × ln(n / reference), clamped to [floor, 1]
    Continuous {
        elasticity: f64,
        reference_households: u64,
        floor: f64,
    },
}

impl ScaleEconomies {
    /// Default tier table used for large municipal procurements.
    #[must_use]
    pub fn default_tiers() -> Self {
        Self::Tiered {
            tiers: vec![
                (0, 1.0),
                (10_000, 0.95),
                (50_000, 0.90),
                (100_000, 0.85),
                (200_000, 0.80),
            ],
        }
    }

    /// Unit-cost multiplier for a deployment of `households` meters.
    #[must_use]
    pub fn factor(&self, households: u64) -> f64 {
        match self {
            Self::Tiered { tiers } => tiers
                .iter()
                .filter(|(threshold, _)| households >= *threshold)
                .map(|(_, factor)| *factor)
                .last()
                .unwrap_or(1.0),
            Self::Continuous {
                elasticity,
                reference_households,
                floor,
            } => {
                if households == 0 || *reference_households == 0 {
                    return 1.0;
                }
                let ratio = households as f64 / *reference_households as f64;
                (1.0 - elasticity * ratio.ln()).clamp(*floor, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_unit_costs() {
        let ami = MeterType::continuous_remote();
        assert!((ami.unit_capex() - 487.5).abs() < 1e-9);
        assert!((ami.annual_opex() - 5.0).abs() < 1e-9);

        let manual = MeterType::manual();
        assert!((manual.unit_capex() - 267.5).abs() < 1e-9);
        assert!((manual.annual_opex() - 28.0).abs() < 1e-9);
        assert!(manual.battery.is_none());
    }

    #[test]
    fn test_tiered_scale_factor() {
        let scale = ScaleEconomies::default_tiers();
        assert_eq!(scale.factor(5_000), 1.0);
        assert_eq!(scale.factor(116_258), 0.85);
        assert_eq!(scale.factor(750_000), 0.80);
    }

    #[test]
    fn test_continuous_scale_factor_is_clamped() {
        let scale = ScaleEconomies::Continuous {
            elasticity: 0.05,
            reference_households: 10_000,
            floor: 0.70,
        };
        assert_eq!(scale.factor(1_000), 1.0);
        let big = scale.factor(100_000);
        assert!((big - (1.0 - 0.05 * 10f64.ln())).abs() < 1e-12);
        assert_eq!(scale.factor(u64::MAX), 0.70);
    }

    #[test]
    fn test_scaled_capex_keeps_network_fee() {
        let ami = MeterType::continuous_remote();
        let scaled = ami.scaled_unit_capex(0.8);
        assert!((scaled - (437.5 * 0.8 + 50.0)).abs() < 1e-9);
    }
}
