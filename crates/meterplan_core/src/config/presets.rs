//! Process-wide preset registry.
//!
//! Built once on first access and never mutated afterwards. Each category
//! keeps its declaration order so listings and cartesian sweeps are stable.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::model::{
    AdoptionCurve, AdoptionPlan, Fadeout, HouseholdStock, LeakParameters, LeakStock, LongTail,
    MeterType, PersistenceRegime, RepairCostAllocation, SectorRounding, WaterValue,
};

/// Category of a named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetCategory {
    Households,
    Meter,
    Adoption,
    Persistence,
    Leaks,
    WaterValue,
}

impl PresetCategory {
    pub const ALL: [PresetCategory; 6] = [
        Self::Households,
        Self::Meter,
        Self::Adoption,
        Self::Persistence,
        Self::Leaks,
        Self::WaterValue,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Households => "households",
            Self::Meter => "meter",
            Self::Adoption => "adoption",
            Self::Persistence => "persistence",
            Self::Leaks => "leaks",
            Self::WaterValue => "water-value",
        }
    }

    /// Parse a category from its kebab-case name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Registered preset names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let registry = &*REGISTRY;
        match self {
            Self::Households => registry.households.names(),
            Self::Meter => registry.meters.names(),
            Self::Adoption => registry.adoption.names(),
            Self::Persistence => registry.persistence.names(),
            Self::Leaks => registry.leaks.names(),
            Self::WaterValue => registry.water_values.names(),
        }
    }
}

/// Name and description of a registered preset.
#[derive(Debug, Clone, Serialize)]
pub struct PresetInfo {
    pub category: PresetCategory,
    pub name: &'static str,
    pub description: &'static str,
}

struct Entry<T> {
    name: &'static str,
    description: &'static str,
    value: T,
}

struct PresetTable<T> {
    entries: Vec<Entry<T>>,
    index: FxHashMap<&'static str, usize>,
}

impl<T: Clone> PresetTable<T> {
    fn new(entries: Vec<Entry<T>>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name, i))
            .collect();
        Self { entries, index }
    }

    fn get(&self, category: PresetCategory, name: &str) -> Result<T> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].value.clone())
            .ok_or_else(|| ConfigError::UnknownPreset {
                category,
                name: name.to_string(),
            })
    }

    fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    fn infos(&self, category: PresetCategory) -> impl Iterator<Item = PresetInfo> + '_ {
        self.entries.iter().map(move |e| PresetInfo {
            category,
            name: e.name,
            description: e.description,
        })
    }
}

fn entry<T>(name: &'static str, description: &'static str, value: T) -> Entry<T> {
    Entry {
        name,
        description,
        value,
    }
}

struct PresetRegistry {
    households: PresetTable<HouseholdStock>,
    meters: PresetTable<MeterType>,
    adoption: PresetTable<AdoptionPlan>,
    persistence: PresetTable<PersistenceRegime>,
    leaks: PresetTable<LeakParameters>,
    water_values: PresetTable<WaterValue>,
}

static REGISTRY: LazyLock<PresetRegistry> = LazyLock::new(PresetRegistry::build);

impl PresetRegistry {
    fn build() -> Self {
        Self {
            households: PresetTable::new(household_presets()),
            meters: PresetTable::new(vec![
                entry(
                    "continuous-remote",
                    "AMI: hourly remote reads, reference efficiency",
                    MeterType::continuous_remote(),
                ),
                entry(
                    "periodic-remote",
                    "AMR: drive-by remote reads",
                    MeterType::periodic_remote(),
                ),
                entry("manual", "Manually read meter", MeterType::manual()),
            ]),
            adoption: PresetTable::new(adoption_presets()),
            persistence: PresetTable::new(persistence_presets()),
            leaks: PresetTable::new(leak_presets()),
            water_values: PresetTable::new(vec![
                entry(
                    "quebec",
                    "Calibrated values for Quebec municipalities",
                    WaterValue::default(),
                ),
                entry(
                    "conservative",
                    "Prudent values for sensitivity analysis",
                    WaterValue {
                        social_value: 2.50,
                        variable_cost: 0.25,
                        retail_price: 2.00,
                    },
                ),
                entry(
                    "scarcity",
                    "Water-stressed supply",
                    WaterValue {
                        social_value: 8.00,
                        variable_cost: 2.50,
                        retail_price: 4.00,
                    },
                ),
            ]),
        }
    }
}

fn household_presets() -> Vec<Entry<HouseholdStock>> {
    vec![
        entry(
            "reference",
            "Generic mid-size municipality",
            HouseholdStock::default(),
        ),
        entry(
            "longueuil",
            "Longueuil agglomeration",
            HouseholdStock {
                households: 116_258,
                persons_per_household: 2.18,
                per_capita_lpcd: 236.0,
            },
        ),
        entry(
            "montreal",
            "Montreal, high per-capita consumption",
            HouseholdStock {
                households: 750_000,
                persons_per_household: 2.1,
                per_capita_lpcd: 332.0,
            },
        ),
        entry(
            "winnipeg",
            "Winnipeg, fully metered external benchmark",
            HouseholdStock {
                households: 221_000,
                persons_per_household: 2.3,
                per_capita_lpcd: 250.0,
            },
        ),
    ]
}

fn adoption_presets() -> Vec<Entry<AdoptionPlan>> {
    vec![
        entry(
            "mandatory",
            "Immediate universal installation by by-law",
            AdoptionPlan::mandatory(),
        ),
        entry(
            "fast",
            "Voluntary, strong incentive (30% bill rebate for 3 years)",
            AdoptionPlan::logistic(1.5, 2.0, 0.95).with_incentive(540.0, 3),
        ),
        entry(
            "progressive",
            "Voluntary, moderate incentive (10% bill rebate for 3 years)",
            AdoptionPlan::logistic(0.6, 5.0, 0.85).with_incentive(180.0, 3),
        ),
        entry(
            "new-construction",
            "Required only for new construction and major renovations",
            AdoptionPlan {
                curve: AdoptionCurve::NewConstruction { annual_rate: 0.03 },
                ceiling: 0.60,
                spread_capex: true,
                ..AdoptionPlan::mandatory()
            },
        ),
        entry(
            "by-sector",
            "Planned rollout, one of five sectors every two years",
            AdoptionPlan {
                curve: AdoptionCurve::BySector {
                    sector_count: 5,
                    rollout_years: 10.0,
                    rounding: SectorRounding::Nearest,
                },
                spread_capex: true,
                ..AdoptionPlan::mandatory()
            },
        ),
        entry(
            "slow",
            "Voluntary, minimal incentive (5% bill rebate for 3 years)",
            AdoptionPlan::logistic(0.3, 10.0, 0.70).with_incentive(90.0, 3),
        ),
    ]
}

fn persistence_presets() -> Vec<Entry<PersistenceRegime>> {
    vec![
        entry(
            "optimistic",
            "Habits persist: constant 8% reduction",
            PersistenceRegime::Optimistic { initial: 0.08 },
        ),
        entry(
            "realistic",
            "8% decaying to a 2.5% plateau (half-life about 4.6 years)",
            PersistenceRegime::default(),
        ),
        entry(
            "pessimistic",
            "8% fading out exponentially (lambda 0.35)",
            PersistenceRegime::Pessimistic {
                initial: 0.08,
                fadeout: Fadeout::Exponential { decay_rate: 0.35 },
            },
        ),
    ]
}

fn leak_presets() -> Vec<Entry<LeakParameters>> {
    let shared = |municipal_share| LeakParameters {
        allocation: RepairCostAllocation::Shared { municipal_share },
        ..LeakParameters::default()
    };
    vec![
        entry(
            "no-cost",
            "Repair costs left out of the analysis",
            LeakParameters {
                allocation: RepairCostAllocation::Excluded,
                ..LeakParameters::default()
            },
        ),
        entry(
            "household",
            "Households pay all repairs",
            shared(0.0),
        ),
        entry(
            "subsidy-50",
            "The city subsidizes half of repair costs",
            shared(0.5),
        ),
        entry(
            "municipal",
            "The city pays all repairs",
            shared(1.0),
        ),
        entry(
            "quebec",
            "Higher prevalence for a never-metered city, differentiated costs",
            LeakParameters {
                any: LeakStock {
                    prevalence: 0.30,
                    flow_m3: 10.0,
                    detection_factor: 1.0,
                    repair_factor: 1.0,
                    repair_cost: 150.0,
                },
                significant: LeakStock {
                    prevalence: 0.06,
                    flow_m3: 50.0,
                    detection_factor: 1.2,
                    repair_factor: 0.7,
                    repair_cost: 600.0,
                },
                natural_duration_years: 6.0,
                long_tail: LongTail {
                    prevalence: 0.015,
                    ..LongTail::default()
                },
                ..shared(0.0)
            },
        ),
    ]
}

pub fn household_preset(name: &str) -> Result<HouseholdStock> {
    REGISTRY.households.get(PresetCategory::Households, name)
}

pub fn meter_preset(name: &str) -> Result<MeterType> {
    REGISTRY.meters.get(PresetCategory::Meter, name)
}

pub fn adoption_preset(name: &str) -> Result<AdoptionPlan> {
    REGISTRY.adoption.get(PresetCategory::Adoption, name)
}

pub fn persistence_preset(name: &str) -> Result<PersistenceRegime> {
    REGISTRY.persistence.get(PresetCategory::Persistence, name)
}

pub fn leak_preset(name: &str) -> Result<LeakParameters> {
    REGISTRY.leaks.get(PresetCategory::Leaks, name)
}

pub fn water_value_preset(name: &str) -> Result<WaterValue> {
    REGISTRY.water_values.get(PresetCategory::WaterValue, name)
}

/// Every registered preset, grouped by category.
#[must_use]
pub fn preset_catalog() -> Vec<PresetInfo> {
    let registry = &*REGISTRY;
    let mut out = Vec::new();
    out.extend(registry.households.infos(PresetCategory::Households));
    out.extend(registry.meters.infos(PresetCategory::Meter));
    out.extend(registry.adoption.infos(PresetCategory::Adoption));
    out.extend(registry.persistence.infos(PresetCategory::Persistence));
    out.extend(registry.leaks.infos(PresetCategory::Leaks));
    out.extend(registry.water_values.infos(PresetCategory::WaterValue));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_counts() {
        assert_eq!(PresetCategory::Adoption.names().len(), 6);
        assert_eq!(PresetCategory::Persistence.names().len(), 3);
        assert_eq!(PresetCategory::Leaks.names().len(), 5);
        assert_eq!(PresetCategory::Meter.names().len(), 3);
        assert_eq!(PresetCategory::WaterValue.names().len(), 3);
        assert!(PresetCategory::Households.names().contains(&"reference"));
    }

    #[test]
    fn test_unknown_preset() {
        let err = adoption_preset("overnight").unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownPreset {
                category: PresetCategory::Adoption,
                name: "overnight".to_string(),
            }
        );
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for category in PresetCategory::ALL {
            assert_eq!(PresetCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(PresetCategory::parse("weather"), None);
    }

    #[test]
    fn test_quebec_leaks_are_heavier() {
        let reference = leak_preset("household").unwrap();
        let quebec = leak_preset("quebec").unwrap();
        assert!(quebec.any.prevalence > reference.any.prevalence);
        assert!(quebec.significant.repair_cost > reference.significant.repair_cost);
    }
}
