//! Scalar parameter catalog shared by overrides and sensitivity sweeps.

use serde::{Deserialize, Serialize};

use super::{ParameterSet, ParameterSetBuilder};
use crate::error::{ConfigError, Result};
use crate::model::{AdoptionCurve, Fadeout, Incentive, PersistenceRegime, RepairCostAllocation};

/// Value supplied for a [`ParamKey`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Flag(bool),
    Number(f64),
}

impl From<f64> for OverrideValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for OverrideValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

macro_rules! param_keys {
    ($($variant:ident => $name:literal, $label:literal;)*) => {
        /// Identifier of one overridable scalar parameter.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ParamKey {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl ParamKey {
            pub const ALL: &'static [ParamKey] = &[$(ParamKey::$variant),*];

            /// Dotted name used in scenario files.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ParamKey::$variant => $name,)*
                }
            }

            /// Human-readable label.
            #[must_use]
            pub fn label(&self) -> &'static str {
                match self {
                    $(ParamKey::$variant => $label,)*
                }
            }
        }
    };
}

param_keys! {
    HouseholdCount => "households.count", "Households";
    PersonsPerHousehold => "households.persons_per_household", "Persons per household";
    PerCapitaLpcd => "households.per_capita_lpcd", "Per-capita use (L/day)";
    MeterCost => "meter.meter_cost", "Meter cost";
    InstallHours => "meter.install_hours", "Installation hours";
    HourlyRate => "meter.hourly_rate", "Installation rate ($/h)";
    NetworkCost => "meter.network_cost", "Network cost per meter";
    MaintenanceCost => "meter.maintenance_cost", "Maintenance per meter";
    ReadingCost => "meter.reading_cost", "Reading cost per meter";
    BehaviorEfficiency => "meter.behavior_efficiency", "Behavior efficiency";
    LeakDetectionEfficiency => "meter.leak_detection_efficiency", "Leak detection efficiency";
    AdoptionStartYear => "adoption.start_year", "Rollout start year";
    AdoptionCeiling => "adoption.ceiling", "Adoption ceiling";
    AdoptionSteepness => "adoption.steepness", "Logistic steepness";
    AdoptionMidpoint => "adoption.midpoint", "Logistic midpoint";
    NewConstructionRate => "adoption.annual_rate", "New construction rate";
    SpreadCapex => "adoption.spread_capex", "Spread capital";
    IncentivePerHousehold => "adoption.incentive_per_household", "Incentive per household";
    IncentiveYears => "adoption.incentive_years", "Incentive duration";
    BehaviorInitial => "persistence.initial", "Initial behavioral effect";
    DecayRate => "persistence.decay_rate", "Behavioral decay rate";
    PlateauFloor => "persistence.floor", "Behavioral plateau";
    AnyPrevalence => "leaks.any_prevalence", "Leak prevalence (any)";
    AnyFlow => "leaks.any_flow_m3", "Leak flow (any)";
    AnyRepairCost => "leaks.any_repair_cost", "Repair cost (any)";
    SignificantPrevalence => "leaks.significant_prevalence", "Leak prevalence (significant)";
    SignificantFlow => "leaks.significant_flow_m3", "Leak flow (significant)";
    SignificantRepairCost => "leaks.significant_repair_cost", "Repair cost (significant)";
    DetectionRate => "leaks.detection_rate", "Leak detection rate";
    RepairRate => "leaks.repair_rate", "Leak repair rate";
    NaturalDuration => "leaks.natural_duration_years", "Unmetered leak duration";
    PersistentPrevalence => "leaks.persistent_prevalence", "Chronic leak prevalence";
    DurationMultiplier => "leaks.duration_multiplier", "Chronic duration multiplier";
    MunicipalShare => "leaks.municipal_share", "City share of repairs";
    Differentiated => "leaks.differentiated", "Two-stock leaks";
    SocialValue => "water.social_value", "Social value of water";
    VariableCost => "water.variable_cost", "Variable cost of water";
    SocialDiscountRate => "discount.social", "Social discount rate";
    MunicipalDiscountRate => "discount.municipal", "Municipal discount rate";
    Horizon => "horizon", "Horizon (years)";
}

impl std::str::FromStr for ParamKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

impl ParamKey {
    /// Keys that only accept whole numbers; sweeps round their values.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::HouseholdCount | Self::AdoptionStartYear | Self::IncentiveYears | Self::Horizon
        )
    }

    /// Keys holding an on/off switch rather than a number.
    #[must_use]
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::SpreadCapex | Self::Differentiated)
    }

    /// Current numeric value in `params`, or `None` when the key does not
    /// apply to the active modes (e.g. logistic steepness under mandatory adoption).
    #[must_use]
    pub fn get(&self, params: &ParameterSet) -> Option<f64> {
        let h = &params.households;
        let m = &params.meter;
        let a = &params.adoption;
        let leaks = params.leaks.as_ref();
        let value = match self {
            Self::HouseholdCount => h.households as f64,
            Self::PersonsPerHousehold => h.persons_per_household,
            Self::PerCapitaLpcd => h.per_capita_lpcd,
            Self::MeterCost => m.meter_cost,
            Self::InstallHours => m.install_hours,
            Self::HourlyRate => m.hourly_rate,
            Self::NetworkCost => m.network_cost,
            Self::MaintenanceCost => m.maintenance_cost,
            Self::ReadingCost => m.reading_cost,
            Self::BehaviorEfficiency => m.behavior_efficiency,
            Self::LeakDetectionEfficiency => m.leak_detection_efficiency,
            Self::AdoptionStartYear => a.start_year as f64,
            Self::AdoptionCeiling => a.ceiling,
            Self::AdoptionSteepness => match a.curve {
                AdoptionCurve::Logistic { steepness, .. } => steepness,
                _ => return None,
            },
            Self::AdoptionMidpoint => match a.curve {
                AdoptionCurve::Logistic { midpoint, .. } => midpoint,
                _ => return None,
            },
            Self::NewConstructionRate => match a.curve {
                AdoptionCurve::NewConstruction { annual_rate } => annual_rate,
                _ => return None,
            },
            Self::SpreadCapex => bool_value(a.spread_capex),
            Self::IncentivePerHousehold => a.incentive.as_ref()?.total_per_household,
            Self::IncentiveYears => a.incentive.as_ref()?.duration_years as f64,
            Self::BehaviorInitial => params.persistence.initial(),
            Self::DecayRate => match &params.persistence {
                PersistenceRegime::Realistic { decay_rate, .. }
                | PersistenceRegime::Pessimistic {
                    fadeout: Fadeout::Exponential { decay_rate },
                    ..
                } => *decay_rate,
                _ => return None,
            },
            Self::PlateauFloor => match &params.persistence {
                PersistenceRegime::Realistic { floor, .. } => *floor,
                _ => return None,
            },
            Self::AnyPrevalence => leaks?.any.prevalence,
            Self::AnyFlow => leaks?.any.flow_m3,
            Self::AnyRepairCost => leaks?.any.repair_cost,
            Self::SignificantPrevalence => leaks?.significant.prevalence,
            Self::SignificantFlow => leaks?.significant.flow_m3,
            Self::SignificantRepairCost => leaks?.significant.repair_cost,
            Self::DetectionRate => leaks?.baseline_detection,
            Self::RepairRate => leaks?.baseline_repair,
            Self::NaturalDuration => leaks?.natural_duration_years,
            Self::PersistentPrevalence => leaks?.long_tail.prevalence,
            Self::DurationMultiplier => leaks?.long_tail.duration_multiplier,
            Self::MunicipalShare => leaks?.allocation.municipal_share()?,
            Self::Differentiated => bool_value(leaks?.differentiated),
            Self::SocialValue => params.water_value.social_value,
            Self::VariableCost => params.water_value.variable_cost,
            Self::SocialDiscountRate => params.discount_rates.social,
            Self::MunicipalDiscountRate => params.discount_rates.municipal,
            Self::Horizon => params.horizon as f64,
        };
        Some(value)
    }

    /// Write `value` into the builder. Range checks are left to `build()`.
    pub(crate) fn apply(&self, builder: &mut ParameterSetBuilder, value: OverrideValue) -> Result<()> {
        match self {
            Self::HouseholdCount => builder.households.households = self.whole(value)? as u64,
            Self::PersonsPerHousehold => builder.households.persons_per_household = self.number(value)?,
            Self::PerCapitaLpcd => builder.households.per_capita_lpcd = self.number(value)?,
            Self::MeterCost => builder.meter.meter_cost = self.number(value)?,
            Self::InstallHours => builder.meter.install_hours = self.number(value)?,
            Self::HourlyRate => builder.meter.hourly_rate = self.number(value)?,
            Self::NetworkCost => builder.meter.network_cost = self.number(value)?,
            Self::MaintenanceCost => builder.meter.maintenance_cost = self.number(value)?,
            Self::ReadingCost => builder.meter.reading_cost = self.number(value)?,
            Self::BehaviorEfficiency => builder.meter.behavior_efficiency = self.number(value)?,
            Self::LeakDetectionEfficiency => {
                builder.meter.leak_detection_efficiency = self.number(value)?;
            }
            Self::AdoptionStartYear => builder.adoption.start_year = self.whole(value)? as u32,
            Self::AdoptionCeiling => builder.adoption.ceiling = self.number(value)?,
            Self::AdoptionSteepness => {
                let x = self.number(value)?;
                match &mut builder.adoption.curve {
                    AdoptionCurve::Logistic { steepness, .. } => *steepness = x,
                    _ => return Err(self.inapplicable("adoption curve is not logistic")),
                }
            }
            Self::AdoptionMidpoint => {
                let x = self.number(value)?;
                match &mut builder.adoption.curve {
                    AdoptionCurve::Logistic { midpoint, .. } => *midpoint = x,
                    _ => return Err(self.inapplicable("adoption curve is not logistic")),
                }
            }
            Self::NewConstructionRate => {
                let x = self.number(value)?;
                match &mut builder.adoption.curve {
                    AdoptionCurve::NewConstruction { annual_rate } => *annual_rate = x,
                    _ => return Err(self.inapplicable("adoption curve is not new-construction")),
                }
            }
            Self::SpreadCapex => builder.adoption.spread_capex = self.flag(value)?,
            Self::IncentivePerHousehold => {
                let x = self.number(value)?;
                if x == 0.0 {
                    builder.adoption.incentive = None;
                } else {
                    let duration_years = builder
                        .adoption
                        .incentive
                        .as_ref()
                        .map_or(1, |i| i.duration_years);
                    builder.adoption.incentive = Some(Incentive {
                        total_per_household: x,
                        duration_years,
                    });
                }
            }
            Self::IncentiveYears => {
                let years = self.whole(value)? as u32;
                match &mut builder.adoption.incentive {
                    Some(incentive) => incentive.duration_years = years,
                    None => return Err(self.inapplicable("no incentive is configured")),
                }
            }
            Self::BehaviorInitial => {
                let x = self.number(value)?;
                match &mut builder.persistence {
                    PersistenceRegime::Optimistic { initial }
                    | PersistenceRegime::Realistic { initial, .. }
                    | PersistenceRegime::Pessimistic { initial, .. } => *initial = x,
                }
            }
            Self::DecayRate => {
                let x = self.number(value)?;
                match &mut builder.persistence {
                    PersistenceRegime::Realistic { decay_rate, .. }
                    | PersistenceRegime::Pessimistic {
                        fadeout: Fadeout::Exponential { decay_rate },
                        ..
                    } => *decay_rate = x,
                    _ => return Err(self.inapplicable("persistence regime has no decay rate")),
                }
            }
            Self::PlateauFloor => {
                let x = self.number(value)?;
                match &mut builder.persistence {
                    PersistenceRegime::Realistic { floor, .. } => *floor = x,
                    _ => return Err(self.inapplicable("persistence regime has no plateau")),
                }
            }
            Self::AnyPrevalence => self.leaks_mut(builder)?.any.prevalence = self.number(value)?,
            Self::AnyFlow => self.leaks_mut(builder)?.any.flow_m3 = self.number(value)?,
            Self::AnyRepairCost => self.leaks_mut(builder)?.any.repair_cost = self.number(value)?,
            Self::SignificantPrevalence => {
                self.leaks_mut(builder)?.significant.prevalence = self.number(value)?;
            }
            Self::SignificantFlow => {
                self.leaks_mut(builder)?.significant.flow_m3 = self.number(value)?;
            }
            Self::SignificantRepairCost => {
                self.leaks_mut(builder)?.significant.repair_cost = self.number(value)?;
            }
            Self::DetectionRate => self.leaks_mut(builder)?.baseline_detection = self.number(value)?,
            Self::RepairRate => self.leaks_mut(builder)?.baseline_repair = self.number(value)?,
            Self::NaturalDuration => {
                self.leaks_mut(builder)?.natural_duration_years = self.number(value)?;
            }
            Self::PersistentPrevalence => {
                self.leaks_mut(builder)?.long_tail.prevalence = self.number(value)?;
            }
            Self::DurationMultiplier => {
                self.leaks_mut(builder)?.long_tail.duration_multiplier = self.number(value)?;
            }
            Self::MunicipalShare => {
                let x = self.number(value)?;
                match &mut self.leaks_mut(builder)?.allocation {
                    RepairCostAllocation::Shared { municipal_share } => *municipal_share = x,
                    RepairCostAllocation::Excluded => {
                        return Err(self.inapplicable("repair costs are excluded"));
                    }
                }
            }
            Self::Differentiated => self.leaks_mut(builder)?.differentiated = self.flag(value)?,
            Self::SocialValue => builder.water_value.social_value = self.number(value)?,
            Self::VariableCost => builder.water_value.variable_cost = self.number(value)?,
            Self::SocialDiscountRate => builder.discount_rates.social = self.number(value)?,
            Self::MunicipalDiscountRate => builder.discount_rates.municipal = self.number(value)?,
            Self::Horizon => builder.horizon = self.whole(value)? as u32,
        }
        Ok(())
    }

    fn number(&self, value: OverrideValue) -> Result<f64> {
        match value {
            OverrideValue::Number(x) if x.is_finite() => Ok(x),
            OverrideValue::Number(_) => Err(self.invalid("must be finite")),
            OverrideValue::Flag(_) => Err(self.invalid("expected a number")),
        }
    }

    fn whole(&self, value: OverrideValue) -> Result<f64> {
        let x = self.number(value)?;
        if x < 0.0 {
            return Err(self.invalid("must be a non-negative whole number"));
        }
        Ok(x.round())
    }

    fn flag(&self, value: OverrideValue) -> Result<bool> {
        match value {
            OverrideValue::Flag(flag) => Ok(flag),
            OverrideValue::Number(_) => Err(self.invalid("expected true or false")),
        }
    }

    fn leaks_mut<'a>(
        &self,
        builder: &'a mut ParameterSetBuilder,
    ) -> Result<&'a mut crate::model::LeakParameters> {
        builder
            .leaks
            .as_mut()
            .ok_or_else(|| self.inapplicable("leak model is disabled"))
    }

    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidOverrideValue {
            key: *self,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn inapplicable(&self, reason: &str) -> ConfigError {
        ConfigError::InapplicableOverride {
            key: *self,
            reason: reason.to_string(),
        }
    }
}

fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_roundtrip() {
        for key in ParamKey::ALL {
            let parsed: ParamKey = key.as_str().parse().unwrap();
            assert_eq!(parsed, *key);
        }
        assert!("households.pets".parse::<ParamKey>().is_err());
    }

    #[test]
    fn test_key_serde_uses_dotted_name() {
        let json = serde_json::to_string(&ParamKey::PerCapitaLpcd).unwrap();
        assert_eq!(json, "\"households.per_capita_lpcd\"");
    }

    #[test]
    fn test_override_value_untagged() {
        let flag: OverrideValue = serde_json::from_str("true").unwrap();
        let number: OverrideValue = serde_json::from_str("0.25").unwrap();
        assert_eq!(flag, OverrideValue::Flag(true));
        assert_eq!(number, OverrideValue::Number(0.25));
    }
}
