//! Fluent builder and serde scenario description.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::overrides::{OverrideValue, ParamKey};
use super::presets::{
    PresetCategory, adoption_preset, household_preset, leak_preset, meter_preset,
    persistence_preset, water_value_preset,
};
use super::{ParameterSet, default_horizon, validate};
use crate::calibration;
use crate::error::{ConfigError, Result};
use crate::model::{
    AdoptionPlan, CostPerspective, DiscountRates, HouseholdStock, InfrastructureDeferral,
    LeakParameters, MeterType, NetworkLeakParameters, PersistenceRegime, RevenueRecovery,
    ScaleEconomies, WaterValue,
};

fn default_households() -> String {
    "reference".to_string()
}

fn default_meter() -> String {
    "continuous-remote".to_string()
}

fn default_adoption() -> String {
    "mandatory".to_string()
}

fn default_persistence() -> String {
    "realistic".to_string()
}

fn default_leaks() -> Option<String> {
    Some("household".to_string())
}

fn default_water_value() -> String {
    "quebec".to_string()
}

/// Preset name chosen in each category. `leaks: None` disables the leak model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetSelection {
    #[serde(default = "default_households")]
    pub households: String,
    #[serde(default = "default_meter")]
    pub meter: String,
    #[serde(default = "default_adoption")]
    pub adoption: String,
    #[serde(default = "default_persistence")]
    pub persistence: String,
    #[serde(default = "default_leaks")]
    pub leaks: Option<String>,
    #[serde(default = "default_water_value")]
    pub water_value: String,
}

impl Default for PresetSelection {
    fn default() -> Self {
        Self {
            households: default_households(),
            meter: default_meter(),
            adoption: default_adoption(),
            persistence: default_persistence(),
            leaks: default_leaks(),
            water_value: default_water_value(),
        }
    }
}

/// Fully specified components that replace the matching preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentOverrides {
    #[serde(default)]
    pub households: Option<HouseholdStock>,
    #[serde(default)]
    pub meter: Option<MeterType>,
    #[serde(default)]
    pub adoption: Option<AdoptionPlan>,
    #[serde(default)]
    pub persistence: Option<PersistenceRegime>,
    #[serde(default)]
    pub leaks: Option<LeakParameters>,
    #[serde(default)]
    pub water_value: Option<WaterValue>,
}

/// External description of a scenario: presets, overrides and optional modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub presets: PresetSelection,
    #[serde(default)]
    pub components: ComponentOverrides,
    #[serde(default)]
    pub perspective: CostPerspective,
    #[serde(default = "default_horizon")]
    pub horizon: u32,
    #[serde(default)]
    pub discount_rates: Option<DiscountRates>,
    #[serde(default)]
    pub overrides: BTreeMap<ParamKey, OverrideValue>,
    #[serde(default)]
    pub scale_economies: Option<ScaleEconomies>,
    #[serde(default)]
    pub network: Option<NetworkLeakParameters>,
    #[serde(default)]
    pub infrastructure: Option<InfrastructureDeferral>,
    #[serde(default)]
    pub revenue: Option<RevenueRecovery>,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        Self::from_presets(PresetSelection::default())
    }
}

impl ScenarioSpec {
    /// Scenario built from presets only.
    #[must_use]
    pub fn from_presets(presets: PresetSelection) -> Self {
        Self {
            name: None,
            presets,
            components: ComponentOverrides::default(),
            perspective: CostPerspective::Economic,
            horizon: default_horizon(),
            discount_rates: None,
            overrides: BTreeMap::new(),
            scale_economies: None,
            network: None,
            infrastructure: None,
            revenue: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_override(mut self, key: ParamKey, value: impl Into<OverrideValue>) -> Self {
        self.overrides.insert(key, value.into());
        self
    }

    #[must_use]
    pub fn perspective(mut self, perspective: CostPerspective) -> Self {
        self.perspective = perspective;
        self
    }

    /// Select preset `name` in `category`, dropping any explicit component
    /// that would shadow it.
    #[must_use]
    pub fn with_preset(mut self, category: PresetCategory, name: &str) -> Self {
        let p = &mut self.presets;
        let c = &mut self.components;
        match category {
            PresetCategory::Households => {
                p.households = name.to_string();
                c.households = None;
            }
            PresetCategory::Meter => {
                p.meter = name.to_string();
                c.meter = None;
            }
            PresetCategory::Adoption => {
                p.adoption = name.to_string();
                c.adoption = None;
            }
            PresetCategory::Persistence => {
                p.persistence = name.to_string();
                c.persistence = None;
            }
            PresetCategory::Leaks => {
                p.leaks = Some(name.to_string());
                c.leaks = None;
            }
            PresetCategory::WaterValue => {
                p.water_value = name.to_string();
                c.water_value = None;
            }
        }
        self
    }
}

/// Fluent builder for [`ParameterSet`].
///
/// Setters never fail; every rule is checked once in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ParameterSetBuilder {
    pub(crate) households: HouseholdStock,
    pub(crate) meter: MeterType,
    pub(crate) scale_economies: Option<ScaleEconomies>,
    pub(crate) adoption: AdoptionPlan,
    pub(crate) persistence: PersistenceRegime,
    pub(crate) leaks: Option<LeakParameters>,
    pub(crate) network: Option<NetworkLeakParameters>,
    pub(crate) water_value: WaterValue,
    pub(crate) perspective: CostPerspective,
    pub(crate) discount_rates: DiscountRates,
    pub(crate) horizon: u32,
    pub(crate) infrastructure: Option<InfrastructureDeferral>,
    pub(crate) revenue: Option<RevenueRecovery>,
}

impl Default for ParameterSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ParameterSet> for ParameterSetBuilder {
    fn from(p: ParameterSet) -> Self {
        Self {
            households: p.households,
            meter: p.meter,
            scale_economies: p.scale_economies,
            adoption: p.adoption,
            persistence: p.persistence,
            leaks: p.leaks,
            network: p.network,
            water_value: p.water_value,
            perspective: p.perspective,
            discount_rates: p.discount_rates,
            horizon: p.horizon,
            infrastructure: p.infrastructure,
            revenue: p.revenue,
        }
    }
}

impl ParameterSetBuilder {
    /// Reference municipality, AMI meters, mandatory adoption, realistic
    /// persistence, household-paid leak repairs, economic perspective, 20 years.
    #[must_use]
    pub fn new() -> Self {
        Self {
            households: HouseholdStock::default(),
            meter: MeterType::default(),
            scale_economies: None,
            adoption: AdoptionPlan::default(),
            persistence: PersistenceRegime::default(),
            leaks: Some(LeakParameters::default()),
            network: None,
            water_value: WaterValue::default(),
            perspective: CostPerspective::Economic,
            discount_rates: DiscountRates::default(),
            horizon: default_horizon(),
            infrastructure: None,
            revenue: None,
        }
    }

    /// Builder seeded from named presets.
    pub fn from_presets(presets: &PresetSelection) -> Result<Self> {
        Ok(Self {
            households: household_preset(&presets.households)?,
            meter: meter_preset(&presets.meter)?,
            adoption: adoption_preset(&presets.adoption)?,
            persistence: persistence_preset(&presets.persistence)?,
            leaks: presets.leaks.as_deref().map(leak_preset).transpose()?,
            water_value: water_value_preset(&presets.water_value)?,
            ..Self::new()
        })
    }

    /// Builder seeded from a scenario description, overrides applied in key order.
    pub fn from_spec(spec: &ScenarioSpec) -> Result<Self> {
        let mut builder = Self::from_presets(&spec.presets)?;
        let c = &spec.components;
        if let Some(households) = &c.households {
            builder.households = households.clone();
        }
        if let Some(meter) = &c.meter {
            builder.meter = meter.clone();
        }
        if let Some(adoption) = &c.adoption {
            builder.adoption = adoption.clone();
        }
        if let Some(persistence) = &c.persistence {
            builder.persistence = persistence.clone();
        }
        if let Some(leaks) = &c.leaks {
            builder.leaks = Some(leaks.clone());
        }
        if let Some(water_value) = &c.water_value {
            builder.water_value = water_value.clone();
        }
        builder.perspective = spec.perspective;
        builder.horizon = spec.horizon;
        if let Some(rates) = &spec.discount_rates {
            builder.discount_rates = rates.clone();
        }
        builder.scale_economies = spec.scale_economies.clone();
        builder.network = spec.network.clone();
        builder.infrastructure = spec.infrastructure.clone();
        builder.revenue = spec.revenue.clone();

        for (key, value) in &spec.overrides {
            builder.set(*key, *value)?;
        }
        Ok(builder)
    }

    #[must_use]
    pub fn households(mut self, households: HouseholdStock) -> Self {
        self.households = households;
        self
    }

    pub fn household_preset(mut self, name: &str) -> Result<Self> {
        self.households = household_preset(name)?;
        Ok(self)
    }

    #[must_use]
    pub fn meter(mut self, meter: MeterType) -> Self {
        self.meter = meter;
        self
    }

    #[must_use]
    pub fn scale_economies(mut self, scale: ScaleEconomies) -> Self {
        self.scale_economies = Some(scale);
        self
    }

    #[must_use]
    pub fn adoption(mut self, plan: AdoptionPlan) -> Self {
        self.adoption = plan;
        self
    }

    #[must_use]
    pub fn persistence(mut self, regime: PersistenceRegime) -> Self {
        self.persistence = regime;
        self
    }

    #[must_use]
    pub fn leaks(mut self, leaks: LeakParameters) -> Self {
        self.leaks = Some(leaks);
        self
    }

    #[must_use]
    pub fn without_leaks(mut self) -> Self {
        self.leaks = None;
        self
    }

    #[must_use]
    pub fn network(mut self, network: NetworkLeakParameters) -> Self {
        self.network = Some(network);
        self
    }

    #[must_use]
    pub fn water_value(mut self, value: WaterValue) -> Self {
        self.water_value = value;
        self
    }

    #[must_use]
    pub fn perspective(mut self, perspective: CostPerspective) -> Self {
        self.perspective = perspective;
        self
    }

    #[must_use]
    pub fn discount_rates(mut self, rates: DiscountRates) -> Self {
        self.discount_rates = rates;
        self
    }

    /// Use the same rate for both perspectives.
    #[must_use]
    pub fn discount_rate(mut self, rate: f64) -> Self {
        self.discount_rates = DiscountRates {
            social: rate,
            municipal: rate,
        };
        self
    }

    #[must_use]
    pub fn years(mut self, horizon: u32) -> Self {
        self.horizon = horizon;
        self
    }

    #[must_use]
    pub fn infrastructure(mut self, deferral: InfrastructureDeferral) -> Self {
        self.infrastructure = Some(deferral);
        self
    }

    #[must_use]
    pub fn revenue(mut self, revenue: RevenueRecovery) -> Self {
        self.revenue = Some(revenue);
        self
    }

    /// Replace one scalar field.
    pub fn set(&mut self, key: ParamKey, value: OverrideValue) -> Result<()> {
        key.apply(self, value)
    }

    /// Chainable form of [`set`](Self::set).
    pub fn with_override(mut self, key: ParamKey, value: impl Into<OverrideValue>) -> Result<Self> {
        self.set(key, value.into())?;
        Ok(self)
    }

    /// Validate and freeze.
    pub fn build(self) -> Result<ParameterSet> {
        let violations = validate::validate(&self);
        if !violations.is_empty() {
            return Err(ConfigError::Validation { violations });
        }

        let params = ParameterSet {
            households: self.households,
            meter: self.meter,
            scale_economies: self.scale_economies,
            adoption: self.adoption,
            persistence: self.persistence,
            leaks: self.leaks,
            network: self.network,
            water_value: self.water_value,
            perspective: self.perspective,
            discount_rates: self.discount_rates,
            horizon: self.horizon,
            infrastructure: self.infrastructure,
            revenue: self.revenue,
        };

        for warning in calibration::check(&params) {
            tracing::warn!(
                parameter = warning.key.as_str(),
                value = warning.value,
                low = warning.recommended.0,
                high = warning.recommended.1,
                "parameter outside its calibrated range"
            );
        }
        Ok(params)
    }
}
