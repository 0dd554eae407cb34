//! Scenario configuration
//!
//! A [`ParameterSet`] holds everything one scenario run needs. It can only be
//! produced by [`ParameterSetBuilder::build`] or [`ParameterSet::assemble`],
//! both of which validate every range and consistency rule first, so a
//! `ParameterSet` in hand is always runnable. It is read-only afterwards:
//! sweep variants are derived with [`ParameterSet::with_override`] or
//! [`ParameterSet::to_builder`], which return new instances.
//!
//! ```ignore
//! use meterplan_core::config::{ParameterSetBuilder, ParamKey};
//! use meterplan_core::model::{AdoptionPlan, CostPerspective};
//!
//! let params = ParameterSetBuilder::new()
//!     .household_preset("longueuil")?
//!     .adoption(AdoptionPlan::logistic(0.6, 5.0, 0.85).with_incentive(180.0, 3))
//!     .perspective(CostPerspective::Financial)
//!     .discount_rate(0.04)
//!     .years(25)
//!     .build()?;
//!
//! let variant = params.with_override(ParamKey::PerCapitaLpcd, 300.0.into())?;
//! ```

use serde::Serialize;

use crate::error::Result;
use crate::model::{
    AdoptionPlan, CostPerspective, DiscountRates, HouseholdStock, InfrastructureDeferral,
    LeakParameters, MeterType, NetworkLeakParameters, PersistenceRegime, RevenueRecovery,
    ScaleEconomies, WaterValue,
};

pub mod builder;
pub mod canonical;
pub mod overrides;
pub mod presets;
mod validate;

pub use builder::{ComponentOverrides, ParameterSetBuilder, PresetSelection, ScenarioSpec};
pub use canonical::{CanonicalScenario, canonical_scenarios};
pub use overrides::{OverrideValue, ParamKey};
pub use presets::{PresetCategory, PresetInfo, preset_catalog};

/// Longest supported horizon (years).
pub const MAX_HORIZON: u32 = 100;

pub(crate) fn default_horizon() -> u32 {
    20
}

/// Validated, immutable configuration of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
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

impl ParameterSet {
    /// Merge the presets and overrides of `spec` into a validated parameter set.
    pub fn assemble(spec: &ScenarioSpec) -> Result<Self> {
        ParameterSetBuilder::from_spec(spec)?.build()
    }

    /// Builder seeded with this set's values, for deriving variants.
    #[must_use]
    pub fn to_builder(&self) -> ParameterSetBuilder {
        ParameterSetBuilder::from(self.clone())
    }

    /// New parameter set with one field replaced.
    pub fn with_override(&self, key: ParamKey, value: OverrideValue) -> Result<Self> {
        let mut builder = self.to_builder();
        builder.set(key, value)?;
        builder.build()
    }

    /// Same physical parameters under another cost perspective.
    ///
    /// Both discount rates are validated at construction, so this cannot fail.
    #[must_use]
    pub fn with_perspective(&self, perspective: CostPerspective) -> Self {
        Self {
            perspective,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn households(&self) -> &HouseholdStock {
        &self.households
    }

    #[must_use]
    pub fn meter(&self) -> &MeterType {
        &self.meter
    }

    #[must_use]
    pub fn scale_economies(&self) -> Option<&ScaleEconomies> {
        self.scale_economies.as_ref()
    }

    #[must_use]
    pub fn adoption(&self) -> &AdoptionPlan {
        &self.adoption
    }

    #[must_use]
    pub fn persistence(&self) -> &PersistenceRegime {
        &self.persistence
    }

    #[must_use]
    pub fn leaks(&self) -> Option<&LeakParameters> {
        self.leaks.as_ref()
    }

    #[must_use]
    pub fn network(&self) -> Option<&NetworkLeakParameters> {
        self.network.as_ref()
    }

    #[must_use]
    pub fn water_value(&self) -> &WaterValue {
        &self.water_value
    }

    #[must_use]
    pub fn perspective(&self) -> CostPerspective {
        self.perspective
    }

    #[must_use]
    pub fn discount_rates(&self) -> &DiscountRates {
        &self.discount_rates
    }

    /// Discount rate of the active perspective.
    #[must_use]
    pub fn discount_rate(&self) -> f64 {
        self.discount_rates.for_perspective(self.perspective)
    }

    /// Last year index; series have `horizon + 1` entries.
    #[must_use]
    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    #[must_use]
    pub fn infrastructure(&self) -> Option<&InfrastructureDeferral> {
        self.infrastructure.as_ref()
    }

    #[must_use]
    pub fn revenue(&self) -> Option<&RevenueRecovery> {
        self.revenue.as_ref()
    }

    /// Value of one saved m³ under the active perspective.
    #[must_use]
    pub fn water_value_per_m3(&self) -> f64 {
        self.water_value.per_m3(self.perspective)
    }

    /// Capital cost per meter after economies of scale.
    #[must_use]
    pub fn unit_capex(&self) -> f64 {
        let factor = self
            .scale_economies
            .as_ref()
            .map_or(1.0, |s| s.factor(self.households.households));
        self.meter.scaled_unit_capex(factor)
    }
}
