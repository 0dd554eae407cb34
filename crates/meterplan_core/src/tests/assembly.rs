//! Tests for parameter set assembly and validation

use crate::config::{
    OverrideValue, ParamKey, ParameterSet, ParameterSetBuilder, PresetCategory, PresetSelection,
    ScenarioSpec,
};
use crate::error::ConfigError;
use crate::model::{AdoptionPlan, CostPerspective, LeakParameters, PersistenceRegime};

fn fields(err: &ConfigError) -> Vec<&str> {
    err.violations().iter().map(|v| v.field.as_str()).collect()
}

#[test]
fn test_default_spec_assembles() {
    let params = ParameterSet::assemble(&ScenarioSpec::default()).unwrap();
    assert_eq!(params.horizon(), 20);
    assert_eq!(params.households().households, 10_000);
    assert_eq!(params.perspective(), CostPerspective::Economic);
    assert!(params.leaks().is_some());
}

#[test]
fn test_prevalence_out_of_range_is_rejected() {
    let err = ParameterSetBuilder::new()
        .with_override(ParamKey::AnyPrevalence, 1.5)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
    assert!(fields(&err).contains(&"leaks.any_prevalence"), "{err}");
}

#[test]
fn test_incentive_longer_than_horizon_is_rejected() {
    let err = ParameterSetBuilder::new()
        .adoption(AdoptionPlan::logistic(0.6, 5.0, 0.85).with_incentive(180.0, 12))
        .years(10)
        .build()
        .unwrap_err();
    assert!(fields(&err).contains(&"adoption.incentive_years"), "{err}");
}

#[test]
fn test_persistent_fraction_above_total_prevalence_is_rejected() {
    let mut leaks = LeakParameters::default();
    leaks.long_tail.prevalence = 0.5;
    let err = ParameterSetBuilder::new().leaks(leaks).build().unwrap_err();
    assert!(
        fields(&err).contains(&"leaks.persistent_prevalence"),
        "{err}"
    );
}

#[test]
fn test_discount_rate_must_exceed_minus_one() {
    let err = ParameterSetBuilder::new()
        .discount_rate(-1.0)
        .build()
        .unwrap_err();
    let f = fields(&err);
    assert!(f.contains(&"discount.social"), "{err}");
    assert!(f.contains(&"discount.municipal"), "{err}");
}

#[test]
fn test_negative_discount_rate_is_rejected() {
    let err = ParameterSetBuilder::new()
        .discount_rate(-0.01)
        .build()
        .unwrap_err();
    let f = fields(&err);
    assert!(f.contains(&"discount.social"), "{err}");
    assert!(f.contains(&"discount.municipal"), "{err}");

    let zero = ParameterSetBuilder::new().discount_rate(0.0).build();
    assert!(zero.is_ok());
}

#[test]
fn test_every_violation_is_reported() {
    let err = ParameterSetBuilder::new()
        .with_override(ParamKey::BehaviorEfficiency, 2.0)
        .unwrap()
        .with_override(ParamKey::AdoptionCeiling, 0.0)
        .unwrap()
        .with_override(ParamKey::MeterCost, -10.0)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(err.violations().len() >= 3, "{err}");
}

#[test]
fn test_unknown_preset() {
    let spec = ScenarioSpec::default().with_preset(PresetCategory::Persistence, "eternal");
    let err = ParameterSet::assemble(&spec).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnknownPreset {
            category: PresetCategory::Persistence,
            name: "eternal".to_string(),
        }
    );
}

#[test]
fn test_override_on_inactive_mode_is_inapplicable() {
    let spec = ScenarioSpec::default().with_override(ParamKey::AdoptionSteepness, 1.0);
    let err = ParameterSet::assemble(&spec).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InapplicableOverride {
            key: ParamKey::AdoptionSteepness,
            ..
        }
    ));
}

#[test]
fn test_flag_key_rejects_number() {
    let spec = ScenarioSpec::default().with_override(ParamKey::Differentiated, 1.0);
    let err = ParameterSet::assemble(&spec).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOverrideValue { .. }));
}

#[test]
fn test_with_override_leaves_baseline_untouched() {
    let base = super::reference();
    let before = base.clone();
    let variant = base
        .with_override(ParamKey::PerCapitaLpcd, OverrideValue::Number(300.0))
        .unwrap();
    assert_eq!(base, before);
    assert_eq!(variant.households().per_capita_lpcd, 300.0);
    assert_eq!(ParamKey::PerCapitaLpcd.get(&base), Some(250.0));
}

#[test]
fn test_presets_and_overrides_merge() {
    let spec = ScenarioSpec::from_presets(PresetSelection {
        households: "longueuil".to_string(),
        persistence: "optimistic".to_string(),
        ..PresetSelection::default()
    })
    .with_override(ParamKey::BehaviorInitial, 0.10)
    .perspective(CostPerspective::Financial);

    let params = ParameterSet::assemble(&spec).unwrap();
    assert_eq!(params.households().households, 116_258);
    assert_eq!(
        params.persistence(),
        &PersistenceRegime::Optimistic { initial: 0.10 }
    );
    assert_eq!(params.discount_rate(), params.discount_rates().municipal);
    assert_eq!(params.water_value_per_m3(), params.water_value().variable_cost);
}

#[test]
fn test_spec_round_trips_through_json() {
    let spec = ScenarioSpec::default()
        .named("longueuil")
        .with_override(ParamKey::Differentiated, false)
        .with_override(ParamKey::SocialDiscountRate, 0.04);
    let json = serde_json::to_string(&spec).unwrap();
    assert!(json.contains("\"leaks.differentiated\":false"), "{json}");
    let back: ScenarioSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
}

#[test]
fn test_spec_fields_default_when_missing() {
    let spec: ScenarioSpec = serde_json::from_str(r#"{"presets": {"meter": "manual"}}"#).unwrap();
    assert_eq!(spec.horizon, 20);
    assert_eq!(spec.presets.meter, "manual");
    assert_eq!(spec.presets.households, "reference");
    assert_eq!(spec.presets.leaks.as_deref(), Some("household"));
    assert!(ParameterSet::assemble(&spec).is_ok());
}

#[test]
fn test_calibration_warning_does_not_block_build() {
    // Far outside the recommended range, still a valid fraction
    let params = ParameterSetBuilder::new()
        .with_override(ParamKey::BehaviorInitial, 0.5)
        .unwrap()
        .build();
    assert!(params.is_ok());
    let warnings = crate::calibration::check(&params.unwrap());
    assert!(warnings.iter().any(|w| w.key == ParamKey::BehaviorInitial));
}
