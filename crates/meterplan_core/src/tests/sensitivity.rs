//! Tests for sensitivity sweeps

use crate::analysis::{
    PresetAxis, ScenarioCase, SweepParameter, SweepProgress, TornadoConfig, UncertaintyConfig,
    Variation, VariantOutcome, apply_case, compare_perspectives, preset_grid, preset_sweep,
    scenario_analysis, tornado, uncertainty,
};
use crate::config::{ParamKey, PresetCategory, ScenarioSpec};
use crate::error::{ConfigError, SweepError};
use crate::model::{CostCategory, CostPerspective};
use crate::simulation::run_scenario;

use super::assert_close;

#[test]
fn test_tornado_rows_sorted_by_swing() {
    let base = super::reference();
    let results = tornado(&base, &TornadoConfig::default(), None).unwrap();
    assert!(!results.rows.is_empty());
    assert_close(results.base.npv, run_scenario(&base).npv, 1e-12, "baseline");
    for pair in results.rows.windows(2) {
        assert!(pair[0].swing() >= pair[1].swing());
    }
    assert_eq!(
        results.rows.len() + results.failures.len(),
        TornadoConfig::default().parameters.len()
    );
    assert!(results.not_run.is_empty());
}

#[test]
fn test_tornado_row_values() {
    let base = super::reference();
    let config = TornadoConfig {
        parameters: vec![SweepParameter::relative(ParamKey::MeterCost, 0.1)],
    };
    let results = tornado(&base, &config, None).unwrap();
    let row = &results.rows[0];
    assert_eq!(row.key, ParamKey::MeterCost);
    assert_eq!(row.base_value, 250.0);
    assert_close(row.low.value, 225.0, 1e-12, "low");
    assert_close(row.high.value, 275.0, 1e-12, "high");
    // Cheaper meters raise NPV
    assert!(row.low.delta_npv > 0.0 && row.high.delta_npv < 0.0);
    assert!(row.elasticity.unwrap() < 0.0);
    assert!(row.low.delta_bcr.unwrap() > 0.0);
}

#[test]
fn test_tornado_inapplicable_key_is_reported_not_fatal() {
    let base = super::reference();
    let config = TornadoConfig {
        parameters: vec![
            SweepParameter::relative(ParamKey::AdoptionSteepness, 0.2),
            SweepParameter::absolute(ParamKey::SocialValue, 3.0, 6.0),
        ],
    };
    let results = tornado(&base, &config, None).unwrap();
    assert_eq!(results.rows.len(), 1);
    assert_eq!(results.failures.len(), 1);
    assert_eq!(results.failures[0].0, ParamKey::AdoptionSteepness);
    assert!(matches!(
        results.failures[0].1,
        ConfigError::InapplicableOverride { .. }
    ));
}

#[test]
fn test_tornado_invalid_variant_carries_error() {
    let base = super::reference();
    let config = TornadoConfig {
        parameters: vec![SweepParameter {
            key: ParamKey::AnyPrevalence,
            variation: Variation::Absolute {
                low: 0.1,
                high: 1.5,
            },
        }],
    };
    let results = tornado(&base, &config, None).unwrap();
    assert!(results.rows.is_empty());
    assert!(matches!(
        results.failures[0].1,
        ConfigError::Validation { .. }
    ));
}

#[test]
fn test_elasticity_absent_when_baseline_value_is_zero() {
    let base = super::reference();
    let config = TornadoConfig {
        parameters: vec![SweepParameter::absolute(ParamKey::ReadingCost, 0.0, 10.0)],
    };
    let results = tornado(&base, &config, None).unwrap();
    assert_eq!(results.rows[0].base_value, 0.0);
    assert_eq!(results.rows[0].elasticity, None);
}

#[test]
fn test_empty_tornado_is_an_error() {
    let config = TornadoConfig { parameters: vec![] };
    let err = tornado(&super::reference(), &config, None).unwrap_err();
    assert_eq!(err, SweepError::EmptySweep);
}

#[test]
fn test_cancelled_sweep_runs_nothing() {
    let progress = SweepProgress::new(0);
    progress.cancel();
    let err = tornado(&super::reference(), &TornadoConfig::default(), Some(&progress));
    assert_eq!(err.unwrap_err(), SweepError::Cancelled);
    assert_eq!(progress.completed(), 0);
}

#[test]
fn test_progress_counts_variants() {
    let progress = SweepProgress::default();
    let config = TornadoConfig::default();
    let results = tornado(&super::reference(), &config, Some(&progress)).unwrap();
    assert!(progress.total() > 0);
    assert_eq!(progress.completed(), progress.total());
    assert!(progress.total() <= results.rows.len() + results.failures.len());
}

#[test]
fn test_perspective_comparison_shares_physical_inputs() {
    let comparison = compare_perspectives(&super::reference());
    assert_eq!(comparison.economic.perspective, CostPerspective::Economic);
    assert_eq!(comparison.financial.perspective, CostPerspective::Financial);
    assert_eq!(
        comparison.economic.trajectory.saved_m3,
        comparison.financial.trajectory.saved_m3
    );
    assert_eq!(
        comparison.economic.trajectory.costs[&CostCategory::Capex],
        comparison.financial.trajectory.costs[&CostCategory::Capex]
    );
    assert!(comparison.npv_gap() < 0.0);
}

#[test]
fn test_persistence_preset_sweep_is_ordered() {
    let variants = preset_sweep(&ScenarioSpec::default(), PresetCategory::Persistence, None).unwrap();
    let names: Vec<_> = variants.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["optimistic", "realistic", "pessimistic"]);
    let npv = |i: usize| variants[i].outcome.completed().unwrap().npv;
    assert!(npv(0) > npv(1) && npv(1) > npv(2));
}

#[test]
fn test_preset_grid_covers_cartesian_product() {
    let axes = vec![
        PresetAxis::all(PresetCategory::Persistence),
        PresetAxis::all(PresetCategory::Leaks),
    ];
    let results = preset_grid(&ScenarioSpec::default(), &axes, None).unwrap();
    let persistence = PresetCategory::Persistence.names().len();
    let leaks = PresetCategory::Leaks.names().len();
    assert_eq!(results.outcomes.shape(), &[persistence, leaks]);
    assert_eq!(results.completed_count(), persistence * leaks);
    assert_eq!(
        results.names_at(&[2, 0]),
        Some(vec!["pessimistic", PresetCategory::Leaks.names()[0]])
    );
}

#[test]
fn test_preset_grid_records_unknown_names_per_cell() {
    let axes = vec![PresetAxis::new(
        PresetCategory::Meter,
        vec!["manual".to_string(), "smart-dust".to_string()],
    )];
    let results = preset_grid(&ScenarioSpec::default(), &axes, None).unwrap();
    assert!(results.outcomes.get(&[0]).unwrap().is_completed());
    assert!(matches!(
        results.outcomes.get(&[1]).unwrap(),
        VariantOutcome::Failed(ConfigError::UnknownPreset { .. })
    ));
}

#[test]
fn test_preset_grid_rejects_empty_axes() {
    let err = preset_grid(&ScenarioSpec::default(), &[], None).unwrap_err();
    assert_eq!(err, SweepError::EmptySweep);
}

#[test]
fn test_scenario_cases_bracket_the_base() {
    let cases = scenario_analysis(&super::reference());
    let npv = |case: ScenarioCase| {
        cases
            .iter()
            .find(|c| c.case == case)
            .and_then(|c| c.outcome.completed())
            .map(|s| s.npv)
            .unwrap()
    };
    assert!(npv(ScenarioCase::Pessimistic) < npv(ScenarioCase::Base));
    assert!(npv(ScenarioCase::Base) < npv(ScenarioCase::Optimistic));
}

#[test]
fn test_base_case_is_unchanged() {
    let base = super::reference();
    assert_eq!(apply_case(&base, ScenarioCase::Base).unwrap(), base);
}

#[test]
fn test_uncertainty_is_deterministic_for_a_seed() {
    let base = super::reference();
    let config = UncertaintyConfig {
        draws: 200,
        seed: 7,
        ..UncertaintyConfig::default()
    };
    let first = uncertainty(&base, &config, None).unwrap();
    let second = uncertainty(&base, &config, None).unwrap();
    assert_eq!(first, second);
    assert!(first.accepted > 0 && first.accepted <= 200);

    let p5 = first.percentile(0.05).unwrap();
    let p50 = first.percentile(0.50).unwrap();
    let p95 = first.percentile(0.95).unwrap();
    assert!(p5 <= p50 && p50 <= p95);
    assert!((0.0..=1.0).contains(&first.probability_positive));
}

#[test]
fn test_uncertainty_skips_inactive_keys() {
    let base = super::reference()
        .to_builder()
        .without_leaks()
        .build()
        .unwrap();
    let summary = uncertainty(&base, &UncertaintyConfig::default(), None).unwrap();
    assert!(!summary.sampled_keys.contains(&ParamKey::AnyPrevalence));
    assert!(summary.sampled_keys.contains(&ParamKey::BehaviorInitial));
}

#[test]
fn test_uncertainty_without_sampleable_keys_is_empty() {
    let config = UncertaintyConfig {
        keys: vec![ParamKey::HouseholdCount],
        ..UncertaintyConfig::default()
    };
    let err = uncertainty(&super::reference(), &config, None).unwrap_err();
    assert_eq!(err, SweepError::EmptySweep);
}
