//! Tests for discounting and scenario indicators

use crate::config::ParameterSetBuilder;
use crate::discount::present_value;
use crate::model::{CostPerspective, MeterType, Payback, Ratio};
use crate::simulation::run_scenario;

use super::assert_close;

#[test]
fn test_reference_scenario_indicators() {
    let result = run_scenario(&super::reference());
    assert!(result.npv.is_finite());
    assert!(result.npv > 0.0, "npv {}", result.npv);

    let bcr = result.bcr.value().expect("costs are positive");
    assert!(bcr > 1.0 && bcr < 2.0, "bcr {bcr}");

    let payback = result
        .discounted_payback_year
        .year()
        .expect("reference pays back within 20 years");
    assert!((1..=20).contains(&payback), "payback {payback}");

    let lcow = result.lcow.value().expect("water is saved");
    assert!(lcow > 0.0 && lcow.is_finite());
}

#[test]
fn test_reference_scenario_is_reproducible() {
    let first = run_scenario(&super::reference());
    for _ in 0..3 {
        let again = run_scenario(&super::reference());
        assert_close(again.npv, first.npv, 1e-6, "npv");
        assert_eq!(again, first);
    }
}

#[test]
fn test_npv_equals_pv_benefits_minus_pv_costs() {
    let result = run_scenario(&super::reference());
    let t = &result.trajectory;
    let pv_b = present_value(&t.total_benefits, &t.discount_factors);
    let pv_c = present_value(&t.total_costs, &t.discount_factors);
    assert_close(result.npv, pv_b - pv_c, 1e-12, "npv");
    assert_close(result.indicators.pv_benefits, pv_b, 1e-12, "pv benefits");
    assert_close(
        *t.cumulative_npv.last().unwrap(),
        result.npv,
        1e-9,
        "cumulative npv",
    );

    let breakdown_total: f64 = result
        .cost_breakdown
        .values()
        .map(|c| c.present_value)
        .sum();
    assert_close(breakdown_total, pv_c, 1e-9, "cost breakdown");
}

#[test]
fn test_higher_discount_rate_lowers_present_values() {
    let mut previous: Option<(f64, f64)> = None;
    for rate in [0.0, 0.01, 0.03, 0.05, 0.08, 0.12] {
        let params = ParameterSetBuilder::new().discount_rate(rate).build().unwrap();
        let result = run_scenario(&params);
        let current = (result.indicators.pv_benefits, result.indicators.pv_costs);
        if let Some((b, c)) = previous {
            assert!(current.0 < b, "PV(B) not decreasing at {rate}");
            assert!(current.1 < c, "PV(C) not decreasing at {rate}");
        }
        previous = Some(current);
    }
}

#[test]
fn test_bcr_not_applicable_without_costs() {
    let free = MeterType {
        meter_cost: 0.0,
        install_hours: 0.0,
        network_cost: 0.0,
        maintenance_cost: 0.0,
        reading_cost: 0.0,
        battery: None,
        ..MeterType::continuous_remote()
    };
    let params = ParameterSetBuilder::new()
        .meter(free)
        .without_leaks()
        .build()
        .unwrap();
    let result = run_scenario(&params);
    assert_eq!(result.bcr, Ratio::NotApplicable);
    assert_eq!(result.discounted_payback_year, Payback::Year(0));
    assert!(result.npv > 0.0);
}

#[test]
fn test_lcow_is_independent_of_water_value() {
    let low = run_scenario(
        &ParameterSetBuilder::new()
            .with_override(crate::config::ParamKey::SocialValue, 2.0)
            .unwrap()
            .build()
            .unwrap(),
    );
    let high = run_scenario(
        &ParameterSetBuilder::new()
            .with_override(crate::config::ParamKey::SocialValue, 8.0)
            .unwrap()
            .build()
            .unwrap(),
    );
    assert_eq!(low.lcow, high.lcow);
    assert!(high.npv > low.npv);
}

#[test]
fn test_break_even_value_zeroes_npv() {
    let base = super::reference();
    let result = run_scenario(&base);
    let break_even = result
        .indicators
        .break_even_value_per_m3
        .value()
        .unwrap();
    let at_break_even = run_scenario(
        &base
            .with_override(crate::config::ParamKey::SocialValue, break_even.into())
            .unwrap(),
    );
    assert!(
        at_break_even.npv.abs() < 1e-6 * result.indicators.pv_costs,
        "npv at break-even {}",
        at_break_even.npv
    );
}

#[test]
fn test_interpolated_payback_within_payback_year() {
    let result = run_scenario(&super::reference());
    let year = result.discounted_payback_year.year().unwrap() as f64;
    let fractional = result.indicators.interpolated_payback.unwrap();
    assert!(fractional <= year && fractional > year - 1.0, "{fractional} vs {year}");
}

#[test]
fn test_financial_reference_does_not_pay_back() {
    let params = super::reference().with_perspective(CostPerspective::Financial);
    let result = run_scenario(&params);
    assert!(result.npv < 0.0);
    assert_eq!(result.discounted_payback_year, Payback::Never);
    assert_eq!(result.indicators.interpolated_payback, None);
}

#[test]
fn test_eac_per_household_uses_capital_recovery() {
    let result = run_scenario(&super::reference());
    let crf = crate::discount::capital_recovery_factor(0.05, 21);
    assert_close(
        result.indicators.eac_per_household,
        result.indicators.pv_costs * crf / 10_000.0,
        1e-12,
        "eac",
    );
}
