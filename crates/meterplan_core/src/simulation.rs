//! Scenario runner: trajectory generation followed by discounting.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::ParameterSet;
use crate::discount::{self, DiscountInputs, category_totals, is_volume_independent};
use crate::model::{ScenarioResult, Trajectory};
use crate::trajectory;

/// Run one scenario to completion.
///
/// Deterministic and free of shared state: the same parameter set always
/// yields the same result.
#[must_use]
pub fn run_scenario(params: &ParameterSet) -> ScenarioResult {
    let span = tracing::debug_span!(
        "run_scenario",
        perspective = params.perspective().label(),
        horizon = params.horizon()
    );
    let _guard = span.enter();

    let flows = trajectory::generate(params);
    let total_saved_m3 = flows.total_saved_m3();
    let len = flows.years.len();

    let mut non_volume = vec![0.0; len];
    for (category, series) in &flows.benefits {
        if is_volume_independent(*category) {
            for (acc, v) in non_volume.iter_mut().zip(series) {
                *acc += v;
            }
        }
    }

    let rate = params.discount_rate();
    let discounted = discount::evaluate(&DiscountInputs {
        rate,
        total_benefits: &flows.total_benefits,
        total_costs: &flows.total_costs,
        total_saved_m3: &total_saved_m3,
        non_volume_benefits: &non_volume,
        households: params.households().households as f64,
        water_value_per_m3: params.water_value_per_m3(),
    });

    let benefit_breakdown = category_totals(&flows.benefits, &discounted.factors);
    let cost_breakdown = category_totals(&flows.costs, &discounted.factors);

    tracing::debug!(
        npv = discounted.npv,
        bcr = %discounted.bcr,
        payback = %discounted.payback,
        "scenario complete"
    );

    ScenarioResult {
        perspective: params.perspective(),
        discount_rate: rate,
        horizon: params.horizon(),
        npv: discounted.npv,
        bcr: discounted.bcr,
        discounted_payback_year: discounted.payback,
        lcow: discounted.lcow,
        indicators: discounted.indicators,
        trajectory: Trajectory {
            years: flows.years,
            adoption: flows.adoption,
            alpha: flows.alpha,
            saved_m3: flows.saved_m3,
            benefits: flows.benefits,
            costs: flows.costs,
            total_benefits: flows.total_benefits,
            total_costs: flows.total_costs,
            discount_factors: discounted.factors,
            cumulative_npv: discounted.cumulative_npv,
        },
        benefit_breakdown,
        cost_breakdown,
        leak_stocks: flows.leak_stocks,
    }
}

/// Run independent scenarios, in parallel when the `parallel` feature is on.
///
/// Results are returned in input order.
#[must_use]
pub fn run_many(params: &[ParameterSet]) -> Vec<ScenarioResult> {
    #[cfg(feature = "parallel")]
    let results = params.par_iter().map(run_scenario).collect();

    #[cfg(not(feature = "parallel"))]
    let results = params.iter().map(run_scenario).collect();

    results
}
