//! Adoption curve A(t) and the cohort-driven schedules derived from it.

use crate::model::{AdoptionCurve, AdoptionPlan, Incentive};

/// Logistic function 1 / (1 + e^{−k(s − t₀)}).
fn logistic(s: f64, steepness: f64, midpoint: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (s - midpoint)).exp())
}

/// Share of the stock metered in year `t` (before the ceiling is applied).
fn curve_share(plan: &AdoptionPlan, t: u32, horizon: u32) -> f64 {
    if t < plan.start_year {
        return 0.0;
    }
    let s = f64::from(t - plan.start_year);

    match &plan.curve {
        AdoptionCurve::Mandatory => 1.0,
        AdoptionCurve::Logistic {
            steepness,
            midpoint,
        } => {
            // Rescale so the ramp starts at 0 and completes at the horizon.
            let span = f64::from(horizon.saturating_sub(plan.start_year));
            let low = logistic(0.0, *steepness, *midpoint);
            let high = logistic(span, *steepness, *midpoint);
            let raw = logistic(s, *steepness, *midpoint);
            if high - low > 1e-12 {
                (raw - low) / (high - low)
            } else {
                raw
            }
        }
        AdoptionCurve::NewConstruction { annual_rate } => annual_rate * (s + 1.0),
        AdoptionCurve::BySector {
            sector_count,
            rollout_years,
            rounding,
        } => {
            let per_sector = rollout_years / f64::from(*sector_count);
            let completed = (1..=*sector_count)
                .filter(|i| {
                    // Sector i needs `finish` years; offset s is the (s + 1)-th year.
                    let finish = rounding.apply(f64::from(*i) * per_sector);
                    finish.saturating_sub(1) as f64 <= s
                })
                .count();
            completed as f64 / f64::from(*sector_count)
        }
    }
}

/// Adoption fraction A(t) for t = 0..=horizon, within [0, ceiling].
#[must_use]
pub fn adoption_series(plan: &AdoptionPlan, horizon: u32) -> Vec<f64> {
    (0..=horizon)
        .map(|t| (curve_share(plan, t, horizon) * plan.ceiling).clamp(0.0, plan.ceiling))
        .collect()
}

/// New installations per year: ΔA(0) = A(0), ΔA(t) = max(0, A(t) − A(t−1)).
#[must_use]
pub fn adoption_increments(adoption: &[f64]) -> Vec<f64> {
    let mut previous = 0.0;
    adoption
        .iter()
        .map(|&a| {
            let delta = (a - previous).max(0.0);
            previous = a;
            delta
        })
        .collect()
}

/// Capital spending per year for a fleet of `households` meters.
///
/// Spread plans pay as cohorts are installed; otherwise the whole fleet is
/// bought in year 0.
#[must_use]
pub fn capex_schedule(
    plan: &AdoptionPlan,
    increments: &[f64],
    households: f64,
    unit_capex: f64,
) -> Vec<f64> {
    if plan.spread_capex {
        increments
            .iter()
            .map(|delta| delta * households * unit_capex)
            .collect()
    } else {
        let mut capex = vec![0.0; increments.len()];
        if let Some(first) = capex.first_mut() {
            *first = households * unit_capex;
        }
        capex
    }
}

/// Per-cohort recurring charge: a cohort installed in year c pays
/// `amount_per_household` in years c + period, c + 2·period, …
#[must_use]
pub fn cohort_renewals(
    increments: &[f64],
    households: f64,
    period: u32,
    amount_per_household: f64,
) -> Vec<f64> {
    let n = increments.len();
    let mut out = vec![0.0; n];
    if period == 0 {
        return out;
    }
    let period = period as usize;
    for (cohort, delta) in increments.iter().enumerate() {
        if *delta <= 0.0 {
            continue;
        }
        for year in (cohort + period..n).step_by(period) {
            out[year] += delta * households * amount_per_household;
        }
    }
    out
}

/// Incentive payouts: each cohort receives equal installments for
/// `duration_years` years starting in its installation year.
#[must_use]
pub fn incentive_schedule(incentive: &Incentive, increments: &[f64], households: f64) -> Vec<f64> {
    let n = increments.len();
    let installment = incentive.annual_installment();
    let duration = incentive.duration_years as usize;
    let mut out = vec![0.0; n];
    for (cohort, delta) in increments.iter().enumerate() {
        for year in cohort..(cohort + duration).min(n) {
            out[year] += delta * households * installment;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresetCategory;
    use crate::config::presets::adoption_preset;
    use crate::model::SectorRounding;

    #[test]
    fn test_every_preset_stays_in_unit_range_and_never_decreases() {
        for name in PresetCategory::Adoption.names() {
            let plan = adoption_preset(name).unwrap();
            for horizon in [0, 5, 20, 50] {
                let series = adoption_series(&plan, horizon);
                assert_eq!(series.len(), horizon as usize + 1);
                for (t, a) in series.iter().enumerate() {
                    assert!((0.0..=1.0).contains(a), "{name}: A({t}) = {a}");
                    assert!(*a <= plan.ceiling + 1e-12, "{name}: A({t}) above ceiling");
                }
                for (t, w) in series.windows(2).enumerate() {
                    assert!(w[1] >= w[0], "{name}: A decreases after year {t}");
                }
            }
        }
    }

    #[test]
    fn test_increments_start_with_first_value() {
        let deltas = adoption_increments(&[0.2, 0.5, 0.5, 1.0]);
        assert_eq!(deltas, vec![0.2, 0.3, 0.0, 0.5]);
    }

    #[test]
    fn test_lump_capex_in_year_zero() {
        let plan = AdoptionPlan::mandatory();
        let capex = capex_schedule(&plan, &[1.0, 0.0, 0.0], 100.0, 10.0);
        assert_eq!(capex, vec![1000.0, 0.0, 0.0]);
    }

    #[test]
    fn test_incentive_installments_follow_cohorts() {
        let incentive = Incentive {
            total_per_household: 300.0,
            duration_years: 3,
        };
        let out = incentive_schedule(&incentive, &[0.5, 0.5, 0.0, 0.0], 10.0);
        // 5 households × 100 in years 0..2, another 5 × 100 in years 1..3
        assert_eq!(out, vec![500.0, 1000.0, 1000.0, 500.0]);
    }

    #[test]
    fn test_cohort_renewals() {
        let out = cohort_renewals(&[1.0, 0.0, 0.0, 0.0, 0.0], 10.0, 2, 3.0);
        assert_eq!(out, vec![0.0, 0.0, 30.0, 0.0, 30.0]);
    }

    #[test]
    fn test_sector_rounding_changes_completion_years() {
        let plan = |rounding| AdoptionPlan {
            curve: AdoptionCurve::BySector {
                sector_count: 5,
                rollout_years: 8.0,
                rounding,
            },
            ..AdoptionPlan::mandatory()
        };
        // Completion points 1.6, 3.2, 4.8, 6.4, 8.0
        let floor = adoption_series(&plan(SectorRounding::Floor), 10);
        let ceil = adoption_series(&plan(SectorRounding::Ceil), 10);
        assert!((floor[0] - 0.2).abs() < 1e-12);
        assert_eq!(ceil[0], 0.0);
        assert!((ceil[1] - 0.2).abs() < 1e-12);
        assert!((floor[7] - 1.0).abs() < 1e-12);
        assert!((ceil[7] - 1.0).abs() < 1e-12);
    }
}
