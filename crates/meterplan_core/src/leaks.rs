//! Household leak dynamics.
//!
//! Each leak class ("any" and "significant", or one blended class) is split
//! into a repairable sub-stock and a chronic long-tail sub-stock. Every
//! sub-stock evolves twice in discrete yearly steps: once with metering
//! (natural repairs plus meter-induced repairs) and once as the unmetered
//! counterfactual (natural repairs only). New leaks arrive at the incidence
//! that holds the counterfactual at its steady-state prevalence, so avoided
//! volume is the gap between the two paths.

use crate::model::{LeakParameters, LeakStockSeries};

/// One leak class after the any/significant split.
#[derive(Debug, Clone, PartialEq)]
pub struct LeakClass {
    pub name: &'static str,
    /// Share of households with a leak of this class
    pub prevalence: f64,
    pub flow_m3: f64,
    pub detection_factor: f64,
    pub repair_factor: f64,
    pub repair_cost: f64,
}

/// Leak classes tracked for `params`.
///
/// Significant leaks are a subset of all leaks, so the "any" class holds only
/// the non-significant remainder. When differentiation is off, both collapse
/// into one class whose flow, factors and cost are prevalence-weighted averages.
#[must_use]
pub fn leak_classes(params: &LeakParameters) -> Vec<LeakClass> {
    let small = LeakClass {
        name: "any",
        prevalence: (params.any.prevalence - params.significant.prevalence).max(0.0),
        flow_m3: params.any.flow_m3,
        detection_factor: params.any.detection_factor,
        repair_factor: params.any.repair_factor,
        repair_cost: params.any.repair_cost,
    };
    let large = LeakClass {
        name: "significant",
        prevalence: params.significant.prevalence,
        flow_m3: params.significant.flow_m3,
        detection_factor: params.significant.detection_factor,
        repair_factor: params.significant.repair_factor,
        repair_cost: params.significant.repair_cost,
    };

    if params.differentiated {
        return vec![small, large];
    }

    let total = small.prevalence + large.prevalence;
    let blend = |a: f64, b: f64| {
        if total > 0.0 {
            (a * small.prevalence + b * large.prevalence) / total
        } else {
            0.0
        }
    };
    vec![LeakClass {
        name: "blended",
        prevalence: total,
        flow_m3: blend(small.flow_m3, large.flow_m3),
        detection_factor: blend(small.detection_factor, large.detection_factor),
        repair_factor: blend(small.repair_factor, large.repair_factor),
        repair_cost: blend(small.repair_cost, large.repair_cost),
    }]
}

/// Annual leaked volume of an average unmetered household at steady state (m³/yr).
///
/// Behavioral savings apply to consumption net of this volume so that the
/// same water is never credited to both behavior and leak repair.
#[must_use]
pub fn leak_volume_per_household(params: &LeakParameters) -> f64 {
    leak_classes(params)
        .iter()
        .map(|c| c.prevalence * c.flow_m3)
        .sum()
}

/// Outcome of one yearly step of a sub-stock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub natural_repairs: f64,
    pub induced_repairs: f64,
    pub end: f64,
}

/// Advance a stock of `start` active leaks by one year.
///
/// Repairs are drawn from the start-of-year stock and never exceed it; new
/// leaks join at year end.
#[must_use]
pub fn step(start: f64, natural_rate: f64, induced_rate: f64, incidence: f64) -> StepOutcome {
    let mut natural = natural_rate * start;
    let mut induced = induced_rate * start;
    let repaired = natural + induced;
    if repaired > start && repaired > 0.0 {
        let scale = start / repaired;
        natural *= scale;
        induced *= scale;
    }
    StepOutcome {
        natural_repairs: natural,
        induced_repairs: induced,
        end: (start - natural - induced).max(0.0) + incidence,
    }
}

/// Metered correction rate of a class: detected share × repaired share.
#[must_use]
pub fn correction_rate(params: &LeakParameters, class: &LeakClass, meter_efficiency: f64) -> f64 {
    let detection = (params.baseline_detection * meter_efficiency * class.detection_factor).min(1.0);
    let repair = (params.baseline_repair * class.repair_factor).min(1.0);
    detection * repair
}

struct SubStock {
    households_with_leak: f64,
    natural_rate: f64,
    induced_rate: f64,
}

/// Simulate household leaks over `horizon + 1` years at full adoption.
///
/// Series are per class; the trajectory scales them by A(t).
#[must_use]
pub fn simulate_leaks(
    params: &LeakParameters,
    meter_efficiency: f64,
    households: f64,
    horizon: u32,
) -> Vec<LeakStockSeries> {
    let years = horizon as usize + 1;
    let mu = params.natural_repair_rate();
    let classes = leak_classes(params);
    let total: f64 = classes.iter().map(|c| c.prevalence).sum();
    let chronic_share = if total > 0.0 {
        (params.long_tail.prevalence / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let tail = params.long_tail.rate_multiplier();

    classes
        .iter()
        .map(|class| {
            let k = correction_rate(params, class, meter_efficiency);
            let equilibrium = households * class.prevalence;
            let subs = [
                SubStock {
                    households_with_leak: equilibrium * (1.0 - chronic_share),
                    natural_rate: mu,
                    induced_rate: k,
                },
                SubStock {
                    households_with_leak: equilibrium * chronic_share,
                    natural_rate: mu * tail,
                    induced_rate: k * tail,
                },
            ];

            let mut series = LeakStockSeries {
                name: class.name.to_string(),
                metered: vec![0.0; years],
                counterfactual: vec![0.0; years],
                repairs: vec![0.0; years],
                avoided_m3: vec![0.0; years],
                repair_cost: vec![0.0; years],
            };

            for sub in &subs {
                let incidence = sub.natural_rate.min(1.0) * sub.households_with_leak;
                let mut metered = sub.households_with_leak;
                let mut counterfactual = sub.households_with_leak;
                for t in 0..years {
                    let with_meter = step(metered, sub.natural_rate, sub.induced_rate, incidence);
                    let without = step(counterfactual, sub.natural_rate, 0.0, incidence);

                    let mean_metered = 0.5 * (metered + with_meter.end);
                    let mean_counterfactual = 0.5 * (counterfactual + without.end);

                    series.metered[t] += metered;
                    series.counterfactual[t] += counterfactual;
                    series.repairs[t] += with_meter.induced_repairs;
                    series.avoided_m3[t] +=
                        (mean_counterfactual - mean_metered).max(0.0) * class.flow_m3;
                    series.repair_cost[t] += with_meter.induced_repairs * class.repair_cost;

                    metered = with_meter.end;
                    counterfactual = without.end;
                }
            }
            series
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LongTail, LongTailInteraction};

    #[test]
    fn test_step_never_repairs_more_than_stock() {
        let out = step(100.0, 0.6, 0.9, 10.0);
        assert!((out.natural_repairs + out.induced_repairs - 100.0).abs() < 1e-9);
        assert!((out.end - 10.0).abs() < 1e-9);
        assert!((out.natural_repairs / out.induced_repairs - 0.6 / 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_counterfactual_stays_at_equilibrium() {
        let params = LeakParameters::default();
        let stocks = simulate_leaks(&params, 1.0, 10_000.0, 20);
        for s in &stocks {
            let first = s.counterfactual[0];
            assert!(s.counterfactual.iter().all(|v| (v - first).abs() < 1e-6));
        }
    }

    #[test]
    fn test_blended_class_preserves_leak_volume() {
        let two = LeakParameters::default();
        let one = LeakParameters {
            differentiated: false,
            ..LeakParameters::default()
        };
        assert_eq!(leak_classes(&one).len(), 1);
        assert!((leak_volume_per_household(&two) - leak_volume_per_household(&one)).abs() < 1e-9);
        // 15% × 10 m³ + 5% × 50 m³
        assert!((leak_volume_per_household(&two) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_tail_interaction_modes() {
        let multiplicative = LongTail {
            prevalence: 0.01,
            repair_factor: 0.5,
            duration_multiplier: 4.0,
            interaction: LongTailInteraction::Multiplicative,
        };
        let additive = LongTail {
            interaction: LongTailInteraction::Additive,
            ..multiplicative.clone()
        };
        assert!((multiplicative.rate_multiplier() - 0.125).abs() < 1e-12);
        assert_eq!(additive.rate_multiplier(), 0.0);
    }

    #[test]
    fn test_lower_meter_efficiency_avoids_less() {
        let params = LeakParameters::default();
        let total = |eff: f64| -> f64 {
            simulate_leaks(&params, eff, 1_000.0, 10)
                .iter()
                .flat_map(|s| s.avoided_m3.iter())
                .sum()
        };
        assert!(total(0.765) < total(1.0));
    }
}
