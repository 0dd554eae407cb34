//! Distribution-network leakage reduction program.

use crate::model::{NetworkLeakParameters, NetworkRamp};

/// Saved volume and program cost per year.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSeries {
    pub saved_m3: Vec<f64>,
    pub cost: Vec<f64>,
}

/// Share (0..1) of the targeted reduction reached in year `t`.
#[must_use]
pub fn progress(params: &NetworkLeakParameters, t: u32) -> f64 {
    if t < params.start_year {
        return 0.0;
    }
    let elapsed = f64::from(t - params.start_year);
    match params.ramp {
        NetworkRamp::Linear { years } => ((elapsed + 1.0) / f64::from(years.max(1))).min(1.0),
        NetworkRamp::Exponential { rate } => 1.0 - (-rate * elapsed).exp(),
    }
}

/// Network savings and costs, optionally weighted by household adoption.
#[must_use]
pub fn network_series(params: &NetworkLeakParameters, adoption: &[f64]) -> NetworkSeries {
    let mut saved_m3 = Vec::with_capacity(adoption.len());
    let mut cost = Vec::with_capacity(adoption.len());

    for (t, a) in adoption.iter().enumerate() {
        let year = t as u32;
        let weight = if params.weight_by_adoption { *a } else { 1.0 };
        let p = progress(params, year);
        let saved = params.baseline_loss_m3 * params.max_reduction * p * weight;

        let mut spend = params.program_cost * p * weight + params.repair_cost_per_m3 * saved;
        if let Some(capex) = &params.capex
            && capex.year == year
        {
            spend += capex.amount;
        }
        saved_m3.push(saved);
        cost.push(spend);
    }

    NetworkSeries { saved_m3, cost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NetworkCapex;

    fn program(ramp: NetworkRamp) -> NetworkLeakParameters {
        NetworkLeakParameters {
            baseline_loss_m3: 1_000_000.0,
            max_reduction: 0.2,
            ramp,
            start_year: 1,
            program_cost: 50_000.0,
            repair_cost_per_m3: 0.1,
            capex: Some(NetworkCapex {
                amount: 250_000.0,
                year: 1,
            }),
            weight_by_adoption: false,
        }
    }

    #[test]
    fn test_linear_ramp() {
        let params = program(NetworkRamp::Linear { years: 4 });
        assert_eq!(progress(&params, 0), 0.0);
        assert!((progress(&params, 1) - 0.25).abs() < 1e-12);
        assert!((progress(&params, 4) - 1.0).abs() < 1e-12);
        assert!((progress(&params, 9) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_ramp_starts_at_zero() {
        let params = program(NetworkRamp::Exponential { rate: 0.5 });
        assert_eq!(progress(&params, 1), 0.0);
        assert!(progress(&params, 3) > progress(&params, 2));
    }

    #[test]
    fn test_series_costs() {
        let params = program(NetworkRamp::Linear { years: 1 });
        let series = network_series(&params, &[1.0, 1.0, 1.0]);
        assert_eq!(series.saved_m3[0], 0.0);
        assert_eq!(series.cost[0], 0.0);
        assert!((series.saved_m3[1] - 200_000.0).abs() < 1e-6);
        // program + variable repairs + one-off capex
        assert!((series.cost[1] - (50_000.0 + 20_000.0 + 250_000.0)).abs() < 1e-6);
        assert!((series.cost[2] - 70_000.0).abs() < 1e-6);
    }
}
