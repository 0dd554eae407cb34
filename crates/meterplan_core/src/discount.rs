//! Present values and scenario indicators.

use std::collections::BTreeMap;

use crate::model::{BenefitCategory, CategoryTotal, Payback, Ratio, SupplementaryIndicators};

/// Discount factors 1/(1+r)^t for t in 0..len.
#[must_use]
pub fn discount_factors(rate: f64, len: usize) -> Vec<f64> {
    let base = 1.0 + rate;
    let mut factor = 1.0;
    (0..len)
        .map(|_| {
            let current = factor;
            factor /= base;
            current
        })
        .collect()
}

/// PV(X) = Σ X[t] · factor[t]
#[must_use]
pub fn present_value(series: &[f64], factors: &[f64]) -> f64 {
    series.iter().zip(factors).map(|(x, f)| x * f).sum()
}

/// Running sum of discounted net benefit.
#[must_use]
pub fn cumulative_npv(benefits: &[f64], costs: &[f64], factors: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    benefits
        .iter()
        .zip(costs)
        .zip(factors)
        .map(|((b, c), f)| {
            acc += (b - c) * f;
            acc
        })
        .collect()
}

/// Smallest t with non-negative cumulative discounted net benefit.
#[must_use]
pub fn discounted_payback(cumulative: &[f64]) -> Payback {
    cumulative
        .iter()
        .position(|&v| v >= 0.0)
        .map_or(Payback::Never, |t| Payback::Year(t as u32))
}

/// Fractional payback: linear interpolation inside the crossing year.
#[must_use]
pub fn interpolated_payback(cumulative: &[f64]) -> Option<f64> {
    let t = cumulative.iter().position(|&v| v >= 0.0)?;
    if t == 0 {
        return Some(0.0);
    }
    let before = cumulative[t - 1];
    let after = cumulative[t];
    let span = after - before;
    if span <= 0.0 {
        return Some(t as f64);
    }
    Some((t - 1) as f64 + (-before / span).clamp(0.0, 1.0))
}

/// Capital recovery factor r(1+r)^n / ((1+r)^n − 1); 1/n when r = 0.
#[must_use]
pub fn capital_recovery_factor(rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    let n = f64::from(periods);
    if rate.abs() < 1e-12 {
        return 1.0 / n;
    }
    let growth = (1.0 + rate).powf(n);
    rate * growth / (growth - 1.0)
}

/// Present value and undiscounted total per category.
#[must_use]
pub fn category_totals<K: Ord + Copy>(
    series: &BTreeMap<K, Vec<f64>>,
    factors: &[f64],
) -> BTreeMap<K, CategoryTotal> {
    series
        .iter()
        .map(|(key, values)| {
            (
                *key,
                CategoryTotal {
                    present_value: present_value(values, factors),
                    undiscounted: values.iter().sum(),
                },
            )
        })
        .collect()
}

/// Discounted series and headline indicators of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountedFlows {
    pub factors: Vec<f64>,
    pub cumulative_npv: Vec<f64>,
    pub npv: f64,
    pub bcr: Ratio,
    pub payback: Payback,
    pub lcow: Ratio,
    pub indicators: SupplementaryIndicators,
}

/// Inputs of the discounting step.
#[derive(Debug, Clone, Copy)]
pub struct DiscountInputs<'a> {
    pub rate: f64,
    pub total_benefits: &'a [f64],
    pub total_costs: &'a [f64],
    pub total_saved_m3: &'a [f64],
    /// Benefits not proportional to water volume (revenue, deferral)
    pub non_volume_benefits: &'a [f64],
    pub households: f64,
    pub water_value_per_m3: f64,
}

/// Actualize a run's series and compute NPV, BCR, payback and LCOW.
#[must_use]
pub fn evaluate(inputs: &DiscountInputs<'_>) -> DiscountedFlows {
    let len = inputs.total_benefits.len();
    let factors = discount_factors(inputs.rate, len);

    let pv_benefits = present_value(inputs.total_benefits, &factors);
    let pv_costs = present_value(inputs.total_costs, &factors);
    let pv_saved_m3 = present_value(inputs.total_saved_m3, &factors);
    let pv_non_volume = present_value(inputs.non_volume_benefits, &factors);
    let npv = pv_benefits - pv_costs;

    let cumulative = cumulative_npv(inputs.total_benefits, inputs.total_costs, &factors);

    let crf = capital_recovery_factor(inputs.rate, len as u32);
    let eac_per_household = if inputs.households > 0.0 {
        pv_costs * crf / inputs.households
    } else {
        0.0
    };

    let indicators = SupplementaryIndicators {
        pv_benefits,
        pv_costs,
        pv_saved_m3,
        total_saved_m3: inputs.total_saved_m3.iter().sum(),
        interpolated_payback: interpolated_payback(&cumulative),
        eac_per_household,
        break_even_value_per_m3: Ratio::of(pv_costs - pv_non_volume, pv_saved_m3),
        break_even_m3_per_household: Ratio::of(eac_per_household, inputs.water_value_per_m3),
    };

    DiscountedFlows {
        payback: discounted_payback(&cumulative),
        factors,
        cumulative_npv: cumulative,
        npv,
        bcr: Ratio::of(pv_benefits, pv_costs),
        lcow: Ratio::of(pv_costs, pv_saved_m3),
        indicators,
    }
}

/// Benefit categories whose value does not scale with the price of water.
#[must_use]
pub fn is_volume_independent(category: BenefitCategory) -> bool {
    matches!(
        category,
        BenefitCategory::Revenue | BenefitCategory::Infrastructure
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_factors_start_at_one() {
        let factors = discount_factors(0.05, 3);
        assert_eq!(factors[0], 1.0);
        assert!((factors[1] - 1.0 / 1.05).abs() < 1e-12);
        assert!((factors[2] - 1.0 / 1.05_f64.powi(2)).abs() < 1e-12);
    }

    #[test]
    fn test_present_value_at_zero_rate_is_sum() {
        let factors = discount_factors(0.0, 4);
        assert_eq!(present_value(&[1.0, 2.0, 3.0, 4.0], &factors), 10.0);
    }

    #[test]
    fn test_payback_first_non_negative_year() {
        let benefits = [0.0, 50.0, 50.0, 50.0];
        let costs = [100.0, 0.0, 0.0, 0.0];
        let factors = discount_factors(0.0, 4);
        let cumulative = cumulative_npv(&benefits, &costs, &factors);
        assert_eq!(cumulative, vec![-100.0, -50.0, 0.0, 50.0]);
        assert_eq!(discounted_payback(&cumulative), Payback::Year(2));

        let fractional = interpolated_payback(&cumulative).unwrap();
        assert!((fractional - 2.0).abs() < 1e-12, "got {fractional}");
    }

    #[test]
    fn test_interpolated_payback_mid_year() {
        let cumulative = [-100.0, -25.0, 25.0];
        let fractional = interpolated_payback(&cumulative).unwrap();
        assert!((fractional - 1.5).abs() < 1e-12, "got {fractional}");
    }

    #[test]
    fn test_payback_never() {
        let cumulative = [-100.0, -90.0, -80.0];
        assert_eq!(discounted_payback(&cumulative), Payback::Never);
        assert_eq!(interpolated_payback(&cumulative), None);
    }

    #[test]
    fn test_tiny_shortfall_is_not_payback() {
        let cumulative = [-100.0, -1e-10, 5.0];
        assert_eq!(discounted_payback(&cumulative), Payback::Year(2));
        assert_eq!(discounted_payback(&[-1.0, 0.0]), Payback::Year(1));
    }

    #[test]
    fn test_capital_recovery_factor() {
        assert!((capital_recovery_factor(0.0, 4) - 0.25).abs() < 1e-12);
        // Annuity of 1 over 10 years at 5%
        let crf = capital_recovery_factor(0.05, 10);
        assert!((crf - 0.129_504_574).abs() < 1e-8, "got {crf}");
    }

    #[test]
    fn test_evaluate_zero_costs_gives_not_applicable() {
        let zeros = [0.0; 3];
        let flows = evaluate(&DiscountInputs {
            rate: 0.03,
            total_benefits: &[10.0, 10.0, 10.0],
            total_costs: &zeros,
            total_saved_m3: &zeros,
            non_volume_benefits: &zeros,
            households: 1.0,
            water_value_per_m3: 1.0,
        });
        assert_eq!(flows.bcr, Ratio::NotApplicable);
        assert_eq!(flows.lcow, Ratio::NotApplicable);
        assert_eq!(flows.payback, Payback::Year(0));
        assert!(flows.npv > 0.0);
    }
}
