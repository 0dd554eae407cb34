//! Annual benefit and cost series.
//!
//! The trajectory is a sum of independent contribution terms. Each term is
//! computed on its own and either inserted under its category or left out
//! entirely when its module is disabled or the perspective excludes it, so
//! turning one module off never changes another term's formula.

use std::collections::BTreeMap;

use crate::adoption::{
    adoption_increments, adoption_series, capex_schedule, cohort_renewals, incentive_schedule,
};
use crate::config::ParameterSet;
use crate::leaks::{leak_volume_per_household, simulate_leaks};
use crate::model::{BenefitCategory, CostCategory, CostPerspective, LeakStockSeries};
use crate::network::network_series;
use crate::persistence::effective_alpha_series;

/// Undiscounted annual flows of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualFlows {
    pub years: Vec<u32>,
    pub adoption: Vec<f64>,
    pub alpha: Vec<f64>,
    pub saved_m3: BTreeMap<BenefitCategory, Vec<f64>>,
    pub benefits: BTreeMap<BenefitCategory, Vec<f64>>,
    pub costs: BTreeMap<CostCategory, Vec<f64>>,
    pub total_benefits: Vec<f64>,
    pub total_costs: Vec<f64>,
    pub leak_stocks: Vec<LeakStockSeries>,
}

impl AnnualFlows {
    /// Total saved volume per year across sources.
    #[must_use]
    pub fn total_saved_m3(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.years.len()];
        for series in self.saved_m3.values() {
            for (acc, v) in total.iter_mut().zip(series) {
                *acc += v;
            }
        }
        total
    }
}

fn weighted(adoption: &[f64], series: &[f64]) -> Vec<f64> {
    adoption.iter().zip(series).map(|(a, v)| a * v).collect()
}

fn scaled(series: &[f64], factor: f64) -> Vec<f64> {
    series.iter().map(|v| v * factor).collect()
}

fn add_into(acc: &mut [f64], series: &[f64]) {
    for (a, v) in acc.iter_mut().zip(series) {
        *a += v;
    }
}

fn sum_series<'a>(len: usize, all: impl Iterator<Item = &'a Vec<f64>>) -> Vec<f64> {
    let mut total = vec![0.0; len];
    for series in all {
        add_into(&mut total, series);
    }
    total
}

/// Compose the annual benefit series B[t] and cost series C[t].
#[must_use]
pub fn generate(params: &ParameterSet) -> AnnualFlows {
    let horizon = params.horizon();
    let len = horizon as usize + 1;
    let households = params.households().households as f64;
    let perspective = params.perspective();
    let price = params.water_value_per_m3();

    let adoption = adoption_series(params.adoption(), horizon);
    let increments = adoption_increments(&adoption);
    let alpha = effective_alpha_series(
        params.persistence(),
        params.meter().behavior_efficiency,
        horizon,
    );

    let mut saved_m3 = BTreeMap::new();
    let mut benefits = BTreeMap::new();
    let mut costs = BTreeMap::new();

    // Behavior, on consumption net of leaks
    let leak_volume = params.leaks().map_or(0.0, leak_volume_per_household);
    let net_consumption = (params.households().gross_consumption_m3() - leak_volume).max(0.0);
    let behavior_m3: Vec<f64> = adoption
        .iter()
        .zip(&alpha)
        .map(|(a, alpha)| a * households * net_consumption * alpha)
        .collect();
    benefits.insert(BenefitCategory::Behavior, scaled(&behavior_m3, price));
    saved_m3.insert(BenefitCategory::Behavior, behavior_m3);

    // Household leaks
    let mut leak_stocks = Vec::new();
    if let Some(leaks) = params.leaks() {
        leak_stocks = simulate_leaks(
            leaks,
            params.meter().leak_detection_efficiency,
            households,
            horizon,
        );
        let avoided = sum_series(len, leak_stocks.iter().map(|s| &s.avoided_m3));
        let leak_m3 = weighted(&adoption, &avoided);
        benefits.insert(BenefitCategory::Leak, scaled(&leak_m3, price));
        saved_m3.insert(BenefitCategory::Leak, leak_m3);

        if let Some(municipal_share) = leaks.allocation.municipal_share() {
            let share = match perspective {
                CostPerspective::Economic => 1.0,
                CostPerspective::Financial => municipal_share,
            };
            let repair = sum_series(len, leak_stocks.iter().map(|s| &s.repair_cost));
            costs.insert(
                CostCategory::Repair,
                scaled(&weighted(&adoption, &repair), share),
            );
        }
    }

    // Recovered billing revenue is a transfer
    if let Some(revenue) = params.revenue()
        && perspective.includes_transfers()
    {
        let series = adoption
            .iter()
            .map(|a| a * households * revenue.per_household)
            .collect();
        benefits.insert(BenefitCategory::Revenue, series);
    }

    if let Some(deferral) = params.infrastructure() {
        let mut series = vec![0.0; len];
        let year = deferral.year as usize;
        if let (Some(slot), Some(a)) = (series.get_mut(year), adoption.get(year)) {
            *slot = a * deferral.amount;
        }
        benefits.insert(BenefitCategory::Infrastructure, series);
    }

    if let Some(network) = params.network() {
        let net = network_series(network, &adoption);
        benefits.insert(BenefitCategory::Network, scaled(&net.saved_m3, price));
        saved_m3.insert(BenefitCategory::Network, net.saved_m3);
        costs.insert(CostCategory::Network, net.cost);
    }

    // Capital: meters plus battery renewals per cohort
    let mut capex = capex_schedule(
        params.adoption(),
        &increments,
        households,
        params.unit_capex(),
    );
    if let Some(battery) = &params.meter().battery {
        let renewals = cohort_renewals(
            &increments,
            households,
            battery.life_years,
            battery.replacement_cost,
        );
        add_into(&mut capex, &renewals);
    }
    costs.insert(CostCategory::Capex, capex);

    let unit_opex = params.meter().annual_opex();
    costs.insert(
        CostCategory::Opex,
        adoption.iter().map(|a| a * households * unit_opex).collect(),
    );

    if let Some(incentive) = &params.adoption().incentive
        && perspective.includes_transfers()
    {
        costs.insert(
            CostCategory::Incentive,
            incentive_schedule(incentive, &increments, households),
        );
    }

    let total_benefits = sum_series(len, benefits.values());
    let total_costs = sum_series(len, costs.values());

    AnnualFlows {
        years: (0..=horizon).collect(),
        adoption,
        alpha,
        saved_m3,
        benefits,
        costs,
        total_benefits,
        total_costs,
        leak_stocks,
    }
}
