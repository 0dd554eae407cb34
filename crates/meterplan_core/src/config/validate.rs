//! Range and consistency rules applied before a parameter set is released.

use super::{MAX_HORIZON, ParameterSetBuilder};
use crate::error::Violation;
use crate::model::{AdoptionCurve, Fadeout, NetworkRamp, PersistenceRegime, ScaleEconomies};

struct Rules {
    violations: Vec<Violation>,
}

impl Rules {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    fn finite(&mut self, field: &str, value: f64) -> bool {
        if value.is_finite() {
            true
        } else {
            self.fail(field, "must be a finite number");
            false
        }
    }

    fn non_negative(&mut self, field: &str, value: f64) {
        if self.finite(field, value) && value < 0.0 {
            self.fail(field, format!("must be >= 0 (got {value})"));
        }
    }

    fn positive(&mut self, field: &str, value: f64) {
        if self.finite(field, value) && value <= 0.0 {
            self.fail(field, format!("must be > 0 (got {value})"));
        }
    }

    fn fraction(&mut self, field: &str, value: f64) {
        if self.finite(field, value) && !(0.0..=1.0).contains(&value) {
            self.fail(field, format!("must be within [0, 1] (got {value})"));
        }
    }

    fn at_least(&mut self, field: &str, value: f64, min: f64) {
        if self.finite(field, value) && value < min {
            self.fail(field, format!("must be >= {min} (got {value})"));
        }
    }

    fn year_within_horizon(&mut self, field: &str, year: u32, horizon: u32) {
        if year > horizon {
            self.fail(field, format!("year {year} is beyond the horizon ({horizon})"));
        }
    }
}

/// Every rule violated by the builder's current values.
pub(super) fn validate(b: &ParameterSetBuilder) -> Vec<Violation> {
    let mut r = Rules {
        violations: Vec::new(),
    };
    let horizon = b.horizon;

    if horizon > MAX_HORIZON {
        r.fail("horizon", format!("must be <= {MAX_HORIZON} (got {horizon})"));
    }

    // Households
    if b.households.households == 0 {
        r.fail("households.count", "must be at least 1");
    }
    r.positive("households.persons_per_household", b.households.persons_per_household);
    r.non_negative("households.per_capita_lpcd", b.households.per_capita_lpcd);

    // Meter
    let m = &b.meter;
    r.non_negative("meter.meter_cost", m.meter_cost);
    r.non_negative("meter.install_hours", m.install_hours);
    r.non_negative("meter.hourly_rate", m.hourly_rate);
    r.non_negative("meter.network_cost", m.network_cost);
    r.non_negative("meter.maintenance_cost", m.maintenance_cost);
    r.non_negative("meter.reading_cost", m.reading_cost);
    r.fraction("meter.behavior_efficiency", m.behavior_efficiency);
    r.fraction("meter.leak_detection_efficiency", m.leak_detection_efficiency);
    if let Some(battery) = &m.battery {
        if battery.life_years == 0 {
            r.fail("meter.battery.life_years", "must be at least 1");
        }
        r.non_negative("meter.battery.replacement_cost", battery.replacement_cost);
    }

    match &b.scale_economies {
        Some(ScaleEconomies::Tiered { tiers }) => {
            if tiers.windows(2).any(|w| w[0].0 > w[1].0) {
                r.fail("scale_economies.tiers", "thresholds must be ascending");
            }
            for (_, factor) in tiers {
                if r.finite("scale_economies.tiers", *factor) && !(*factor > 0.0 && *factor <= 1.0)
                {
                    r.fail("scale_economies.tiers", format!("factor {factor} not in (0, 1]"));
                }
            }
        }
        Some(ScaleEconomies::Continuous {
            elasticity, floor, ..
        }) => {
            r.non_negative("scale_economies.elasticity", *elasticity);
            if r.finite("scale_economies.floor", *floor) && !(*floor > 0.0 && *floor <= 1.0) {
                r.fail("scale_economies.floor", format!("must be within (0, 1] (got {floor})"));
            }
        }
        None => {}
    }

    // Adoption
    let a = &b.adoption;
    if r.finite("adoption.ceiling", a.ceiling) && !(a.ceiling > 0.0 && a.ceiling <= 1.0) {
        r.fail("adoption.ceiling", format!("must be within (0, 1] (got {})", a.ceiling));
    }
    r.year_within_horizon("adoption.start_year", a.start_year, horizon);
    match &a.curve {
        AdoptionCurve::Mandatory => {}
        AdoptionCurve::Logistic {
            steepness,
            midpoint,
        } => {
            r.positive("adoption.steepness", *steepness);
            r.non_negative("adoption.midpoint", *midpoint);
        }
        AdoptionCurve::NewConstruction { annual_rate } => {
            r.fraction("adoption.annual_rate", *annual_rate);
        }
        AdoptionCurve::BySector {
            sector_count,
            rollout_years,
            ..
        } => {
            if *sector_count == 0 {
                r.fail("adoption.sector_count", "must be at least 1");
            }
            r.positive("adoption.rollout_years", *rollout_years);
        }
    }
    if let Some(incentive) = &a.incentive {
        r.non_negative(
            "adoption.incentive_per_household",
            incentive.total_per_household,
        );
        if incentive.duration_years == 0 {
            r.fail("adoption.incentive_years", "must be at least 1");
        } else if incentive.duration_years > horizon {
            r.fail(
                "adoption.incentive_years",
                format!(
                    "duration {} is longer than the horizon ({horizon})",
                    incentive.duration_years
                ),
            );
        }
    }

    // Persistence
    match &b.persistence {
        PersistenceRegime::Optimistic { initial } => {
            r.fraction("persistence.initial", *initial);
        }
        PersistenceRegime::Realistic {
            initial,
            decay_rate,
            floor,
        } => {
            r.fraction("persistence.initial", *initial);
            r.non_negative("persistence.decay_rate", *decay_rate);
            if r.finite("persistence.floor", *floor) && !(*floor >= 0.0 && *floor <= *initial) {
                r.fail(
                    "persistence.floor",
                    format!("must be within [0, initial] (got {floor}, initial {initial})"),
                );
            }
        }
        PersistenceRegime::Pessimistic { initial, fadeout } => {
            r.fraction("persistence.initial", *initial);
            match fadeout {
                Fadeout::Exponential { decay_rate } => {
                    r.non_negative("persistence.decay_rate", *decay_rate);
                }
                Fadeout::Linear { years } => {
                    if *years == 0 {
                        r.fail("persistence.fadeout_years", "must be at least 1");
                    }
                }
            }
        }
    }

    // Household leaks
    if let Some(leaks) = &b.leaks {
        for (name, stock) in [("any", &leaks.any), ("significant", &leaks.significant)] {
            r.fraction(&format!("leaks.{name}_prevalence"), stock.prevalence);
            r.non_negative(&format!("leaks.{name}_flow_m3"), stock.flow_m3);
            r.non_negative(&format!("leaks.{name}_detection_factor"), stock.detection_factor);
            r.non_negative(&format!("leaks.{name}_repair_factor"), stock.repair_factor);
            r.non_negative(&format!("leaks.{name}_repair_cost"), stock.repair_cost);
        }
        if leaks.significant.prevalence > leaks.any.prevalence {
            r.fail(
                "leaks.significant_prevalence",
                format!(
                    "significant leaks ({}) are a subset of all leaks ({})",
                    leaks.significant.prevalence, leaks.any.prevalence
                ),
            );
        }
        r.fraction("leaks.detection_rate", leaks.baseline_detection);
        r.fraction("leaks.repair_rate", leaks.baseline_repair);
        r.at_least(
            "leaks.natural_duration_years",
            leaks.natural_duration_years,
            1.0,
        );
        let tail = &leaks.long_tail;
        r.fraction("leaks.persistent_prevalence", tail.prevalence);
        if tail.prevalence > leaks.total_prevalence() {
            r.fail(
                "leaks.persistent_prevalence",
                format!(
                    "chronic leaks ({}) exceed total prevalence ({})",
                    tail.prevalence,
                    leaks.total_prevalence()
                ),
            );
        }
        r.fraction("leaks.long_tail_repair_factor", tail.repair_factor);
        r.at_least("leaks.duration_multiplier", tail.duration_multiplier, 1.0);
        if let Some(share) = leaks.allocation.municipal_share() {
            r.fraction("leaks.municipal_share", share);
        }
    }

    // Network leaks
    if let Some(net) = &b.network {
        r.non_negative("network.baseline_loss_m3", net.baseline_loss_m3);
        r.fraction("network.max_reduction", net.max_reduction);
        match net.ramp {
            NetworkRamp::Linear { years } => {
                if years == 0 {
                    r.fail("network.ramp_years", "must be at least 1");
                }
            }
            NetworkRamp::Exponential { rate } => r.non_negative("network.ramp_rate", rate),
        }
        r.year_within_horizon("network.start_year", net.start_year, horizon);
        r.non_negative("network.program_cost", net.program_cost);
        r.non_negative("network.repair_cost_per_m3", net.repair_cost_per_m3);
        if let Some(capex) = &net.capex {
            r.non_negative("network.capex", capex.amount);
            r.year_within_horizon("network.capex_year", capex.year, horizon);
        }
    }

    // Valuation and discounting
    r.non_negative("water.social_value", b.water_value.social_value);
    r.non_negative("water.variable_cost", b.water_value.variable_cost);
    r.non_negative("water.retail_price", b.water_value.retail_price);
    for (field, rate) in [
        ("discount.social", b.discount_rates.social),
        ("discount.municipal", b.discount_rates.municipal),
    ] {
        if r.finite(field, rate) && rate <= -1.0 {
            r.fail(field, format!("must be > -1 (got {rate})"));
        } else if rate < 0.0 {
            r.fail(field, format!("must be >= 0 (got {rate})"));
        }
    }

    if let Some(deferral) = &b.infrastructure {
        r.non_negative("infrastructure.amount", deferral.amount);
        r.year_within_horizon("infrastructure.year", deferral.year, horizon);
    }
    if let Some(revenue) = &b.revenue {
        r.non_negative("revenue.per_household", revenue.per_household);
    }

    r.violations
}
