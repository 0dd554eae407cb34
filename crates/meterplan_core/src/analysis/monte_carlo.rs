//! Monte Carlo uncertainty analysis over calibration ranges.

use rand::distr::{Distribution, Uniform};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::Triangular;

use super::evaluator::{ensure_progress, evaluate_all};
use super::{DrawDistribution, SweepProgress, UncertaintyConfig, UncertaintySummary};
use crate::calibration;
use crate::config::{OverrideValue, ParamKey, ParameterSet};
use crate::error::{ConfigError, SweepError};
use crate::simulation::run_scenario;

/// Percentiles reported for the NPV distribution.
pub const REPORTED_PERCENTILES: [f64; 5] = [0.05, 0.25, 0.50, 0.75, 0.95];

/// A key to sample with its range and baseline value.
#[derive(Debug, Clone, Copy)]
struct Sampler {
    key: ParamKey,
    low: f64,
    high: f64,
    mode: f64,
}

impl Sampler {
    fn sample<R: Rng + ?Sized>(&self, distribution: DrawDistribution, rng: &mut R) -> f64 {
        if self.high <= self.low {
            return self.low;
        }
        let drawn = match distribution {
            DrawDistribution::Uniform => Uniform::new_inclusive(self.low, self.high)
                .map(|d| d.sample(rng))
                .ok(),
            DrawDistribution::Triangular => {
                Triangular::new(self.low, self.high, self.mode.clamp(self.low, self.high))
                    .map(|d| d.sample(rng))
                    .ok()
            }
        };
        drawn.unwrap_or(self.mode)
    }
}

fn samplers(base: &ParameterSet, keys: &[ParamKey]) -> Vec<Sampler> {
    keys.iter()
        .filter_map(|&key| {
            let entry = calibration::lookup(key)?;
            let mode = key.get(base)?;
            let (low, high) = entry.recommended;
            Some(Sampler {
                key,
                low,
                high,
                mode,
            })
        })
        .collect()
}

fn draw(
    base: &ParameterSet,
    samplers: &[Sampler],
    distribution: DrawDistribution,
    seed: u64,
) -> Result<f64, ConfigError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = base.to_builder();
    for sampler in samplers {
        let value = sampler.sample(distribution, &mut rng);
        builder.set(sampler.key, OverrideValue::Number(value))?;
    }
    Ok(run_scenario(&builder.build()?).npv)
}

/// Value at quantile `p` of sorted `values` (nearest rank).
fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (p * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

/// Sample the configured keys uniformly (or triangularly) within their
/// recommended ranges and summarize the NPV distribution.
///
/// Each draw gets its own seed from a master generator, so results do not
/// depend on worker scheduling. Draws that fail validation are discarded.
pub fn uncertainty(
    base: &ParameterSet,
    config: &UncertaintyConfig,
    progress: Option<&SweepProgress>,
) -> Result<UncertaintySummary, SweepError> {
    let samplers = samplers(base, &config.keys);
    if config.draws == 0 || samplers.is_empty() {
        return Err(SweepError::EmptySweep);
    }
    let span = tracing::debug_span!("uncertainty", draws = config.draws, keys = samplers.len());
    let _guard = span.enter();

    let mut master = SmallRng::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..config.draws).map(|_| master.next_u64()).collect();

    let results = evaluate_all(&seeds, progress, |&seed| {
        draw(base, &samplers, config.distribution, seed)
    });
    ensure_progress(&results)?;

    let mut npvs: Vec<f64> = results.into_iter().flatten().filter_map(Result::ok).collect();
    if npvs.is_empty() {
        return Err(SweepError::EmptySweep);
    }
    npvs.sort_by(f64::total_cmp);

    let accepted = npvs.len();
    let mean_npv = npvs.iter().sum::<f64>() / accepted as f64;
    let positive = npvs.iter().filter(|v| **v > 0.0).count();

    tracing::debug!(accepted, rejected = config.draws - accepted, "uncertainty complete");

    Ok(UncertaintySummary {
        draws: config.draws,
        accepted,
        sampled_keys: samplers.iter().map(|s| s.key).collect(),
        mean_npv,
        npv_percentiles: REPORTED_PERCENTILES
            .iter()
            .map(|&p| (p, quantile(&npvs, p)))
            .collect(),
        probability_positive: positive as f64 / accepted as f64,
    })
}
