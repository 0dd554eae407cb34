//! Sweep evaluator: derives variant parameter sets and runs them.
//!
//! Every variant is an independent `ParameterSet` derived from the baseline,
//! so variants can run on any worker in any order. Results are keyed by
//! variant and only assembled after all variants resolve. A variant that
//! fails validation records its error without affecting its siblings.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{
    PerspectiveComparison, PresetAxis, PresetGridResults, PresetVariant, ScenarioCase,
    ScenarioCaseResult, SweepGrid, SweepParameter, TornadoConfig, TornadoPoint, TornadoResults,
    TornadoRow, VariantOutcome,
};
use crate::config::{OverrideValue, ParameterSet, PresetCategory, ScenarioSpec};
use crate::error::{ConfigError, SweepError};
use crate::model::{CostPerspective, Ratio, ScenarioSummary};
use crate::simulation::run_scenario;

/// Progress tracking for sweeps, shared across workers
#[derive(Debug, Clone)]
pub struct SweepProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SweepProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of completed variants
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Number of variants in the running sweep
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Stop queued variants; variants already running still complete.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for SweepProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Run `f` over `items`, skipping items once `progress` is cancelled.
pub(super) fn evaluate_all<I, T, F>(
    items: &[I],
    progress: Option<&SweepProgress>,
    f: F,
) -> Vec<Option<T>>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> T + Sync + Send,
{
    if let Some(p) = progress {
        p.reset(items.len());
    }
    let run = |item: &I| {
        if progress.is_some_and(SweepProgress::is_cancelled) {
            return None;
        }
        let out = f(item);
        if let Some(p) = progress {
            p.increment();
        }
        Some(out)
    };

    #[cfg(feature = "parallel")]
    let results = items.par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let results = items.iter().map(run).collect();

    results
}

/// `Cancelled` when nothing ran at all.
pub(super) fn ensure_progress<T>(results: &[Option<T>]) -> Result<(), SweepError> {
    if !results.is_empty() && results.iter().all(Option::is_none) {
        return Err(SweepError::Cancelled);
    }
    Ok(())
}

fn summarize(params: Result<ParameterSet, ConfigError>) -> Result<ScenarioSummary, ConfigError> {
    params.map(|p| run_scenario(&p).summary())
}

// ============================================================================
// Tornado
// ============================================================================

struct TornadoTask {
    parameter: SweepParameter,
    base_value: f64,
    low: OverrideValue,
    high: OverrideValue,
}

fn tornado_task(
    base: &ParameterSet,
    parameter: SweepParameter,
) -> Result<TornadoTask, ConfigError> {
    let key = parameter.key;
    let base_value = key
        .get(base)
        .ok_or_else(|| key.inapplicable("not active in the baseline scenario"))?;
    let (low, high) = if key.is_flag() {
        (OverrideValue::Flag(false), OverrideValue::Flag(true))
    } else {
        let (low, high) = parameter.variation.bounds(key, base_value);
        (OverrideValue::Number(low), OverrideValue::Number(high))
    };
    Ok(TornadoTask {
        parameter,
        base_value,
        low,
        high,
    })
}

fn numeric(value: OverrideValue) -> f64 {
    match value {
        OverrideValue::Number(x) => x,
        OverrideValue::Flag(true) => 1.0,
        OverrideValue::Flag(false) => 0.0,
    }
}

fn delta_ratio(variant: Ratio, base: Ratio) -> Option<f64> {
    Some(variant.value()? - base.value()?)
}

fn tornado_point(
    value: OverrideValue,
    summary: &ScenarioSummary,
    base: &ScenarioSummary,
) -> TornadoPoint {
    TornadoPoint {
        value: numeric(value),
        npv: summary.npv,
        bcr: summary.bcr,
        delta_npv: summary.npv - base.npv,
        delta_bcr: delta_ratio(summary.bcr, base.bcr),
    }
}

/// Arc elasticity (ΔNPV/NPV₀)/(Δx/x₀), undefined at a zero baseline.
fn elasticity(
    base_npv: f64,
    base_value: f64,
    low: &TornadoPoint,
    high: &TornadoPoint,
) -> Option<f64> {
    let dx = high.value - low.value;
    if base_npv.abs() < 1e-6 || base_value == 0.0 || dx == 0.0 {
        return None;
    }
    let e = ((high.npv - low.npv) / base_npv) / (dx / base_value);
    e.is_finite().then_some(e)
}

/// One-at-a-time sensitivity of NPV and BCR, ranked by NPV swing.
pub fn tornado(
    base: &ParameterSet,
    config: &TornadoConfig,
    progress: Option<&SweepProgress>,
) -> Result<TornadoResults, SweepError> {
    if config.parameters.is_empty() {
        return Err(SweepError::EmptySweep);
    }
    let span = tracing::debug_span!("tornado", parameters = config.parameters.len());
    let _guard = span.enter();

    let baseline = run_scenario(base).summary();

    let mut failures = Vec::new();
    let mut tasks = Vec::with_capacity(config.parameters.len());
    for parameter in &config.parameters {
        match tornado_task(base, *parameter) {
            Ok(task) => tasks.push(task),
            Err(e) => failures.push((parameter.key, e)),
        }
    }

    let results = evaluate_all(&tasks, progress, |task| {
        let key = task.parameter.key;
        let low = summarize(base.with_override(key, task.low))?;
        let high = summarize(base.with_override(key, task.high))?;
        Ok::<_, ConfigError>((low, high))
    });
    ensure_progress(&results)?;

    let mut rows = Vec::new();
    let mut not_run = Vec::new();
    for (task, result) in tasks.iter().zip(results) {
        let key = task.parameter.key;
        match result {
            None => not_run.push(key),
            Some(Err(e)) => failures.push((key, e)),
            Some(Ok((low, high))) => {
                let low = tornado_point(task.low, &low, &baseline);
                let high = tornado_point(task.high, &high, &baseline);
                rows.push(TornadoRow {
                    key,
                    base_value: task.base_value,
                    elasticity: elasticity(baseline.npv, task.base_value, &low, &high),
                    low,
                    high,
                });
            }
        }
    }
    rows.sort_by(|a, b| b.swing().total_cmp(&a.swing()));

    tracing::debug!(rows = rows.len(), failures = failures.len(), "tornado complete");

    Ok(TornadoResults {
        base: baseline,
        rows,
        failures,
        not_run,
    })
}

// ============================================================================
// Preset sweeps
// ============================================================================

/// Run the scenario once per named preset of `category`.
pub fn preset_sweep(
    spec: &ScenarioSpec,
    category: PresetCategory,
    progress: Option<&SweepProgress>,
) -> Result<Vec<PresetVariant>, SweepError> {
    ParameterSet::assemble(spec)?;
    let names = category.names();
    if names.is_empty() {
        return Err(SweepError::EmptySweep);
    }

    let results = evaluate_all(&names, progress, |name| {
        summarize(ParameterSet::assemble(&spec.clone().with_preset(category, name)))
    });
    ensure_progress(&results)?;

    Ok(names
        .into_iter()
        .zip(results)
        .map(|(name, result)| PresetVariant {
            name: name.to_string(),
            outcome: result.into(),
        })
        .collect())
}

/// Economic and financial runs on the same physical parameters.
#[must_use]
pub fn compare_perspectives(params: &ParameterSet) -> PerspectiveComparison {
    PerspectiveComparison {
        economic: run_scenario(&params.with_perspective(CostPerspective::Economic)),
        financial: run_scenario(&params.with_perspective(CostPerspective::Financial)),
    }
}

/// Cartesian product of preset axes, e.g. every persistence regime × every
/// leak allocation.
pub fn preset_grid(
    spec: &ScenarioSpec,
    axes: &[PresetAxis],
    progress: Option<&SweepProgress>,
) -> Result<PresetGridResults, SweepError> {
    if axes.is_empty() || axes.iter().any(|a| a.names.is_empty()) {
        return Err(SweepError::EmptySweep);
    }
    ParameterSet::assemble(spec)?;

    let span = tracing::debug_span!("preset_grid", dimensions = axes.len());
    let _guard = span.enter();

    let shape: Vec<usize> = axes.iter().map(|a| a.names.len()).collect();
    let index_grid = SweepGrid::new(shape.clone(), ());
    let points: Vec<Vec<usize>> = index_grid.indices().collect();

    let results = evaluate_all(&points, progress, |indices| {
        let variant = axes
            .iter()
            .zip(indices)
            .fold(spec.clone(), |acc, (axis, &i)| {
                acc.with_preset(axis.category, &axis.names[i])
            });
        summarize(ParameterSet::assemble(&variant))
    });
    ensure_progress(&results)?;

    let outcomes: Vec<VariantOutcome<ScenarioSummary>> =
        results.into_iter().map(VariantOutcome::from).collect();
    let outcomes = SweepGrid::from_data(shape, outcomes).ok_or(SweepError::EmptySweep)?;

    Ok(PresetGridResults {
        axes: axes.to_vec(),
        outcomes,
    })
}

// ============================================================================
// Scenario bundles
// ============================================================================

/// Baseline with a case's multipliers applied. Keys inactive in the
/// baseline are left alone.
pub fn apply_case(base: &ParameterSet, case: ScenarioCase) -> Result<ParameterSet, ConfigError> {
    let mut builder = base.to_builder();
    for (key, multiplier) in case.multipliers(base.perspective()) {
        if let Some(value) = key.get(base) {
            builder.set(key, OverrideValue::Number(value * multiplier))?;
        }
    }
    builder.build()
}

/// Pessimistic, base and optimistic runs.
#[must_use]
pub fn scenario_analysis(base: &ParameterSet) -> Vec<ScenarioCaseResult> {
    let results = evaluate_all(&ScenarioCase::ALL[..], None, |case| {
        summarize(apply_case(base, *case))
    });
    ScenarioCase::ALL
        .into_iter()
        .zip(results)
        .map(|(case, result)| ScenarioCaseResult {
            case,
            outcome: result.into(),
        })
        .collect()
}
