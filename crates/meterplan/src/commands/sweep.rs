use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use meterplan_core::ParamKey;
use meterplan_core::analysis::{
    DrawDistribution, PresetAxis, SweepParameter, SweepProgress, TornadoConfig, TornadoRow,
    UncertaintyConfig, VariantOutcome, preset_grid, tornado as run_tornado,
    uncertainty as run_uncertainty,
};
use meterplan_core::config::PresetCategory;
use meterplan_core::model::ScenarioSummary;
use serde::Serialize;

use super::{Distribution, ScenarioArgs};
use crate::report;

#[derive(Serialize)]
struct TornadoOutput<'a> {
    base: &'a ScenarioSummary,
    rows: &'a [TornadoRow],
    failures: Vec<(ParamKey, String)>,
    not_run: &'a [ParamKey],
}

pub fn tornado(args: &ScenarioArgs, delta: f64, keys: Vec<ParamKey>) -> Result<()> {
    let (_, params) = args.params()?;
    let config = if keys.is_empty() {
        TornadoConfig::with_relative_delta(delta)
    } else {
        TornadoConfig {
            parameters: keys
                .into_iter()
                .map(|k| SweepParameter::relative(k, delta))
                .collect(),
        }
    };

    let progress = SweepProgress::default();
    let results = run_tornado(&params, &config, Some(&progress))?;
    tracing::info!(variants = progress.completed(), "tornado finished");

    let output = TornadoOutput {
        base: &results.base,
        rows: &results.rows,
        failures: results
            .failures
            .iter()
            .map(|(k, e)| (*k, e.to_string()))
            .collect(),
        not_run: &results.not_run,
    };
    args.emit(&output, |_| report::tornado_report(&results))
}

/// Parse `category=a,b` (or a bare category for all of its presets).
pub fn parse_axis(text: &str) -> Result<PresetAxis> {
    let (category, names) = match text.split_once('=') {
        Some((c, n)) => (c.trim(), Some(n)),
        None => (text.trim(), None),
    };
    let category = PresetCategory::parse(category)
        .ok_or_else(|| eyre!("unknown preset category '{category}'"))?;
    let axis = match names {
        None => PresetAxis::all(category),
        Some(names) => {
            let names: Vec<String> = names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                bail!("axis '{text}' lists no presets");
            }
            PresetAxis::new(category, names)
        }
    };
    Ok(axis)
}

#[derive(Serialize)]
struct GridRow<'a> {
    presets: Vec<&'a str>,
    summary: Option<&'a ScenarioSummary>,
    error: Option<String>,
}

pub fn grid(args: &ScenarioArgs, axes: &[String]) -> Result<()> {
    let spec = args.spec()?;
    let axes = axes
        .iter()
        .map(|a| parse_axis(a).wrap_err_with(|| format!("invalid --axis '{a}'")))
        .collect::<Result<Vec<_>>>()?;

    let progress = SweepProgress::default();
    let results = preset_grid(&spec, &axes, Some(&progress))?;
    tracing::info!(
        variants = progress.completed(),
        completed = results.completed_count(),
        "preset grid finished"
    );

    let rows: Vec<GridRow> = results
        .outcomes
        .iter()
        .map(|(indices, outcome)| GridRow {
            presets: results.names_at(&indices).unwrap_or_default(),
            summary: outcome.completed(),
            error: match outcome {
                VariantOutcome::Failed(e) => Some(e.to_string()),
                _ => None,
            },
        })
        .collect();
    args.emit(&rows, |_| report::grid_report(&results))
}

pub fn uncertainty(
    args: &ScenarioArgs,
    draws: usize,
    seed: u64,
    distribution: Distribution,
) -> Result<()> {
    let (_, params) = args.params()?;
    let config = UncertaintyConfig {
        draws,
        seed,
        distribution: match distribution {
            Distribution::Uniform => DrawDistribution::Uniform,
            Distribution::Triangular => DrawDistribution::Triangular,
        },
        ..UncertaintyConfig::default()
    };
    let summary = run_uncertainty(&params, &config, None)?;
    if summary.accepted < summary.draws {
        tracing::warn!(
            rejected = summary.draws - summary.accepted,
            "some draws failed validation"
        );
    }
    args.emit(&summary, report::uncertainty_report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axis_with_names() {
        let axis = parse_axis("persistence=optimistic, pessimistic").unwrap();
        assert_eq!(axis.category, PresetCategory::Persistence);
        assert_eq!(axis.names, vec!["optimistic", "pessimistic"]);
    }

    #[test]
    fn test_parse_bare_axis_takes_every_preset() {
        let axis = parse_axis("leaks").unwrap();
        assert_eq!(axis.names.len(), PresetCategory::Leaks.names().len());
    }

    #[test]
    fn test_parse_axis_rejects_unknown_category() {
        assert!(parse_axis("weather=sunny").is_err());
        assert!(parse_axis("meter=").is_err());
    }
}
