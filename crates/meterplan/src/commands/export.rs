//! Batch export of preset combinations.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use meterplan_core::config::{PresetCategory, ScenarioSpec};
use meterplan_core::model::ScenarioSummary;
use meterplan_core::{ParameterSet, run_many};
use serde::Serialize;

use crate::util::atomic_write;

const EXPORT_AXES: [PresetCategory; 3] = [
    PresetCategory::Meter,
    PresetCategory::Persistence,
    PresetCategory::Leaks,
];

#[derive(Serialize)]
struct IndexEntry {
    id: String,
    file: Option<String>,
    summary: Option<ScenarioSummary>,
    error: Option<String>,
}

/// Every combination of the export axes applied on top of `base`.
fn combinations(base: &ScenarioSpec) -> Vec<(String, ScenarioSpec)> {
    EXPORT_AXES
        .iter()
        .fold(vec![(String::new(), base.clone())], |acc, &category| {
            acc.iter()
                .flat_map(|(id, spec)| {
                    category.names().into_iter().map(move |name| {
                        let id = if id.is_empty() {
                            name.to_string()
                        } else {
                            format!("{id}_{name}")
                        };
                        let spec = spec.clone().with_preset(category, name).named(id.clone());
                        (id, spec)
                    })
                })
                .collect()
        })
}

/// Run every meter × persistence × leak preset combination on `base` and
/// write one JSON result per scenario plus `index.json`. Returns the number
/// of results written.
pub fn export_grid(base: &ScenarioSpec, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("failed to create {}", dir.display()))?;

    let mut index = Vec::new();
    let mut runnable = Vec::new();
    for (id, spec) in combinations(base) {
        match ParameterSet::assemble(&spec) {
            Ok(params) => runnable.push((id, params)),
            Err(e) => {
                tracing::warn!(scenario = %id, error = %e, "skipping invalid combination");
                index.push(IndexEntry {
                    id,
                    file: None,
                    summary: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let params: Vec<ParameterSet> = runnable.iter().map(|(_, p)| p.clone()).collect();
    let results = run_many(&params);

    for ((id, _), result) in runnable.into_iter().zip(&results) {
        let file = format!("{id}.json");
        let json = serde_json::to_string_pretty(result)?;
        atomic_write(&dir.join(&file), &json)
            .wrap_err_with(|| format!("failed to write {file}"))?;
        index.push(IndexEntry {
            id,
            file: Some(file),
            summary: Some(result.summary()),
            error: None,
        });
    }

    let json = serde_json::to_string_pretty(&index)?;
    atomic_write(&dir.join("index.json"), &json).wrap_err("failed to write index.json")?;
    tracing::info!(written = results.len(), dir = %dir.display(), "export finished");

    Ok(results.len())
}
