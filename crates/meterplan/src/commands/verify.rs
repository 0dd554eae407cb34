//! Regression harness for the canonical scenario library.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, bail};
use meterplan_core::config::canonical_scenarios;
use meterplan_core::model::ScenarioSummary;
use meterplan_core::{ParameterSet, run_many};
use serde::{Deserialize, Serialize};

use crate::util::atomic_write;

/// Stored headline indicators of one canonical scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedIndicators {
    pub npv: f64,
    pub bcr: Option<f64>,
    pub lcow: Option<f64>,
}

impl From<&ScenarioSummary> for ExpectedIndicators {
    fn from(s: &ScenarioSummary) -> Self {
        Self {
            npv: s.npv,
            bcr: s.bcr.value(),
            lcow: s.lcow.value(),
        }
    }
}

/// One indicator that moved outside tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub id: String,
    pub field: &'static str,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.6}"));
        write!(
            f,
            "{}: {} expected {}, got {}",
            self.id,
            self.field,
            show(self.expected),
            show(self.actual)
        )
    }
}

fn within(expected: f64, actual: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance * expected.abs().max(1.0)
}

fn check_field(
    id: &str,
    field: &'static str,
    expected: Option<f64>,
    actual: Option<f64>,
    tolerance: f64,
    out: &mut Vec<Mismatch>,
) {
    let ok = match (expected, actual) {
        (Some(e), Some(a)) => within(e, a, tolerance),
        (None, None) => true,
        _ => false,
    };
    if !ok {
        out.push(Mismatch {
            id: id.to_string(),
            field,
            expected,
            actual,
        });
    }
}

/// Compare freshly computed indicators with stored ones. Scenarios missing
/// on either side are reported as mismatches.
pub fn compare_expected(
    expected: &BTreeMap<String, ExpectedIndicators>,
    actual: &BTreeMap<String, ExpectedIndicators>,
    tolerance: f64,
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    for (id, exp) in expected {
        let Some(act) = actual.get(id) else {
            mismatches.push(Mismatch {
                id: id.clone(),
                field: "scenario",
                expected: Some(exp.npv),
                actual: None,
            });
            continue;
        };
        check_field(id, "npv", Some(exp.npv), Some(act.npv), tolerance, &mut mismatches);
        check_field(id, "bcr", exp.bcr, act.bcr, tolerance, &mut mismatches);
        check_field(id, "lcow", exp.lcow, act.lcow, tolerance, &mut mismatches);
    }
    for (id, act) in actual {
        if !expected.contains_key(id) {
            mismatches.push(Mismatch {
                id: id.clone(),
                field: "scenario",
                expected: None,
                actual: Some(act.npv),
            });
        }
    }
    mismatches
}

fn compute_canonical() -> Result<BTreeMap<String, ExpectedIndicators>> {
    let scenarios = canonical_scenarios();
    let params = scenarios
        .iter()
        .map(|s| {
            ParameterSet::assemble(&s.spec)
                .wrap_err_with(|| format!("canonical scenario '{}' is invalid", s.id))
        })
        .collect::<Result<Vec<_>>>()?;
    let results = run_many(&params);
    Ok(scenarios
        .iter()
        .zip(&results)
        .map(|(s, r)| (s.id.to_string(), ExpectedIndicators::from(&r.summary())))
        .collect())
}

pub fn verify(path: &Path, tolerance: f64, record: bool) -> Result<()> {
    let actual = compute_canonical()?;

    if record {
        let json = serde_json::to_string_pretty(&actual)?;
        atomic_write(path, &json).wrap_err_with(|| format!("failed to write {}", path.display()))?;
        println!("recorded {} scenarios to {}", actual.len(), path.display());
        return Ok(());
    }

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {} (run with --record first)", path.display()))?;
    let expected: BTreeMap<String, ExpectedIndicators> = serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse {}", path.display()))?;

    let mismatches = compare_expected(&expected, &actual, tolerance);
    if mismatches.is_empty() {
        println!("{} canonical scenarios match", actual.len());
        return Ok(());
    }
    for m in &mismatches {
        println!("MISMATCH {m}");
    }
    bail!("{} indicator(s) outside tolerance {tolerance}", mismatches.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn indicators(npv: f64) -> ExpectedIndicators {
        ExpectedIndicators {
            npv,
            bcr: Some(1.1),
            lcow: None,
        }
    }

    #[test]
    fn test_identical_values_match() {
        let map = BTreeMap::from([("a".to_string(), indicators(1_000.0))]);
        assert!(compare_expected(&map, &map, 1e-6).is_empty());
    }

    #[test]
    fn test_relative_tolerance() {
        let expected = BTreeMap::from([("a".to_string(), indicators(1_000_000.0))]);
        let close = BTreeMap::from([("a".to_string(), indicators(1_000_000.5))]);
        let far = BTreeMap::from([("a".to_string(), indicators(1_000_010.0))]);
        assert!(compare_expected(&expected, &close, 1e-6).is_empty());
        let mismatches = compare_expected(&expected, &far, 1e-6);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].field, "npv");
    }

    #[test]
    fn test_ratio_becoming_applicable_is_a_mismatch() {
        let expected = BTreeMap::from([("a".to_string(), indicators(5.0))]);
        let mut changed = indicators(5.0);
        changed.lcow = Some(2.0);
        let actual = BTreeMap::from([("a".to_string(), changed)]);
        let mismatches = compare_expected(&expected, &actual, 1e-6);
        assert_eq!(mismatches[0].field, "lcow");
    }

    #[test]
    fn test_missing_and_extra_scenarios() {
        let expected = BTreeMap::from([("old".to_string(), indicators(1.0))]);
        let actual = BTreeMap::from([("new".to_string(), indicators(1.0))]);
        let mismatches = compare_expected(&expected, &actual, 1e-6);
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches.iter().all(|m| m.field == "scenario"));
    }

    #[test]
    fn test_record_then_verify_passes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expected.json");

        verify(&path, 1e-6, true).unwrap();
        assert!(path.exists());
        verify(&path, 1e-6, false).unwrap();
    }

    #[test]
    fn test_verify_detects_drift() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expected.json");
        let mut stored = compute_canonical().unwrap();
        if let Some(first) = stored.values_mut().next() {
            first.npv += 1_000.0;
        }
        fs::write(&path, serde_json::to_string(&stored).unwrap()).unwrap();

        assert!(verify(&path, 1e-6, false).is_err());
    }
}
