//! Calibration side-table.
//!
//! Maps a parameter to its literature default, empirically recommended range
//! and source. Consulted only to warn about values outside the recommended
//! range; the simulation arithmetic never reads it. Monte Carlo uncertainty
//! analysis draws from the recommended ranges.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::{ParamKey, ParameterSet};

/// Calibrated reference value of one parameter.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationEntry {
    pub key: ParamKey,
    pub default: f64,
    pub unit: &'static str,
    /// Empirically supported (low, high) range
    pub recommended: (f64, f64),
    pub source: &'static str,
}

impl CalibrationEntry {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.recommended.0 && value <= self.recommended.1
    }
}

/// A parameter value outside its recommended range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationWarning {
    pub key: ParamKey,
    pub value: f64,
    pub recommended: (f64, f64),
}

fn entry(
    key: ParamKey,
    default: f64,
    unit: &'static str,
    recommended: (f64, f64),
    source: &'static str,
) -> CalibrationEntry {
    CalibrationEntry {
        key,
        default,
        unit,
        recommended,
        source,
    }
}

static TABLE: LazyLock<Vec<CalibrationEntry>> = LazyLock::new(|| {
    use ParamKey::*;
    vec![
        entry(
            BehaviorInitial,
            0.08,
            "fraction",
            (0.05, 0.15),
            "Davies et al. (2014); Beal et al. (2011)",
        ),
        entry(
            PlateauFloor,
            0.025,
            "fraction",
            (0.0, 0.05),
            "UK smart-meter trials, long-run plateau",
        ),
        entry(
            DecayRate,
            0.15,
            "1/yr",
            (0.10, 0.35),
            "Allcott & Rogers (2014, AER)",
        ),
        entry(
            AnyPrevalence,
            0.20,
            "fraction",
            (0.12, 0.25),
            "Alliance for Water Efficiency (2023)",
        ),
        entry(
            AnyFlow,
            10.0,
            "m3/yr",
            (5.0, 20.0),
            "Alliance for Water Efficiency (2023)",
        ),
        entry(
            SignificantPrevalence,
            0.05,
            "fraction",
            (0.03, 0.07),
            "Alliance for Water Efficiency (2023)",
        ),
        entry(
            SignificantFlow,
            50.0,
            "m3/yr",
            (20.0, 75.0),
            "Britton et al. (2013)",
        ),
        entry(
            RepairRate,
            0.85,
            "fraction",
            (0.60, 0.95),
            "Britton et al. (2013)",
        ),
        entry(
            AnyRepairCost,
            100.0,
            "$",
            (50.0, 250.0),
            "Municipal plumbing cost surveys",
        ),
        entry(
            SignificantRepairCost,
            400.0,
            "$",
            (100.0, 800.0),
            "Municipal plumbing cost surveys",
        ),
        entry(
            SocialValue,
            4.69,
            "$/m3",
            (2.5, 8.0),
            "Winnipeg full-cost retail rate",
        ),
        entry(
            VariableCost,
            0.50,
            "$/m3",
            (0.10, 1.50),
            "Winnipeg variable production cost",
        ),
        entry(
            SocialDiscountRate,
            0.03,
            "fraction",
            (0.02, 0.05),
            "Treasury Board of Canada guidance",
        ),
        entry(
            MunicipalDiscountRate,
            0.03,
            "fraction",
            (0.02, 0.06),
            "Municipal borrowing rates",
        ),
        entry(
            PerCapitaLpcd,
            250.0,
            "L/person/day",
            (150.0, 400.0),
            "Quebec municipal water use reports",
        ),
        entry(
            MeterCost,
            250.0,
            "$",
            (150.0, 400.0),
            "Utility procurement records",
        ),
    ]
});

static INDEX: LazyLock<FxHashMap<ParamKey, usize>> = LazyLock::new(|| {
    TABLE
        .iter()
        .enumerate()
        .map(|(i, e)| (e.key, i))
        .collect()
});

/// Calibration entry for `key`, if one is recorded.
#[must_use]
pub fn lookup(key: ParamKey) -> Option<&'static CalibrationEntry> {
    INDEX.get(&key).map(|&i| &TABLE[i])
}

/// All recorded entries.
#[must_use]
pub fn entries() -> &'static [CalibrationEntry] {
    &TABLE
}

/// Check one value against its recommended range.
#[must_use]
pub fn check_value(key: ParamKey, value: f64) -> Option<CalibrationWarning> {
    let entry = lookup(key)?;
    (!entry.contains(value)).then_some(CalibrationWarning {
        key,
        value,
        recommended: entry.recommended,
    })
}

/// Every calibrated parameter of `params` lying outside its recommended range.
#[must_use]
pub fn check(params: &ParameterSet) -> Vec<CalibrationWarning> {
    TABLE
        .iter()
        .filter_map(|e| {
            let value = e.key.get(params)?;
            check_value(e.key, value)
        })
        .collect()
}
