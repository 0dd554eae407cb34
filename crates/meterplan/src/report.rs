//! Plain-text rendering of results for the terminal.

use meterplan_core::analysis::{
    PerspectiveComparison, PresetGridResults, ScenarioCaseResult, TornadoResults,
    UncertaintySummary, VariantOutcome,
};
use meterplan_core::config::PresetInfo;
use meterplan_core::model::{Ratio, ScenarioResult, ScenarioSummary};

use crate::util::{
    format_compact_currency, format_currency, format_currency_short, format_percentage,
    format_volume,
};

fn ratio_currency(ratio: Ratio) -> String {
    ratio
        .value()
        .map_or_else(|| "n/a".to_string(), format_currency)
}

fn row(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {label:<28}{value}")
}

/// Headline indicators, category breakdowns and optionally the annual table.
pub fn scenario_report(name: &str, result: &ScenarioResult, annual: bool) -> String {
    let indicators = &result.indicators;
    let payback = match (result.discounted_payback_year.year(), indicators.interpolated_payback)
    {
        (Some(year), Some(exact)) => format!("year {year} ({exact:.1})"),
        _ => result.discounted_payback_year.to_string(),
    };

    let mut lines = vec![
        format!("Scenario: {name}"),
        format!(
            "{} perspective, {} discount rate, {} year horizon",
            result.perspective.label(),
            format_percentage(result.discount_rate),
            result.horizon
        ),
        String::new(),
        row("NPV", format_currency_short(result.npv)),
        row("Benefit-cost ratio", result.bcr),
        row("Discounted payback", payback),
        row("Levelized cost ($/m³)", ratio_currency(result.lcow)),
        row(
            "EAC per household",
            format_currency(indicators.eac_per_household),
        ),
        row(
            "Break-even value ($/m³)",
            ratio_currency(indicators.break_even_value_per_m3),
        ),
        row(
            "Break-even m³/household/yr",
            indicators.break_even_m3_per_household,
        ),
        row("Water saved", format_volume(indicators.total_saved_m3)),
        String::new(),
        format!(
            "Benefits (PV {})",
            format_compact_currency(indicators.pv_benefits)
        ),
    ];
    for (category, total) in &result.benefit_breakdown {
        lines.push(row(
            category.label(),
            format_currency_short(total.present_value),
        ));
    }
    lines.push(format!(
        "Costs (PV {})",
        format_compact_currency(indicators.pv_costs)
    ));
    for (category, total) in &result.cost_breakdown {
        lines.push(row(
            category.label(),
            format_currency_short(total.present_value),
        ));
    }

    if annual {
        lines.push(String::new());
        lines.extend(annual_table(result));
    }
    lines.join("\n")
}

fn annual_table(result: &ScenarioResult) -> Vec<String> {
    let t = &result.trajectory;
    let mut lines = vec![format!(
        "{:>4} {:>8} {:>14} {:>14} {:>14} {:>14}",
        "Year", "Adopted", "Saved m³", "Benefits", "Costs", "Cum. NPV"
    )];
    for i in 0..t.len() {
        lines.push(format!(
            "{:>4} {:>8} {:>14.0} {:>14} {:>14} {:>14}",
            t.years[i],
            format_percentage(t.adoption[i]),
            t.total_saved_m3(i),
            format_compact_currency(t.total_benefits[i]),
            format_compact_currency(t.total_costs[i]),
            format_compact_currency(t.cumulative_npv[i]),
        ));
    }
    lines
}

fn summary_cells(summary: &ScenarioSummary) -> String {
    format!(
        "{:>14} {:>6} {:>10}",
        format_currency_short(summary.npv),
        summary.bcr.to_string(),
        summary.discounted_payback_year.to_string()
    )
}

fn outcome_cells(outcome: &VariantOutcome<ScenarioSummary>) -> String {
    match outcome {
        VariantOutcome::Completed(summary) => summary_cells(summary),
        VariantOutcome::Failed(e) => format!("error: {e}"),
        VariantOutcome::NotRun => "not run".to_string(),
    }
}

pub fn tornado_report(results: &TornadoResults) -> String {
    let mut lines = vec![
        format!(
            "Baseline NPV {} (BCR {})",
            format_currency_short(results.base.npv),
            results.base.bcr
        ),
        String::new(),
        format!(
            "{:<32} {:>12} {:>12} {:>14} {:>14} {:>10}",
            "Parameter", "Low", "High", "ΔNPV low", "ΔNPV high", "Elasticity"
        ),
    ];
    for r in &results.rows {
        let elasticity = r
            .elasticity
            .map_or_else(|| "n/a".to_string(), |e| format!("{e:.2}"));
        lines.push(format!(
            "{:<32} {:>12.4} {:>12.4} {:>14} {:>14} {:>10}",
            r.key.label(),
            r.low.value,
            r.high.value,
            format_currency_short(r.low.delta_npv),
            format_currency_short(r.high.delta_npv),
            elasticity
        ));
    }
    for (key, e) in &results.failures {
        lines.push(format!("{:<32} failed: {e}", key.label()));
    }
    for key in &results.not_run {
        lines.push(format!("{:<32} not run", key.label()));
    }
    lines.join("\n")
}

pub fn comparison_report(comparison: &PerspectiveComparison) -> String {
    let header = format!("{:<28}{:>16}{:>16}", "", "Economic", "Financial");
    let (e, f) = (&comparison.economic, &comparison.financial);
    let line = |label: &str, a: String, b: String| format!("{label:<28}{a:>16}{b:>16}");
    [
        header,
        line(
            "NPV",
            format_currency_short(e.npv),
            format_currency_short(f.npv),
        ),
        line("Benefit-cost ratio", e.bcr.to_string(), f.bcr.to_string()),
        line(
            "Discounted payback",
            e.discounted_payback_year.to_string(),
            f.discounted_payback_year.to_string(),
        ),
        line(
            "Discount rate",
            format_percentage(e.discount_rate),
            format_percentage(f.discount_rate),
        ),
        line(
            "PV benefits",
            format_compact_currency(e.indicators.pv_benefits),
            format_compact_currency(f.indicators.pv_benefits),
        ),
        line(
            "PV costs",
            format_compact_currency(e.indicators.pv_costs),
            format_compact_currency(f.indicators.pv_costs),
        ),
        String::new(),
        format!(
            "Financial minus economic NPV: {}",
            format_currency_short(comparison.npv_gap())
        ),
    ]
    .join("\n")
}

pub fn grid_report(results: &PresetGridResults) -> String {
    let header: Vec<&str> = results.axes.iter().map(|a| a.category.as_str()).collect();
    let mut lines = vec![format!(
        "{:<48} {:>14} {:>6} {:>10}",
        header.join(" × "),
        "NPV",
        "BCR",
        "Payback"
    )];
    for (indices, outcome) in results.outcomes.iter() {
        let names = results.names_at(&indices).unwrap_or_default().join(" / ");
        lines.push(format!("{names:<48} {}", outcome_cells(outcome)));
    }
    lines.push(format!(
        "{} of {} variants completed",
        results.completed_count(),
        results.outcomes.len()
    ));
    lines.join("\n")
}

pub fn cases_report(cases: &[ScenarioCaseResult]) -> String {
    cases
        .iter()
        .map(|c| format!("{:<12} {}", c.case.label(), outcome_cells(&c.outcome)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn uncertainty_report(summary: &UncertaintySummary) -> String {
    let keys: Vec<&str> = summary.sampled_keys.iter().map(|k| k.as_str()).collect();
    let mut lines = vec![
        format!(
            "{} of {} draws accepted, sampling {}",
            summary.accepted,
            summary.draws,
            keys.join(", ")
        ),
        row("Mean NPV", format_currency_short(summary.mean_npv)),
        row(
            "P(NPV > 0)",
            format_percentage(summary.probability_positive),
        ),
    ];
    for (p, npv) in &summary.npv_percentiles {
        lines.push(row(
            &format!("P{:.0}", p * 100.0),
            format_currency_short(*npv),
        ));
    }
    lines.join("\n")
}

pub fn presets_report(catalog: &[PresetInfo]) -> String {
    let mut lines = Vec::new();
    let mut current = None;
    for info in catalog {
        if current != Some(info.category) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("[{}]", info.category.as_str()));
            current = Some(info.category);
        }
        lines.push(format!("  {:<20}{}", info.name, info.description));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterplan_core::config::preset_catalog;
    use meterplan_core::{ParameterSetBuilder, run_scenario};

    #[test]
    fn test_scenario_report_lists_categories() {
        let params = ParameterSetBuilder::new().build().unwrap();
        let result = run_scenario(&params);
        let text = scenario_report("reference", &result, true);

        assert!(text.starts_with("Scenario: reference"));
        assert!(text.contains("Behavior"));
        assert!(text.contains("Capital"));
        // Header plus one row per year
        let table_rows = text.lines().skip_while(|l| !l.starts_with("Year")).count();
        assert_eq!(table_rows, result.trajectory.len() + 1);
    }

    #[test]
    fn test_presets_report_groups_by_category() {
        let text = presets_report(&preset_catalog());
        assert!(text.contains("[persistence]"));
        assert!(text.contains("realistic"));
    }
}
