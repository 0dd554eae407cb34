use color_eyre::eyre::Result;
use meterplan_core::analysis::{compare_perspectives, scenario_analysis};
use meterplan_core::config::preset_catalog;
use meterplan_core::run_scenario;

use super::{ScenarioArgs, write_output};
use crate::report;
use crate::scenario_file::{OutputFormat, render};

pub fn run(args: &ScenarioArgs, annual: bool) -> Result<()> {
    let (name, params) = args.params()?;
    let result = run_scenario(&params);
    tracing::info!(scenario = %name, npv = result.npv, "scenario run");
    args.emit(&result, |r| report::scenario_report(&name, r, annual))
}

pub fn compare(args: &ScenarioArgs) -> Result<()> {
    let (_, params) = args.params()?;
    let comparison = compare_perspectives(&params);
    args.emit(&comparison, report::comparison_report)
}

pub fn cases(args: &ScenarioArgs) -> Result<()> {
    let (_, params) = args.params()?;
    let cases = scenario_analysis(&params);
    match args.format {
        OutputFormat::Text => write_output(args.output.as_deref(), &report::cases_report(&cases)),
        format => {
            let rows: Vec<_> = cases
                .iter()
                .map(|c| (c.case.label(), c.outcome.completed().copied()))
                .collect();
            write_output(args.output.as_deref(), &render(&rows, format)?)
        }
    }
}

pub fn presets(format: OutputFormat) -> Result<()> {
    let catalog = preset_catalog();
    let content = match format {
        OutputFormat::Text => report::presets_report(&catalog),
        format => render(&catalog, format)?,
    };
    write_output(None, &content)
}
