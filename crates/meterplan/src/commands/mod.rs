//! Subcommand definitions and dispatch.

mod export;
mod scenario;
mod sweep;
mod verify;

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use meterplan_core::ParameterSet;
use meterplan_core::config::ScenarioSpec;
use meterplan_core::model::CostPerspective;
use serde::Serialize;

use crate::scenario_file::{OutputFormat, load_spec, render};
use crate::util::atomic_write;

pub use export::export_grid;
pub use verify::{ExpectedIndicators, Mismatch, compare_expected};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one scenario and report its indicators
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Include the year-by-year table in text output
        #[arg(long)]
        annual: bool,
    },
    /// One-at-a-time sensitivity of NPV to each parameter
    Tornado {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Relative variation applied to each parameter
        #[arg(long, default_value_t = 0.2)]
        delta: f64,
        /// Parameter to vary (repeatable); defaults to the standard set
        #[arg(long = "key", value_name = "KEY")]
        keys: Vec<meterplan_core::ParamKey>,
    },
    /// Economic and financial perspectives side by side
    Compare {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Pessimistic, base and optimistic multiplier bundles
    Cases {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
    /// Cartesian sweep over preset categories
    Grid {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Axis as `category=name,name,...`, or just `category` for every preset
        #[arg(long = "axis", value_name = "AXIS", required = true)]
        axes: Vec<String>,
    },
    /// Write every meter × persistence × leak preset combination as JSON
    Export {
        /// Output directory
        dir: PathBuf,
        /// Base scenario file the presets are applied to
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
    /// Monte Carlo NPV distribution over calibration ranges
    Uncertainty {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long, default_value_t = 1000)]
        draws: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = Distribution::Uniform)]
        distribution: Distribution,
    },
    /// List registered presets
    Presets {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check canonical scenarios against stored expected values
    Verify {
        /// Expected values file
        #[arg(long, default_value = "canonical_expected.json")]
        expected: PathBuf,
        /// Relative tolerance
        #[arg(long, default_value_t = 1e-6)]
        tolerance: f64,
        /// Record current values instead of checking them
        #[arg(long)]
        record: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Distribution {
    Uniform,
    Triangular,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Perspective {
    Economic,
    Financial,
}

impl From<Perspective> for CostPerspective {
    fn from(p: Perspective) -> Self {
        match p {
            Perspective::Economic => CostPerspective::Economic,
            Perspective::Financial => CostPerspective::Financial,
        }
    }
}

/// Scenario selection and output options shared by most commands.
#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Scenario file (.yaml, .yml or .json); the default scenario if omitted
    pub scenario: Option<PathBuf>,
    /// Override the scenario's cost perspective
    #[arg(short, long, value_enum)]
    pub perspective: Option<Perspective>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ScenarioArgs {
    pub fn spec(&self) -> Result<ScenarioSpec> {
        let mut spec = load_spec(self.scenario.as_deref())?;
        if let Some(p) = self.perspective {
            spec.perspective = p.into();
        }
        Ok(spec)
    }

    pub fn params(&self) -> Result<(String, ParameterSet)> {
        let spec = self.spec()?;
        let name = spec.name.clone().unwrap_or_else(|| "default".to_string());
        let params = ParameterSet::assemble(&spec)
            .wrap_err_with(|| format!("scenario '{name}' is invalid"))?;
        Ok((name, params))
    }

    /// Emit `value` as text via `text`, or serialized.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        let content = match self.format {
            OutputFormat::Text => text(value),
            format => render(value, format)?,
        };
        write_output(self.output.as_deref(), &content)
    }
}

pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            atomic_write(path, content)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "output written");
        }
        None => println!("{content}"),
    }
    Ok(())
}

pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Run { scenario, annual } => scenario::run(&scenario, annual),
        Command::Tornado {
            scenario,
            delta,
            keys,
        } => sweep::tornado(&scenario, delta, keys),
        Command::Compare { scenario } => scenario::compare(&scenario),
        Command::Cases { scenario } => scenario::cases(&scenario),
        Command::Grid { scenario, axes } => sweep::grid(&scenario, &axes),
        Command::Export { dir, scenario } => {
            let spec = load_spec(scenario.as_deref())?;
            let written = export_grid(&spec, &dir)?;
            println!("{written} scenarios written to {}", dir.display());
            Ok(())
        }
        Command::Uncertainty {
            scenario,
            draws,
            seed,
            distribution,
        } => sweep::uncertainty(&scenario, draws, seed, distribution),
        Command::Presets { format } => scenario::presets(format),
        Command::Verify {
            expected,
            tolerance,
            record,
        } => verify::verify(&expected, tolerance, record),
    }
}
