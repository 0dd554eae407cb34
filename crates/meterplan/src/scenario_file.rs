//! Scenario files and rendered output.
//!
//! Scenario specs are read from YAML (`.yaml`/`.yml`) or JSON (`.json`),
//! picked by file extension. Results are rendered as text, JSON or YAML.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr, eyre};
use meterplan_core::config::ScenarioSpec;
use serde::Serialize;

/// Serialization format of a scenario file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Format implied by `path`'s extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Output format of command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

pub fn parse_spec(content: &str, format: FileFormat) -> Result<ScenarioSpec> {
    let spec = match format {
        FileFormat::Yaml => serde_saphyr::from_str(content).wrap_err("invalid YAML scenario")?,
        FileFormat::Json => serde_json::from_str(content).wrap_err("invalid JSON scenario")?,
    };
    Ok(spec)
}

/// Load a scenario spec, or the default scenario when no path is given.
pub fn load_spec(path: Option<&Path>) -> Result<ScenarioSpec> {
    let Some(path) = path else {
        return Ok(ScenarioSpec::default());
    };
    let format = FileFormat::from_path(path).ok_or_else(|| {
        eyre!(
            "cannot tell the format of {}: expected .yaml, .yml or .json",
            path.display()
        )
    })?;
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read scenario {}", path.display()))?;
    let mut spec = parse_spec(&content, format)
        .wrap_err_with(|| format!("failed to parse scenario {}", path.display()))?;
    if spec.name.is_none() {
        spec.name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    }
    tracing::debug!(path = %path.display(), "loaded scenario");
    Ok(spec)
}

/// Serialize `value` as JSON or YAML.
///
/// Text output has no generic form; callers render it themselves.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Text => {
            serde_json::to_string_pretty(value).wrap_err("failed to serialize JSON")
        }
        OutputFormat::Yaml => serde_saphyr::to_string(value).wrap_err("failed to serialize YAML"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meterplan_core::config::ParamKey;
    use meterplan_core::model::CostPerspective;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.yaml")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("a.YML")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("a.json")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("a.toml")), None);
        assert_eq!(FileFormat::from_path(Path::new("scenario")), None);
    }

    #[test]
    fn test_parse_yaml_spec() {
        let yaml = "\
presets:
  households: longueuil
  persistence: pessimistic
perspective: financial
horizon: 25
overrides:
  meter.meter_cost: 300.0
";
        let spec = parse_spec(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(spec.presets.households, "longueuil");
        assert_eq!(spec.presets.persistence, "pessimistic");
        assert_eq!(spec.presets.meter, ScenarioSpec::default().presets.meter);
        assert_eq!(spec.perspective, CostPerspective::Financial);
        assert_eq!(spec.horizon, 25);
        assert!(spec.overrides.contains_key(&ParamKey::MeterCost));
    }

    #[test]
    fn test_parse_json_spec_uses_defaults() {
        let spec = parse_spec("{}", FileFormat::Json).unwrap();
        assert_eq!(spec, ScenarioSpec::default());
    }

    #[test]
    fn test_load_spec_names_from_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("montreal-base.json");
        fs::write(&path, r#"{"presets": {"households": "montreal"}}"#).unwrap();

        let spec = load_spec(Some(&path)).unwrap();
        assert_eq!(spec.name.as_deref(), Some("montreal-base"));
        assert_eq!(spec.presets.households, "montreal");
    }

    #[test]
    fn test_load_spec_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenario.txt");
        fs::write(&path, "{}").unwrap();
        assert!(load_spec(Some(&path)).is_err());
    }

    #[test]
    fn test_load_spec_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_spec(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read scenario"));
    }
}
