use std::fmt;

use crate::config::{ParamKey, PresetCategory};

/// One violated validation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Dotted path of the offending field
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors raised while assembling a parameter set
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// One or more range or consistency rules failed
    Validation { violations: Vec<Violation> },
    UnknownPreset {
        category: PresetCategory,
        name: String,
    },
    /// The override targets a module or mode that is not active
    InapplicableOverride { key: ParamKey, reason: String },
    InvalidOverrideValue { key: ParamKey, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Validation { violations } => {
                write!(f, "invalid configuration")?;
                for (i, v) in violations.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{sep}{v}")?;
                }
                Ok(())
            }
            ConfigError::UnknownPreset { category, name } => {
                write!(f, "unknown {} preset '{name}'", category.as_str())
            }
            ConfigError::InapplicableOverride { key, reason } => {
                write!(f, "override '{}' does not apply: {reason}", key.as_str())
            }
            ConfigError::InvalidOverrideValue { key, reason } => {
                write!(f, "invalid value for '{}': {reason}", key.as_str())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    /// Violations carried by a validation failure, empty otherwise.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            ConfigError::Validation { violations } => violations,
            _ => &[],
        }
    }
}

/// Errors that abort a whole sweep
#[derive(Debug, Clone, PartialEq)]
pub enum SweepError {
    /// The baseline parameter set is invalid
    Config(ConfigError),
    /// Nothing to sweep
    EmptySweep,
    /// Cancelled before any variant completed
    Cancelled,
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(e) => write!(f, "baseline configuration error: {e}"),
            SweepError::EmptySweep => write!(f, "sweep has no parameters or variants"),
            SweepError::Cancelled => write!(f, "sweep cancelled"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        SweepError::Config(e)
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
