//! Behavioral persistence regimes.

use serde::{Deserialize, Serialize};

/// Decay path of the pessimistic regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fadeout {
    /// α(t) = α₀·e^{−λt}
    Exponential { decay_rate: f64 },
    /// α(t) = α₀·max(0, 1 − t/years)
    Linear { years: u32 },
}

/// Assumption about how long the behavioral saving induced by metering lasts.
///
/// `initial` is the share of net household consumption saved in the first
/// year with the reference meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceRegime {
    /// Habits persist: the effect stays at its initial level
    Optimistic { initial: f64 },
    /// The effect decays exponentially toward a lasting plateau
    Realistic {
        initial: f64,
        decay_rate: f64,
        floor: f64,
    },
    /// The effect fades out entirely
    Pessimistic { initial: f64, fadeout: Fadeout },
}

impl Default for PersistenceRegime {
    fn default() -> Self {
        Self::Realistic {
            initial: 0.08,
            decay_rate: 0.15,
            floor: 0.025,
        }
    }
}

impl PersistenceRegime {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimistic { .. } => "Optimistic",
            Self::Realistic { .. } => "Realistic",
            Self::Pessimistic { .. } => "Pessimistic",
        }
    }

    /// Effect level in the first year.
    #[must_use]
    pub fn initial(&self) -> f64 {
        match self {
            Self::Optimistic { initial }
            | Self::Realistic { initial, .. }
            | Self::Pessimistic { initial, .. } => *initial,
        }
    }
}
