//! Behavioral persistence curve α_B(t).

use crate::model::{Fadeout, PersistenceRegime};

/// Behavioral reduction active in year `t` with the reference meter.
#[must_use]
pub fn alpha(regime: &PersistenceRegime, t: u32) -> f64 {
    let t = f64::from(t);
    let value = match regime {
        PersistenceRegime::Optimistic { initial } => *initial,
        PersistenceRegime::Realistic {
            initial,
            decay_rate,
            floor,
        } => floor + (initial - floor) * (-decay_rate * t).exp(),
        PersistenceRegime::Pessimistic { initial, fadeout } => match fadeout {
            Fadeout::Exponential { decay_rate } => initial * (-decay_rate * t).exp(),
            Fadeout::Linear { years } => initial * (1.0 - t / f64::from(*years)).max(0.0),
        },
    };
    value.clamp(0.0, 1.0)
}

/// α_B(t) for t = 0..=horizon.
#[must_use]
pub fn alpha_series(regime: &PersistenceRegime, horizon: u32) -> Vec<f64> {
    (0..=horizon).map(|t| alpha(regime, t)).collect()
}

/// α_B(t) scaled by the meter's behavior efficiency, clamped to [0, 1].
#[must_use]
pub fn effective_alpha_series(
    regime: &PersistenceRegime,
    behavior_efficiency: f64,
    horizon: u32,
) -> Vec<f64> {
    alpha_series(regime, horizon)
        .into_iter()
        .map(|a| (a * behavior_efficiency).clamp(0.0, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresetCategory;
    use crate::config::presets::persistence_preset;

    #[test]
    fn test_realistic_half_life() {
        let regime = PersistenceRegime::Realistic {
            initial: 0.08,
            decay_rate: 0.15,
            floor: 0.0,
        };
        // ln 2 / 0.15 ≈ 4.62 years
        let a5 = alpha(&regime, 5);
        assert!((a5 - 0.08 * (-0.75f64).exp()).abs() < 1e-12);
        assert!(a5 < 0.04 && a5 > 0.035);
    }

    #[test]
    fn test_pessimistic_preset_fades_toward_zero() {
        let regime = persistence_preset("pessimistic").unwrap();
        let series = alpha_series(&regime, 20);
        assert!(series.windows(2).all(|w| w[1] < w[0]));
        assert!(series[20] < 0.01 * series[0], "alpha(20) = {}", series[20]);
        assert!(series[20] >= 0.0);
    }

    #[test]
    fn test_realistic_preset_converges_to_positive_floor() {
        let regime = persistence_preset("realistic").unwrap();
        let PersistenceRegime::Realistic { floor, .. } = regime else {
            panic!("realistic preset is not a realistic regime");
        };
        assert!(floor > 0.0);
        let series = alpha_series(&regime, 100);
        assert!(series.windows(2).all(|w| w[1] <= w[0]));
        assert!(series.iter().all(|&a| a >= floor));
        assert!((series[100] - floor).abs() < 1e-6);
    }

    #[test]
    fn test_every_preset_stays_in_unit_range() {
        for name in PresetCategory::Persistence.names() {
            let regime = persistence_preset(name).unwrap();
            for (t, a) in alpha_series(&regime, 50).iter().enumerate() {
                assert!((0.0..=1.0).contains(a), "{name}: alpha({t}) = {a}");
            }
        }
    }

    #[test]
    fn test_linear_fadeout_reaches_zero() {
        let regime = PersistenceRegime::Pessimistic {
            initial: 0.08,
            fadeout: Fadeout::Linear { years: 10 },
        };
        assert!((alpha(&regime, 5) - 0.04).abs() < 1e-12);
        assert_eq!(alpha(&regime, 10), 0.0);
        assert_eq!(alpha(&regime, 15), 0.0);
    }

    #[test]
    fn test_efficiency_scaling() {
        let regime = PersistenceRegime::Optimistic { initial: 0.08 };
        let series = effective_alpha_series(&regime, 0.625, 3);
        assert_eq!(series.len(), 4);
        assert!(series.iter().all(|a| (a - 0.05).abs() < 1e-12));
    }
}
