//! Fixed library of named scenarios used for regression checks.

use super::{OverrideValue, ParamKey, PresetSelection, ScenarioSpec};
use crate::model::{CostPerspective, DiscountRates};

/// A named scenario whose indicators are tracked across releases.
#[derive(Debug, Clone)]
pub struct CanonicalScenario {
    pub id: &'static str,
    pub description: &'static str,
    pub spec: ScenarioSpec,
}

fn scenario(
    households: &str,
    meter: &str,
    persistence: &str,
    leaks: &str,
    perspective: CostPerspective,
) -> ScenarioSpec {
    ScenarioSpec::from_presets(PresetSelection {
        households: households.to_string(),
        meter: meter.to_string(),
        persistence: persistence.to_string(),
        leaks: Some(leaks.to_string()),
        ..PresetSelection::default()
    })
    .perspective(perspective)
}

fn canonical(id: &'static str, description: &'static str, spec: ScenarioSpec) -> CanonicalScenario {
    CanonicalScenario {
        id,
        description,
        spec: spec.named(id),
    }
}

/// The canonical scenarios, in a stable order.
#[must_use]
pub fn canonical_scenarios() -> Vec<CanonicalScenario> {
    use CostPerspective::{Economic, Financial};

    vec![
        canonical(
            "longueuil-ami-realistic-eco",
            "Base case: Longueuil, AMI, realistic persistence, two-stock leaks",
            scenario("longueuil", "continuous-remote", "realistic", "household", Economic),
        ),
        canonical(
            "longueuil-ami-realistic-fin",
            "Base case under the municipal budget perspective",
            scenario("longueuil", "continuous-remote", "realistic", "household", Financial),
        ),
        canonical(
            "longueuil-ami-optimistic-eco",
            "Upper bound: behavioral effect persists",
            scenario("longueuil", "continuous-remote", "optimistic", "household", Economic),
        ),
        canonical(
            "longueuil-ami-pessimistic-eco",
            "Lower bound: behavioral effect fades out",
            scenario("longueuil", "continuous-remote", "pessimistic", "household", Economic),
        ),
        canonical(
            "longueuil-manual-realistic-eco",
            "Manual meters instead of AMI",
            scenario("longueuil", "manual", "realistic", "household", Economic),
        ),
        canonical(
            "longueuil-amr-realistic-eco",
            "Drive-by AMR meters instead of AMI",
            scenario("longueuil", "periodic-remote", "realistic", "household", Economic),
        ),
        canonical(
            "montreal-ami-realistic-eco",
            "Large city with high per-capita use",
            scenario("montreal", "continuous-remote", "realistic", "household", Economic),
        ),
        canonical(
            "longueuil-ami-realistic-blended-eco",
            "Single blended leak stock instead of two stocks",
            scenario("longueuil", "continuous-remote", "realistic", "household", Economic)
                .with_override(ParamKey::Differentiated, OverrideValue::Flag(false)),
        ),
        canonical(
            "longueuil-ami-realistic-quebec-eco",
            "Never-metered city leak prevalence",
            scenario("longueuil", "continuous-remote", "realistic", "quebec", Economic),
        ),
        canonical(
            "winnipeg-ami-realistic-eco",
            "External benchmark: Winnipeg",
            scenario("winnipeg", "continuous-remote", "realistic", "household", Economic),
        ),
        canonical(
            "reference-ami-realistic-5pct",
            "Reference stock at a 5% discount rate",
            ScenarioSpec {
                discount_rates: Some(DiscountRates {
                    social: 0.05,
                    municipal: 0.05,
                }),
                ..scenario("reference", "continuous-remote", "realistic", "household", Economic)
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParameterSet;

    #[test]
    fn test_canonical_scenarios_assemble() {
        let scenarios = canonical_scenarios();
        assert_eq!(scenarios.len(), 11);
        for scenario in &scenarios {
            assert_eq!(scenario.spec.name.as_deref(), Some(scenario.id));
            ParameterSet::assemble(&scenario.spec)
                .unwrap_or_else(|e| panic!("{} failed to assemble: {e}", scenario.id));
        }
    }

    #[test]
    fn test_canonical_ids_unique() {
        let scenarios = canonical_scenarios();
        let mut ids: Vec<_> = scenarios.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), scenarios.len());
    }
}
