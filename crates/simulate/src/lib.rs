//! What-if simulation over a baseline submission.
//!
//! Applies partial overrides to a baseline and re-runs the engine. Nothing
//! is persisted; the result only describes how the score would move.

use redflag_engine::evaluate;
use redflag_model::{
    AssessmentResult, FinancialInput, InputError, InputOverrides, RiskBand, RuleId, RuleSet,
    SectorProfile,
};
use serde::{Deserialize, Serialize};

/// Original and simulated outcomes side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub original_score: u8,
    pub original_band: RiskBand,

    /// Full result for the overridden input
    pub simulated: AssessmentResult,

    /// Simulated minus original score
    pub score_delta: i16,

    pub band_changed: bool,

    /// Indicators present originally but not after the overrides
    pub resolved: Vec<RuleId>,

    /// Indicators that only appear after the overrides
    pub introduced: Vec<RuleId>,

    /// Fields the overrides set
    pub changed_fields: Vec<String>,
}

impl Simulation {
    pub fn simulated_score(&self) -> u8 {
        self.simulated.score
    }

    pub fn simulated_band(&self) -> RiskBand {
        self.simulated.band
    }
}

/// Evaluate the baseline and the overridden input, then compare.
pub fn simulate(
    baseline: &FinancialInput,
    overrides: &InputOverrides,
    profile: &SectorProfile,
    rule_set: RuleSet,
) -> Result<Simulation, InputError> {
    let original = evaluate(baseline, profile, rule_set)?;
    simulate_stored(&original, baseline, overrides, profile)
}

/// Compare against a stored assessment.
///
/// The stored score, band and rule set are taken as the original; they are
/// never recomputed from `baseline`. Under V2 `profile` must be the one the
/// stored result was scored against. V1 results carry the flat thresholds
/// and accept any profile.
pub fn simulate_stored(
    stored: &AssessmentResult,
    baseline: &FinancialInput,
    overrides: &InputOverrides,
    profile: &SectorProfile,
) -> Result<Simulation, InputError> {
    if stored.rule_set == RuleSet::V2 && stored.profile_id != profile.id {
        return Err(InputError::ProfileMismatch {
            stored: stored.profile_id.clone(),
            given: profile.id.to_string(),
        });
    }

    let input = overrides.apply(baseline);
    let simulated = evaluate(&input, profile, stored.rule_set)?;

    let before = stored.indicator_ids();
    let after = simulated.indicator_ids();
    let resolved = before.iter().filter(|id| !after.contains(id)).copied().collect();
    let introduced = after.iter().filter(|id| !before.contains(id)).copied().collect();

    let score_delta = i16::from(simulated.score) - i16::from(stored.score);

    tracing::debug!(
        original = stored.score,
        simulated = simulated.score,
        delta = score_delta,
        overrides = ?overrides.changed_fields(),
        "Simulation evaluated"
    );

    Ok(Simulation {
        original_score: stored.score,
        original_band: stored.band,
        band_changed: stored.band != simulated.band,
        score_delta,
        resolved,
        introduced,
        changed_fields: overrides
            .changed_fields()
            .into_iter()
            .map(str::to_string)
            .collect(),
        simulated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use redflag_catalog::profile_for;
    use redflag_model::AccountingMethod;

    fn baseline() -> FinancialInput {
        FinancialInput {
            motor_costs: 5_000.0,
            mileage_claimed: 3_000.0,
            method: AccountingMethod::Actual,
            home_office_amount: 3_000.0,
            travel_subsistence: 5_000.0,
            marketing: 2_000.0,
            loss_this_year: true,
            ..FinancialInput::new(50_000.0, 30_000.0)
        }
    }

    #[test]
    fn test_matches_direct_evaluation() {
        let profile = profile_for(Some("consultant_it"));
        let overrides = InputOverrides {
            total_expenses: Some(20_000.0),
            travel_subsistence: Some(9_000.0),
            ..Default::default()
        };

        let simulation = simulate(&baseline(), &overrides, profile, RuleSet::V2).unwrap();
        let direct = evaluate(&overrides.apply(&baseline()), profile, RuleSet::V2).unwrap();
        assert_eq!(simulation.simulated, direct);
    }

    #[test]
    fn test_fixing_loss_declaration_resolves_inconsistency() {
        let profile = profile_for(None);
        let overrides = InputOverrides {
            loss_this_year: Some(false),
            ..Default::default()
        };

        let simulation = simulate(&baseline(), &overrides, profile, RuleSet::V2).unwrap();
        assert_eq!(simulation.original_score, 14);
        assert_eq!(simulation.simulated_score(), 6);
        assert_eq!(simulation.score_delta, -8);
        assert_eq!(simulation.resolved, vec![RuleId::DataInconsistency]);
        assert!(simulation.introduced.is_empty());
        assert!(!simulation.band_changed);
        assert_eq!(simulation.changed_fields, vec!["loss_this_year".to_string()]);
    }

    #[test]
    fn test_introduced_indicators_and_band_change() {
        let profile = profile_for(None);
        let overrides = InputOverrides {
            total_expenses: Some(52_000.0),
            loss_last_year: Some(true),
            ..Default::default()
        };

        let simulation = simulate(&baseline(), &overrides, profile, RuleSet::V2).unwrap();
        assert_eq!(
            simulation.introduced,
            vec![
                RuleId::HighExpenseRatio,
                RuleId::LossDeclared,
                RuleId::ConsecutiveLosses
            ]
        );
        assert_eq!(simulation.resolved, vec![RuleId::DataInconsistency]);
        assert_eq!(simulation.simulated_band(), RiskBand::High);
        assert!(simulation.band_changed);
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let profile = profile_for(None);
        let simulation =
            simulate(&baseline(), &InputOverrides::default(), profile, RuleSet::V1).unwrap();
        assert_eq!(simulation.score_delta, 0);
        assert_eq!(simulation.simulated.rule_set, RuleSet::V1);
        assert!(simulation.changed_fields.is_empty());
    }

    #[test]
    fn test_stored_result_is_authoritative() {
        let profile = profile_for(None);
        let mut stored = evaluate(&baseline(), profile, RuleSet::V1).unwrap();
        stored.score = 40;
        stored.band = RiskBand::Moderate;

        let simulation =
            simulate_stored(&stored, &baseline(), &InputOverrides::default(), profile).unwrap();
        assert_eq!(simulation.original_score, 40);
        assert_eq!(simulation.original_band, RiskBand::Moderate);
        assert_eq!(simulation.simulated.rule_set, RuleSet::V1);
        assert_eq!(simulation.score_delta, i16::from(simulation.simulated.score) - 40);
    }

    #[test]
    fn test_stored_profile_must_match() {
        let consultant = profile_for(Some("consultant_it"));
        let stored = evaluate(&baseline(), consultant, RuleSet::V2).unwrap();
        let overrides = InputOverrides::default();

        let err = simulate_stored(&stored, &baseline(), &overrides, profile_for(Some("retail")))
            .unwrap_err();
        assert_eq!(
            err,
            InputError::ProfileMismatch {
                stored: "consultant_it".to_string(),
                given: "retail".to_string()
            }
        );
        assert!(simulate_stored(&stored, &baseline(), &overrides, consultant).is_ok());

        // V1 stores the flat profile and takes any caller profile
        let flat = evaluate(&baseline(), consultant, RuleSet::V1).unwrap();
        assert_eq!(flat.profile_id, "flat");
        assert!(simulate_stored(&flat, &baseline(), &overrides, profile_for(Some("retail"))).is_ok());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = InputOverrides {
            marketing: Some(-100.0),
            ..Default::default()
        };
        let err = simulate(&baseline(), &overrides, profile_for(None), RuleSet::V2).unwrap_err();
        assert_eq!(
            err,
            InputError::NegativeAmount {
                field: "marketing",
                value: -100.0
            }
        );
    }
}
