//! Risk scoring for self-assessment submissions.
//!
//! Runs a fixed, ordered battery of threshold checks over a submission and
//! its derived figures, producing a clamped score, a band, the triggered
//! indicators and a set of non-scoring notes.
//!
//! Two rule sets coexist:
//! - `RuleSet::V1` applies the flat legacy thresholds to every submission
//! - `RuleSet::V2` applies the sector profile and adds extension indicators

use redflag_catalog::flat_profile;
use redflag_explain::{high_margin_note, indicator_for, uncategorized_note};
use redflag_features::{below_share, derive_figures, exceeds_share, ratio, Facts};
use redflag_model::{
    AssessmentResult, AccountingMethod, FinancialInput, InputError, RiskBand, RuleId, RuleSet,
    SectorProfile, MAX_SCORE,
};

/// Profit margin below this is flagged whatever the sector.
pub const VERY_LOW_MARGIN: f64 = 5.0;

/// Margins above this earn a note, never points.
pub const HIGH_MARGIN_NOTE: f64 = 60.0;

/// Expense ratio above this is flagged whatever the sector.
pub const HIGH_EXPENSE_RATIO: f64 = 70.0;

/// Mileage value above this share of turnover is flagged.
pub const HIGH_MILEAGE_VALUE: f64 = 50.0;

/// Motor costs above this share of turnover conflict with the mileage method.
pub const MILEAGE_METHOD_MOTOR_RATIO: f64 = 10.0;

/// Minimum number of rounded headline figures to flag.
pub const MIN_ROUNDED_FIGURES: u8 = 3;

/// Capital allowances above this share of turnover are flagged (V2).
pub const HIGH_CAPITAL_ALLOWANCES: f64 = 30.0;

/// Itemised categories below this share of total expenses earn a note.
pub const MIN_CATEGORIZED_SHARE: f64 = 50.0;

/// One row of a rule table.
struct Rule {
    id: RuleId,
    applies: fn(&Facts<'_>) -> bool,
}

// Order is evaluation order and output order.
static CORE_RULES: [Rule; 13] = [
    Rule { id: RuleId::LowProfitMargin, applies: low_profit_margin },
    Rule { id: RuleId::BelowSectorMargin, applies: below_sector_margin },
    Rule { id: RuleId::HighExpenseRatio, applies: high_expense_ratio },
    Rule { id: RuleId::AboveSectorExpenseRatio, applies: above_sector_expense_ratio },
    Rule { id: RuleId::HighMotorCosts, applies: high_motor_costs },
    Rule { id: RuleId::HighMileageClaim, applies: high_mileage_claim },
    Rule { id: RuleId::MileageMethodMotorCosts, applies: mileage_method_motor_costs },
    Rule { id: RuleId::HighHomeOffice, applies: high_home_office },
    Rule { id: RuleId::HighTravel, applies: high_travel },
    Rule { id: RuleId::LossDeclared, applies: loss_declared },
    Rule { id: RuleId::ConsecutiveLosses, applies: consecutive_losses },
    Rule { id: RuleId::DataInconsistency, applies: data_inconsistency },
    Rule { id: RuleId::RoundedFigures, applies: rounded_figures },
];

static EXTENSION_RULES: [Rule; 3] = [
    Rule { id: RuleId::ForeignIncome, applies: foreign_income },
    Rule { id: RuleId::HighCapitalAllowances, applies: high_capital_allowances },
    Rule { id: RuleId::LossCarryForward, applies: loss_carry_forward },
];

fn rule_table(rule_set: RuleSet) -> impl Iterator<Item = &'static Rule> {
    let extensions: &'static [Rule] = match rule_set {
        RuleSet::V1 => &[],
        RuleSet::V2 => &EXTENSION_RULES,
    };
    CORE_RULES.iter().chain(extensions.iter())
}

/// The rules a rule set evaluates, in order.
pub fn rules(rule_set: RuleSet) -> Vec<RuleId> {
    rule_table(rule_set).map(|r| r.id).collect()
}

// Thresholds are compared on the raw amounts (`exceeds_share` /
// `below_share`); the ratios in `DerivedFigures` are for display.

// Profit-margin bands only apply to a profit; a loss is scored separately.
// The fixed 5% band takes precedence over the sector band.
fn low_profit_margin(facts: &Facts<'_>) -> bool {
    let f = facts.figures;
    f.profit > 0.0 && below_share(f.profit, facts.input.turnover, VERY_LOW_MARGIN)
}

fn below_sector_margin(facts: &Facts<'_>) -> bool {
    let f = facts.figures;
    let turnover = facts.input.turnover;
    f.profit > 0.0
        && !below_share(f.profit, turnover, VERY_LOW_MARGIN)
        && below_share(f.profit, turnover, facts.profile.profit_margin.min)
}

fn high_expense_ratio(facts: &Facts<'_>) -> bool {
    let input = facts.input;
    exceeds_share(input.total_expenses, input.turnover, HIGH_EXPENSE_RATIO)
}

fn above_sector_expense_ratio(facts: &Facts<'_>) -> bool {
    let input = facts.input;
    !high_expense_ratio(facts)
        && exceeds_share(
            input.total_expenses,
            input.turnover,
            facts.profile.expense_ratio.max,
        )
}

fn high_motor_costs(facts: &Facts<'_>) -> bool {
    let input = facts.input;
    exceeds_share(input.motor_costs, input.turnover, facts.profile.motor_threshold)
}

fn high_mileage_claim(facts: &Facts<'_>) -> bool {
    exceeds_share(
        facts.figures.mileage_value,
        facts.input.turnover,
        HIGH_MILEAGE_VALUE,
    )
}

fn mileage_method_motor_costs(facts: &Facts<'_>) -> bool {
    let input = facts.input;
    input.method == AccountingMethod::Mileage
        && exceeds_share(input.motor_costs, input.turnover, MILEAGE_METHOD_MOTOR_RATIO)
}

fn high_home_office(facts: &Facts<'_>) -> bool {
    let input = facts.input;
    exceeds_share(
        input.home_office_amount,
        input.turnover,
        facts.profile.home_office_threshold,
    )
}

fn high_travel(facts: &Facts<'_>) -> bool {
    let input = facts.input;
    exceeds_share(
        input.travel_subsistence,
        input.turnover,
        facts.profile.travel_threshold,
    )
}

fn loss_declared(facts: &Facts<'_>) -> bool {
    facts.figures.calculated_loss
}

fn consecutive_losses(facts: &Facts<'_>) -> bool {
    facts.figures.calculated_loss && facts.input.loss_last_year
}

// Exclusive with the loss rules: requires a calculated profit.
fn data_inconsistency(facts: &Facts<'_>) -> bool {
    facts.figures.has_data_inconsistency
}

fn rounded_figures(facts: &Facts<'_>) -> bool {
    facts.figures.rounded_figures >= MIN_ROUNDED_FIGURES
}

fn foreign_income(facts: &Facts<'_>) -> bool {
    facts.input.foreign_income > 0.0
}

fn high_capital_allowances(facts: &Facts<'_>) -> bool {
    let input = facts.input;
    exceeds_share(input.capital_allowances, input.turnover, HIGH_CAPITAL_ALLOWANCES)
}

fn loss_carry_forward(facts: &Facts<'_>) -> bool {
    facts.input.loss_carry_forward > 0.0
}

fn contextual_notes(facts: &Facts<'_>) -> Vec<String> {
    let f = facts.figures;
    let input = facts.input;
    let mut notes = Vec::new();

    if f.profit > 0.0 && exceeds_share(f.profit, input.turnover, HIGH_MARGIN_NOTE) {
        notes.push(high_margin_note(f.profit_ratio));
    }

    if below_share(f.categorized_expenses, input.total_expenses, MIN_CATEGORIZED_SHARE) {
        notes.push(uncategorized_note(
            f.categorized_expenses,
            input.total_expenses,
            ratio(f.categorized_expenses, input.total_expenses),
        ));
    }

    notes
}

/// Clamp a raw point total into `0..=MAX_SCORE`.
pub fn clamp_score(raw: u32) -> u8 {
    raw.min(u32::from(MAX_SCORE)) as u8
}

/// Score a submission.
///
/// Under `RuleSet::V1` the flat thresholds replace `profile`. The input is
/// validated before anything is computed; no partial result is returned.
pub fn evaluate(
    input: &FinancialInput,
    profile: &SectorProfile,
    rule_set: RuleSet,
) -> Result<AssessmentResult, InputError> {
    input.validate()?;

    let profile = match rule_set {
        RuleSet::V1 => flat_profile(),
        RuleSet::V2 => profile,
    };
    let figures = derive_figures(input);
    let facts = Facts::new(input, &figures, profile);

    let mut indicators = Vec::new();
    let mut raw_score: u32 = 0;

    for rule in rule_table(rule_set) {
        if (rule.applies)(&facts) {
            tracing::trace!(rule = %rule.id, points = rule.id.points(), "Rule triggered");
            raw_score += u32::from(rule.id.points());
            indicators.push(indicator_for(rule.id, &facts));
        }
    }

    let notes = contextual_notes(&facts);
    let score = clamp_score(raw_score);
    let band = RiskBand::from_score(score);

    tracing::debug!(
        rule_set = %rule_set,
        profile = profile.id,
        score,
        raw_score,
        band = %band,
        indicators = indicators.len(),
        "Assessment evaluated"
    );

    Ok(AssessmentResult {
        rule_set,
        profile_id: profile.id.to_string(),
        figures,
        indicators,
        notes,
        score,
        raw_score,
        band,
    })
}
