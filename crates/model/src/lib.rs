//! Core domain model for the red-flag risk engine.
//!
//! This crate defines the types shared by every other crate:
//! - `FinancialInput`: one taxpayer submission, as entered
//! - `InputOverrides`: a partial submission used for what-if queries
//! - `SectorProfile`: expected ratios and thresholds for an industry
//! - `RuleId` / `Indicator`: the rules and the records they produce
//! - `AssessmentResult`: score, band, indicators, notes and ratios

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest score an assessment can carry.
pub const MAX_SCORE: u8 = 100;

/// Upper bound (inclusive) of the LOW band.
pub const LOW_BAND_MAX: u8 = 24;

/// Upper bound (inclusive) of the MODERATE band.
pub const MODERATE_BAND_MAX: u8 = 49;

/// Structurally invalid input. Raised before any scoring runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NonFiniteAmount { field: &'static str },

    #[error("Unknown accounting method: {0:?} (expected \"mileage\" or \"actual\")")]
    UnknownMethod(String),

    #[error("Unknown industry: {0:?}")]
    UnknownIndustry(String),

    #[error("Unknown rule set: {0:?} (expected \"v1\" or \"v2\")")]
    UnknownRuleSet(String),

    #[error("Assessment was scored against {stored:?}, not {given:?}")]
    ProfileMismatch { stored: String, given: String },
}

/// How vehicle costs are claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AccountingMethod {
    /// Simplified per-mile allowance
    Mileage,
    /// Actual running costs
    Actual,
}

impl Default for AccountingMethod {
    fn default() -> Self {
        Self::Actual
    }
}

impl AccountingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mileage => "mileage",
            Self::Actual => "actual",
        }
    }
}

impl FromStr for AccountingMethod {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mileage" => Ok(Self::Mileage),
            "actual" => Ok(Self::Actual),
            _ => Err(InputError::UnknownMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for AccountingMethod {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for AccountingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One taxpayer submission.
///
/// All monetary amounts are pounds and must be finite and non-negative.
/// Turnover may be zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialInput {
    /// Tax year label (e.g. "2023-24"), informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_year: Option<String>,

    /// Gross turnover
    pub turnover: f64,

    /// Total allowable expenses claimed
    pub total_expenses: f64,

    /// Motor running costs
    #[serde(default)]
    pub motor_costs: f64,

    /// Business miles claimed
    #[serde(default)]
    pub mileage_claimed: f64,

    /// Vehicle claim method
    #[serde(default)]
    pub method: AccountingMethod,

    /// Use of home as office
    #[serde(default)]
    pub home_office_amount: f64,

    #[serde(default)]
    pub phone_internet: f64,

    #[serde(default)]
    pub travel_subsistence: f64,

    #[serde(default)]
    pub marketing: f64,

    /// Taxpayer ticked "made a loss this year"
    #[serde(default)]
    pub loss_this_year: bool,

    /// Taxpayer ticked "made a loss last year"
    #[serde(default)]
    pub loss_last_year: bool,

    /// Has income from other sources, informational only
    #[serde(default)]
    pub other_income: bool,

    #[serde(default)]
    pub foreign_income: f64,

    #[serde(default)]
    pub capital_allowances: f64,

    /// Losses brought forward from earlier years
    #[serde(default)]
    pub loss_carry_forward: f64,
}

impl FinancialInput {
    /// Create a submission with only turnover and expenses set.
    pub fn new(turnover: f64, total_expenses: f64) -> Self {
        Self {
            turnover,
            total_expenses,
            ..Default::default()
        }
    }

    /// Every monetary field with its name, in declaration order.
    pub fn amounts(&self) -> [(&'static str, f64); 11] {
        [
            ("turnover", self.turnover),
            ("total_expenses", self.total_expenses),
            ("motor_costs", self.motor_costs),
            ("mileage_claimed", self.mileage_claimed),
            ("home_office_amount", self.home_office_amount),
            ("phone_internet", self.phone_internet),
            ("travel_subsistence", self.travel_subsistence),
            ("marketing", self.marketing),
            ("foreign_income", self.foreign_income),
            ("capital_allowances", self.capital_allowances),
            ("loss_carry_forward", self.loss_carry_forward),
        ]
    }

    /// Reject negative or non-finite amounts.
    pub fn validate(&self) -> Result<(), InputError> {
        for (field, value) in self.amounts() {
            if !value.is_finite() {
                return Err(InputError::NonFiniteAmount { field });
            }
            if value < 0.0 {
                return Err(InputError::NegativeAmount { field, value });
            }
        }
        Ok(())
    }
}

/// A partial `FinancialInput`. Present fields replace the baseline's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turnover: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_expenses: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motor_costs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage_claimed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<AccountingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_office_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_internet: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_subsistence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_this_year: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_last_year: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_income: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital_allowances: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loss_carry_forward: Option<f64>,
}

impl InputOverrides {
    /// Apply the present fields on top of `baseline`.
    pub fn apply(&self, baseline: &FinancialInput) -> FinancialInput {
        FinancialInput {
            tax_year: baseline.tax_year.clone(),
            turnover: self.turnover.unwrap_or(baseline.turnover),
            total_expenses: self.total_expenses.unwrap_or(baseline.total_expenses),
            motor_costs: self.motor_costs.unwrap_or(baseline.motor_costs),
            mileage_claimed: self.mileage_claimed.unwrap_or(baseline.mileage_claimed),
            method: self.method.unwrap_or(baseline.method),
            home_office_amount: self.home_office_amount.unwrap_or(baseline.home_office_amount),
            phone_internet: self.phone_internet.unwrap_or(baseline.phone_internet),
            travel_subsistence: self.travel_subsistence.unwrap_or(baseline.travel_subsistence),
            marketing: self.marketing.unwrap_or(baseline.marketing),
            loss_this_year: self.loss_this_year.unwrap_or(baseline.loss_this_year),
            loss_last_year: self.loss_last_year.unwrap_or(baseline.loss_last_year),
            other_income: self.other_income.unwrap_or(baseline.other_income),
            foreign_income: self.foreign_income.unwrap_or(baseline.foreign_income),
            capital_allowances: self.capital_allowances.unwrap_or(baseline.capital_allowances),
            loss_carry_forward: self.loss_carry_forward.unwrap_or(baseline.loss_carry_forward),
        }
    }

    /// Names of the fields this override sets, in declaration order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let present = [
            ("turnover", self.turnover.is_some()),
            ("total_expenses", self.total_expenses.is_some()),
            ("motor_costs", self.motor_costs.is_some()),
            ("mileage_claimed", self.mileage_claimed.is_some()),
            ("method", self.method.is_some()),
            ("home_office_amount", self.home_office_amount.is_some()),
            ("phone_internet", self.phone_internet.is_some()),
            ("travel_subsistence", self.travel_subsistence.is_some()),
            ("marketing", self.marketing.is_some()),
            ("loss_this_year", self.loss_this_year.is_some()),
            ("loss_last_year", self.loss_last_year.is_some()),
            ("other_income", self.other_income.is_some()),
            ("foreign_income", self.foreign_income.is_some()),
            ("capital_allowances", self.capital_allowances.is_some()),
            ("loss_carry_forward", self.loss_carry_forward.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

/// An inclusive percentage range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRange {
    pub min: f64,
    pub max: f64,
}

impl PercentRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Expected ratios and category thresholds for one industry.
///
/// Built-in profiles live in `redflag-catalog` and are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorProfile {
    /// Stable identifier (e.g. "consultant_it")
    pub id: &'static str,
    /// Display name (e.g. "IT Consultant / Contractor")
    pub name: &'static str,
    /// Expected profit as % of turnover
    pub profit_margin: PercentRange,
    /// Expected total expenses as % of turnover
    pub expense_ratio: PercentRange,
    /// Motor costs above this % of turnover are flagged
    pub motor_threshold: f64,
    /// Travel & subsistence above this % of turnover is flagged
    pub travel_threshold: f64,
    /// Home office above this % of turnover is flagged
    pub home_office_threshold: f64,
}

impl SectorProfile {
    /// Ranges are ordered and every threshold is a non-negative percentage.
    pub fn is_consistent(&self) -> bool {
        let ranges = [self.profit_margin, self.expense_ratio];
        let thresholds = [
            self.motor_threshold,
            self.travel_threshold,
            self.home_office_threshold,
        ];
        ranges.iter().all(|r| r.min <= r.max)
            && thresholds.iter().all(|t| *t >= 0.0)
            && self.expense_ratio.min >= 0.0
    }
}

/// Which battery of rules to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    /// Flat legacy thresholds, no sector awareness
    V1,
    /// Sector-profile thresholds plus extension indicators
    V2,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::V2
    }
}

impl RuleSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl FromStr for RuleSet {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            _ => Err(InputError::UnknownRuleSet(s.to_string())),
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much an indicator should worry the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    Low,
    Medium,
    High,
}

impl Weight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Every rule the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    LowProfitMargin,
    BelowSectorMargin,
    HighExpenseRatio,
    AboveSectorExpenseRatio,
    HighMotorCosts,
    HighMileageClaim,
    MileageMethodMotorCosts,
    HighHomeOffice,
    HighTravel,
    LossDeclared,
    ConsecutiveLosses,
    DataInconsistency,
    RoundedFigures,
    ForeignIncome,
    HighCapitalAllowances,
    LossCarryForward,
}

impl RuleId {
    /// Stable identifier, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowProfitMargin => "low_profit_margin",
            Self::BelowSectorMargin => "below_sector_margin",
            Self::HighExpenseRatio => "high_expense_ratio",
            Self::AboveSectorExpenseRatio => "above_sector_expense_ratio",
            Self::HighMotorCosts => "high_motor_costs",
            Self::HighMileageClaim => "high_mileage_claim",
            Self::MileageMethodMotorCosts => "mileage_method_motor_costs",
            Self::HighHomeOffice => "high_home_office",
            Self::HighTravel => "high_travel",
            Self::LossDeclared => "loss_declared",
            Self::ConsecutiveLosses => "consecutive_losses",
            Self::DataInconsistency => "data_inconsistency",
            Self::RoundedFigures => "rounded_figures",
            Self::ForeignIncome => "foreign_income",
            Self::HighCapitalAllowances => "high_capital_allowances",
            Self::LossCarryForward => "loss_carry_forward",
        }
    }

    /// Get a human-readable label for this rule.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LowProfitMargin => "Very Low Profit Margin",
            Self::BelowSectorMargin => "Below-Industry Profit Margin",
            Self::HighExpenseRatio => "High Expense Ratio",
            Self::AboveSectorExpenseRatio => "Above-Industry Expense Ratio",
            Self::HighMotorCosts => "High Motor Costs",
            Self::HighMileageClaim => "High Mileage Claim",
            Self::MileageMethodMotorCosts => "Mileage Method With Motor Costs",
            Self::HighHomeOffice => "High Home Office Claim",
            Self::HighTravel => "High Travel & Subsistence",
            Self::LossDeclared => "Loss Declared",
            Self::ConsecutiveLosses => "Consecutive Losses",
            Self::DataInconsistency => "Loss Declaration Inconsistent",
            Self::RoundedFigures => "Rounded Figures",
            Self::ForeignIncome => "Foreign Income Declared",
            Self::HighCapitalAllowances => "High Capital Allowances",
            Self::LossCarryForward => "Loss Carried Forward",
        }
    }

    /// Points added to the score when this rule triggers.
    pub fn points(&self) -> u8 {
        match self {
            Self::LowProfitMargin => 20,
            Self::BelowSectorMargin => 10,
            Self::HighExpenseRatio => 18,
            Self::AboveSectorExpenseRatio => 10,
            Self::HighMotorCosts => 12,
            Self::HighMileageClaim => 15,
            Self::MileageMethodMotorCosts => 10,
            Self::HighHomeOffice => 8,
            Self::HighTravel => 10,
            Self::LossDeclared => 12,
            Self::ConsecutiveLosses => 18,
            Self::DataInconsistency => 8,
            Self::RoundedFigures => 6,
            Self::ForeignIncome => 8,
            Self::HighCapitalAllowances => 6,
            Self::LossCarryForward => 5,
        }
    }

    pub fn weight(&self) -> Weight {
        match self {
            Self::LowProfitMargin
            | Self::HighExpenseRatio
            | Self::HighMileageClaim
            | Self::ConsecutiveLosses => Weight::High,
            Self::HighHomeOffice
            | Self::RoundedFigures
            | Self::HighCapitalAllowances
            | Self::LossCarryForward => Weight::Low,
            _ => Weight::Medium,
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluated rule, as shown to the taxpayer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: RuleId,

    /// Display name
    pub name: String,

    pub triggered: bool,

    /// Points this indicator contributed to the score (0 when not triggered)
    pub points: u8,

    pub weight: Weight,

    /// What was found, with the computed figures
    pub explanation: String,

    /// What HMRC typically looks at for this pattern
    pub hmrc_context: String,

    /// Records worth keeping
    pub documentation_tip: String,
}

impl Indicator {
    /// A rule that fired and contributes its points.
    pub fn triggered(
        id: RuleId,
        explanation: impl Into<String>,
        hmrc_context: impl Into<String>,
        documentation_tip: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: id.label().to_string(),
            triggered: true,
            points: id.points(),
            weight: id.weight(),
            explanation: explanation.into(),
            hmrc_context: hmrc_context.into(),
            documentation_tip: documentation_tip.into(),
        }
    }

    /// A rule that was checked and did not fire.
    pub fn clear(
        id: RuleId,
        explanation: impl Into<String>,
        hmrc_context: impl Into<String>,
        documentation_tip: impl Into<String>,
    ) -> Self {
        Self {
            triggered: false,
            points: 0,
            ..Self::triggered(id, explanation, hmrc_context, documentation_tip)
        }
    }
}

/// Serialize a display percentage rounded to two decimal places.
fn two_places<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

/// Figures derived from a submission.
///
/// Ratios are percentages of turnover. They serialize rounded to two
/// places; rules never compare against them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFigures {
    pub profit: f64,
    #[serde(serialize_with = "two_places")]
    pub profit_ratio: f64,
    #[serde(serialize_with = "two_places")]
    pub expense_ratio: f64,
    #[serde(serialize_with = "two_places")]
    pub motor_ratio: f64,
    #[serde(serialize_with = "two_places")]
    pub home_office_ratio: f64,
    #[serde(serialize_with = "two_places")]
    pub travel_ratio: f64,
    /// Miles claimed at the statutory per-mile rate
    pub mileage_value: f64,
    #[serde(serialize_with = "two_places")]
    pub mileage_value_ratio: f64,
    #[serde(serialize_with = "two_places")]
    pub capital_allowance_ratio: f64,
    /// Motor + home office + travel + phone/internet + marketing
    pub categorized_expenses: f64,
    /// How many headline figures look estimated (multiples of 500)
    pub rounded_figures: u8,
    /// Profit is zero or negative
    pub calculated_loss: bool,
    /// Loss ticked but the figures show a profit
    pub has_data_inconsistency: bool,
}

/// Overall risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    /// Map a (clamped) score to its band.
    pub fn from_score(score: u8) -> Self {
        if score <= LOW_BAND_MAX {
            Self::Low
        } else if score <= MODERATE_BAND_MAX {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete engine output for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub rule_set: RuleSet,

    /// Profile whose thresholds were applied
    pub profile_id: String,

    pub figures: DerivedFigures,

    /// Triggered indicators, in evaluation order
    pub indicators: Vec<Indicator>,

    /// Observations that never affect the score
    #[serde(default)]
    pub notes: Vec<String>,

    /// Score clamped to `0..=MAX_SCORE`
    pub score: u8,

    /// Sum of triggered points before clamping
    pub raw_score: u32,

    pub band: RiskBand,
}

impl AssessmentResult {
    /// Whether the given rule triggered.
    pub fn has(&self, id: RuleId) -> bool {
        self.indicators.iter().any(|i| i.id == id)
    }

    pub fn indicator_ids(&self) -> Vec<RuleId> {
        self.indicators.iter().map(|i| i.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!("mileage".parse::<AccountingMethod>(), Ok(AccountingMethod::Mileage));
        assert_eq!(" Actual ".parse::<AccountingMethod>(), Ok(AccountingMethod::Actual));
        assert_eq!(
            "flat-rate".parse::<AccountingMethod>(),
            Err(InputError::UnknownMethod("flat-rate".to_string()))
        );
    }

    #[test]
    fn test_input_deserialization_defaults() {
        let json = r#"{"turnover": 50000, "total_expenses": 30000, "method": "MILEAGE"}"#;
        let input: FinancialInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.turnover, 50_000.0);
        assert_eq!(input.method, AccountingMethod::Mileage);
        assert_eq!(input.foreign_income, 0.0);
        assert!(!input.loss_this_year);
    }

    #[test]
    fn test_input_rejects_unknown_method() {
        let json = r#"{"turnover": 1, "total_expenses": 1, "method": "lease"}"#;
        assert!(serde_json::from_str::<FinancialInput>(json).is_err());
    }

    #[test]
    fn test_validate_negative_amount() {
        let mut input = FinancialInput::new(10_000.0, 2_000.0);
        assert!(input.validate().is_ok());

        input.travel_subsistence = -1.0;
        assert_eq!(
            input.validate(),
            Err(InputError::NegativeAmount {
                field: "travel_subsistence",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_validate_non_finite() {
        let input = FinancialInput {
            marketing: f64::NAN,
            ..FinancialInput::new(10_000.0, 2_000.0)
        };
        assert_eq!(
            input.validate(),
            Err(InputError::NonFiniteAmount { field: "marketing" })
        );
    }

    #[test]
    fn test_overrides_apply_only_present_fields() {
        let baseline = FinancialInput {
            motor_costs: 5_000.0,
            loss_last_year: true,
            ..FinancialInput::new(50_000.0, 30_000.0)
        };
        let overrides = InputOverrides {
            motor_costs: Some(1_000.0),
            method: Some(AccountingMethod::Mileage),
            ..Default::default()
        };

        let applied = overrides.apply(&baseline);
        assert_eq!(applied.motor_costs, 1_000.0);
        assert_eq!(applied.method, AccountingMethod::Mileage);
        assert_eq!(applied.turnover, 50_000.0);
        assert!(applied.loss_last_year);
        assert_eq!(overrides.changed_fields(), vec!["motor_costs", "method"]);
        assert!(InputOverrides::default().is_empty());
    }

    #[test]
    fn test_overrides_reject_unknown_keys() {
        let ok: InputOverrides = serde_json::from_str(r#"{"turnover": 60000}"#).unwrap();
        assert_eq!(ok.turnover, Some(60_000.0));
        assert!(serde_json::from_str::<InputOverrides>(r#"{"turnvoer": 1}"#).is_err());
    }

    #[test]
    fn test_ratios_serialize_to_two_places() {
        let figures = DerivedFigures {
            profit: 22_500.0,
            expense_ratio: 27_500.0 / 50_000.0 * 100.0,
            motor_ratio: 100.0 / 3.0,
            ..Default::default()
        };
        let value = serde_json::to_value(&figures).unwrap();
        assert_eq!(value["expense_ratio"], 55.0);
        assert_eq!(value["motor_ratio"], 33.33);
        assert_eq!(value["profit"], 22_500.0);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RiskBand::from_score(0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(24), RiskBand::Low);
        assert_eq!(RiskBand::from_score(25), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(49), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(50), RiskBand::High);
        assert_eq!(RiskBand::from_score(100), RiskBand::High);
    }

    #[test]
    fn test_rule_id_serde_matches_as_str() {
        let json = serde_json::to_string(&RuleId::AboveSectorExpenseRatio).unwrap();
        assert_eq!(json, format!("\"{}\"", RuleId::AboveSectorExpenseRatio.as_str()));
    }

    #[test]
    fn test_clear_indicator_contributes_nothing() {
        let indicator = Indicator::clear(RuleId::HighTravel, "fine", "ctx", "tip");
        assert!(!indicator.triggered);
        assert_eq!(indicator.points, 0);
        assert_eq!(indicator.weight, Weight::Medium);
        assert_eq!(indicator.name, "High Travel & Subsistence");
    }

    #[test]
    fn test_rule_set_from_str() {
        assert_eq!("V1".parse::<RuleSet>(), Ok(RuleSet::V1));
        assert_eq!(RuleSet::default(), RuleSet::V2);
        assert!("v3".parse::<RuleSet>().is_err());
    }
}
