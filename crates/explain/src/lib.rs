//! Explanation generation for risk indicators.
//!
//! Converts triggered rules into human-readable text suitable for the
//! assessment preview and the paid report. Every explanation quotes the
//! figures that triggered it.

use redflag_features::Facts;
use redflag_model::{AssessmentResult, Indicator, RuleId};
use serde::{Deserialize, Serialize};

/// Format an amount as whole pounds with thousands separators.
pub fn pounds(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-£{}", grouped)
    } else {
        format!("£{}", grouped)
    }
}

/// Describe what the rule found, quoting the figures.
pub fn describe(rule: RuleId, facts: &Facts<'_>) -> String {
    let f = facts.figures;
    let input = facts.input;
    let profile = facts.profile;

    match rule {
        RuleId::LowProfitMargin => format!(
            "Profit of {} is only {:.1}% of turnover ({}). Margins below 5% are \
             uncommon for a sole trader and suggest expenses may be overstated.",
            pounds(f.profit),
            f.profit_ratio,
            pounds(input.turnover)
        ),
        RuleId::BelowSectorMargin => format!(
            "Profit margin of {:.1}% is below the {:.0}% typically seen for {}.",
            f.profit_ratio, profile.profit_margin.min, profile.name
        ),
        RuleId::HighExpenseRatio => format!(
            "Expenses of {} are {:.1}% of turnover, above the 70% level that \
             draws attention regardless of industry.",
            pounds(input.total_expenses),
            f.expense_ratio
        ),
        RuleId::AboveSectorExpenseRatio => format!(
            "Expenses are {:.1}% of turnover, above the {:.0}% upper bound expected for {}.",
            f.expense_ratio, profile.expense_ratio.max, profile.name
        ),
        RuleId::HighMotorCosts => format!(
            "Motor costs of {} are {:.1}% of turnover, above the {:.0}% threshold for {}.",
            pounds(input.motor_costs),
            f.motor_ratio,
            profile.motor_threshold,
            profile.name
        ),
        RuleId::HighMileageClaim => format!(
            "{:.0} miles at 45p is worth {}, which is {:.1}% of turnover.",
            input.mileage_claimed,
            pounds(f.mileage_value),
            f.mileage_value_ratio
        ),
        RuleId::MileageMethodMotorCosts => format!(
            "The mileage method is selected but separate motor costs of {} ({:.1}% of \
             turnover) are also claimed. The per-mile rate already covers running costs.",
            pounds(input.motor_costs),
            f.motor_ratio
        ),
        RuleId::HighHomeOffice => format!(
            "Home office claims of {} are {:.1}% of turnover, above the {:.0}% threshold for {}.",
            pounds(input.home_office_amount),
            f.home_office_ratio,
            profile.home_office_threshold,
            profile.name
        ),
        RuleId::HighTravel => format!(
            "Travel and subsistence of {} is {:.1}% of turnover, above the {:.0}% threshold for {}.",
            pounds(input.travel_subsistence),
            f.travel_ratio,
            profile.travel_threshold,
            profile.name
        ),
        RuleId::LossDeclared => format!(
            "Turnover of {} less expenses of {} gives a result of {}, a loss for the year.",
            pounds(input.turnover),
            pounds(input.total_expenses),
            pounds(f.profit)
        ),
        RuleId::ConsecutiveLosses => {
            "A loss this year follows a loss declared for last year. Repeated losses \
             raise questions about whether the activity is run commercially."
                .to_string()
        }
        RuleId::DataInconsistency => format!(
            "A loss is ticked for this year, but the figures show a profit of {} ({:.1}% \
             of turnover). One of the two is likely wrong.",
            pounds(f.profit),
            f.profit_ratio
        ),
        RuleId::RoundedFigures => format!(
            "{} of the headline figures are exact multiples of £500, which suggests \
             estimates rather than recorded amounts.",
            f.rounded_figures
        ),
        RuleId::ForeignIncome => format!(
            "Foreign income of {} is declared.",
            pounds(input.foreign_income)
        ),
        RuleId::HighCapitalAllowances => format!(
            "Capital allowances of {} are {:.1}% of turnover, above 30%.",
            pounds(input.capital_allowances),
            f.capital_allowance_ratio
        ),
        RuleId::LossCarryForward => format!(
            "Losses of {} are carried forward from earlier years.",
            pounds(input.loss_carry_forward)
        ),
    }
}

/// What HMRC typically looks at for this pattern.
pub fn hmrc_context(rule: RuleId) -> &'static str {
    match rule {
        RuleId::LowProfitMargin | RuleId::BelowSectorMargin => {
            "HMRC compares declared margins with businesses of a similar type and size."
        }
        RuleId::HighExpenseRatio | RuleId::AboveSectorExpenseRatio => {
            "HMRC benchmarks total expenses against turnover for the sector."
        }
        RuleId::HighMotorCosts => {
            "HMRC checks that private use has been removed from vehicle costs."
        }
        RuleId::HighMileageClaim => {
            "HMRC expects mileage claims to be supported by a contemporaneous log."
        }
        RuleId::MileageMethodMotorCosts => {
            "HMRC does not allow running costs on top of simplified mileage for the same vehicle."
        }
        RuleId::HighHomeOffice => {
            "HMRC expects home office claims to follow flat rates or a reasonable apportionment."
        }
        RuleId::HighTravel => {
            "HMRC disallows ordinary commuting and private subsistence."
        }
        RuleId::LossDeclared => "HMRC reviews loss claims, particularly when set against other income.",
        RuleId::ConsecutiveLosses => {
            "HMRC may test whether a loss-making trade is carried on with a view to profit."
        }
        RuleId::DataInconsistency => {
            "HMRC systems cross-check declarations against the figures entered."
        }
        RuleId::RoundedFigures => {
            "HMRC treats many round numbers as a sign of estimated records."
        }
        RuleId::ForeignIncome => {
            "HMRC receives overseas account data under international exchange agreements."
        }
        RuleId::HighCapitalAllowances => {
            "HMRC checks that assets qualify and that private use has been excluded."
        }
        RuleId::LossCarryForward => {
            "HMRC verifies brought-forward losses against earlier returns."
        }
    }
}

/// Records worth keeping for this pattern.
pub fn documentation_tip(rule: RuleId) -> &'static str {
    match rule {
        RuleId::LowProfitMargin | RuleId::BelowSectorMargin => {
            "Keep invoices and bank statements that reconcile to declared turnover and costs."
        }
        RuleId::HighExpenseRatio | RuleId::AboveSectorExpenseRatio => {
            "Keep receipts for every expense and note the business purpose of large items."
        }
        RuleId::HighMotorCosts => {
            "Keep fuel and repair receipts and a record of business versus private miles."
        }
        RuleId::HighMileageClaim => {
            "Keep a mileage log with dates, destinations, purpose and miles for each journey."
        }
        RuleId::MileageMethodMotorCosts => {
            "Check which vehicle each cost relates to and remove running costs already covered by the mileage rate."
        }
        RuleId::HighHomeOffice => {
            "Keep household bills and the basis of apportionment (rooms, hours of use)."
        }
        RuleId::HighTravel => {
            "Keep tickets, hotel bills and a note of the business reason for each trip."
        }
        RuleId::LossDeclared => {
            "Keep a note explaining the loss, such as start-up costs or a lost contract."
        }
        RuleId::ConsecutiveLosses => {
            "Keep a business plan or forecast showing how the trade is expected to become profitable."
        }
        RuleId::DataInconsistency => {
            "Recheck the figures and the loss declaration before submitting."
        }
        RuleId::RoundedFigures => {
            "Replace estimates with totals taken from receipts or accounting records."
        }
        RuleId::ForeignIncome => {
            "Keep overseas statements and evidence of any foreign tax paid."
        }
        RuleId::HighCapitalAllowances => {
            "Keep purchase invoices and a list of assets with dates and business use."
        }
        RuleId::LossCarryForward => {
            "Keep the computations and returns that created the losses being carried forward."
        }
    }
}

/// Short description of a rule for checks that did not fire.
pub fn passed(rule: RuleId) -> &'static str {
    match rule {
        RuleId::LowProfitMargin => "Profit margin is not below 5% of turnover.",
        RuleId::BelowSectorMargin => "Profit margin is not below the industry range.",
        RuleId::HighExpenseRatio => "Expenses do not exceed 70% of turnover.",
        RuleId::AboveSectorExpenseRatio => "Expenses are within the industry range.",
        RuleId::HighMotorCosts => "Motor costs are within the industry threshold.",
        RuleId::HighMileageClaim => "Mileage value does not exceed 50% of turnover.",
        RuleId::MileageMethodMotorCosts => "Vehicle claim method is consistent with motor costs.",
        RuleId::HighHomeOffice => "Home office claims are within the industry threshold.",
        RuleId::HighTravel => "Travel and subsistence is within the industry threshold.",
        RuleId::LossDeclared => "The figures show a profit.",
        RuleId::ConsecutiveLosses => "No consecutive losses.",
        RuleId::DataInconsistency => "Loss declaration matches the figures.",
        RuleId::RoundedFigures => "Fewer than three headline figures are rounded.",
        RuleId::ForeignIncome => "No foreign income declared.",
        RuleId::HighCapitalAllowances => "Capital allowances do not exceed 30% of turnover.",
        RuleId::LossCarryForward => "No losses carried forward.",
    }
}

/// Build the indicator for a triggered rule.
pub fn indicator_for(rule: RuleId, facts: &Facts<'_>) -> Indicator {
    Indicator::triggered(
        rule,
        describe(rule, facts),
        hmrc_context(rule),
        documentation_tip(rule),
    )
}

/// Build the record for a rule that was checked and did not fire.
pub fn clear_indicator(rule: RuleId) -> Indicator {
    Indicator::clear(rule, passed(rule), hmrc_context(rule), documentation_tip(rule))
}

/// Note for a margin above 60%. Never scored.
pub fn high_margin_note(profit_ratio: f64) -> String {
    format!(
        "Profit margin of {:.1}% is high. This is not a risk indicator, but check that \
         all allowable expenses have been claimed.",
        profit_ratio
    )
}

/// Note when itemised categories explain little of total expenses. Never scored.
pub fn uncategorized_note(categorized: f64, total_expenses: f64, share: f64) -> String {
    format!(
        "Itemised categories account for {} of {} total expenses ({:.1}%). This is a \
         transparency observation and does not affect the score.",
        pounds(categorized),
        pounds(total_expenses),
        share
    )
}

/// Every rule of a rule set in order, triggered or not.
pub fn checklist(result: &AssessmentResult, rules: &[RuleId]) -> Vec<Indicator> {
    rules
        .iter()
        .map(|rule| {
            result
                .indicators
                .iter()
                .find(|i| i.id == *rule)
                .cloned()
                .unwrap_or_else(|| clear_indicator(*rule))
        })
        .collect()
}

/// Compact view of one indicator for previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub id: RuleId,
    pub name: String,
    pub points: u8,
    pub weight: String,
}

/// Summaries of the triggered indicators, in evaluation order.
pub fn indicator_summaries(result: &AssessmentResult) -> Vec<IndicatorSummary> {
    result
        .indicators
        .iter()
        .map(|i| IndicatorSummary {
            id: i.id,
            name: i.name.clone(),
            points: i.points,
            weight: i.weight.as_str().to_string(),
        })
        .collect()
}

/// Generate a one-line risk summary for a result.
pub fn summarize(result: &AssessmentResult) -> String {
    if result.indicators.is_empty() {
        return format!(
            "{} ({}/100): no risk indicators triggered.",
            result.band, result.score
        );
    }

    let labels: Vec<_> = result.indicators.iter().map(|i| i.name.as_str()).collect();
    format!("{} ({}/100): {}", result.band, result.score, labels.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use redflag_features::derive_figures;
    use redflag_model::{
        DerivedFigures, FinancialInput, PercentRange, RiskBand, RuleSet, SectorProfile,
    };

    fn profile() -> SectorProfile {
        SectorProfile {
            id: "test",
            name: "Test Trade",
            profit_margin: PercentRange::new(20.0, 50.0),
            expense_ratio: PercentRange::new(50.0, 80.0),
            motor_threshold: 10.0,
            travel_threshold: 10.0,
            home_office_threshold: 5.0,
        }
    }

    fn result_with(indicators: Vec<Indicator>, score: u8) -> AssessmentResult {
        AssessmentResult {
            rule_set: RuleSet::V2,
            profile_id: "test".to_string(),
            figures: DerivedFigures::default(),
            indicators,
            notes: vec![],
            score,
            raw_score: score as u32,
            band: RiskBand::from_score(score),
        }
    }

    #[test]
    fn test_pounds_grouping() {
        assert_eq!(pounds(0.0), "£0");
        assert_eq!(pounds(950.4), "£950");
        assert_eq!(pounds(1_350.0), "£1,350");
        assert_eq!(pounds(1_234_567.0), "£1,234,567");
        assert_eq!(pounds(-20_000.0), "-£20,000");
    }

    #[test]
    fn test_describe_interpolates_figures() {
        let input = FinancialInput {
            motor_costs: 8_000.0,
            ..FinancialInput::new(40_000.0, 20_000.0)
        };
        let figures = derive_figures(&input);
        let profile = profile();
        let facts = Facts::new(&input, &figures, &profile);

        let text = describe(RuleId::HighMotorCosts, &facts);
        assert!(text.contains("£8,000"));
        assert!(text.contains("20.0%"));
        assert!(text.contains("Test Trade"));
    }

    #[test]
    fn test_indicator_for_sets_points_and_context() {
        let input = FinancialInput::new(10_000.0, 12_000.0);
        let figures = derive_figures(&input);
        let profile = profile();
        let facts = Facts::new(&input, &figures, &profile);

        let indicator = indicator_for(RuleId::LossDeclared, &facts);
        assert!(indicator.triggered);
        assert_eq!(indicator.points, 12);
        assert!(indicator.explanation.contains("-£2,000"));
        assert_eq!(indicator.hmrc_context, hmrc_context(RuleId::LossDeclared));
    }

    #[test]
    fn test_checklist_merges_triggered_and_clear() {
        let input = FinancialInput::new(10_000.0, 12_000.0);
        let figures = derive_figures(&input);
        let profile = profile();
        let facts = Facts::new(&input, &figures, &profile);
        let result = result_with(vec![indicator_for(RuleId::LossDeclared, &facts)], 12);

        let list = checklist(&result, &[RuleId::HighTravel, RuleId::LossDeclared]);
        assert_eq!(list.len(), 2);
        assert!(!list[0].triggered);
        assert_eq!(list[0].explanation, passed(RuleId::HighTravel));
        assert!(list[1].triggered);
    }

    #[test]
    fn test_indicator_summaries() {
        let input = FinancialInput::new(10_000.0, 12_000.0);
        let figures = derive_figures(&input);
        let profile = profile();
        let facts = Facts::new(&input, &figures, &profile);
        let result = result_with(vec![indicator_for(RuleId::LossDeclared, &facts)], 12);

        let summaries = indicator_summaries(&result);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, RuleId::LossDeclared);
        assert_eq!(summaries[0].points, 12);
        assert_eq!(summaries[0].weight, "medium");
    }

    #[test]
    fn test_summarize() {
        assert_eq!(
            summarize(&result_with(vec![], 0)),
            "LOW (0/100): no risk indicators triggered."
        );

        let indicator = clear_indicator(RuleId::RoundedFigures);
        let summary = summarize(&result_with(vec![indicator], 30));
        assert_eq!(summary, "MODERATE (30/100): Rounded Figures");
    }
}
