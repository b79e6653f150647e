//! Derived figures for risk scoring.
//!
//! Provides pure functions over a `FinancialInput`:
//! - Ratios against turnover (guarded for zero turnover)
//! - Mileage value at the statutory rate
//! - Loss and consistency flags
//! - The rounded-figures count

use redflag_model::{DerivedFigures, FinancialInput, SectorProfile};

/// Statutory mileage rate, pence per mile.
pub const MILEAGE_RATE_PENCE: f64 = 45.0;

/// Figures that are a multiple of this are treated as rounded.
pub const ROUNDING_UNIT: f64 = 500.0;

/// Everything a rule may look at during one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Facts<'a> {
    pub input: &'a FinancialInput,
    pub figures: &'a DerivedFigures,
    pub profile: &'a SectorProfile,
}

impl<'a> Facts<'a> {
    pub fn new(
        input: &'a FinancialInput,
        figures: &'a DerivedFigures,
        profile: &'a SectorProfile,
    ) -> Self {
        Self {
            input,
            figures,
            profile,
        }
    }
}

/// `amount` as a percentage of `turnover`, or 0 when turnover is not positive.
pub fn ratio(amount: f64, turnover: f64) -> f64 {
    if turnover > 0.0 {
        amount / turnover * 100.0
    } else {
        0.0
    }
}

/// `amount` is more than `percent`% of `base`.
///
/// Compared by cross-multiplying, so a figure exactly on the threshold
/// never lands above it through division error. False when `base` is not
/// positive.
pub fn exceeds_share(amount: f64, base: f64, percent: f64) -> bool {
    base > 0.0 && amount * 100.0 > percent * base
}

/// `amount` is less than `percent`% of `base`. False when `base` is not positive.
pub fn below_share(amount: f64, base: f64, percent: f64) -> bool {
    base > 0.0 && amount * 100.0 < percent * base
}

/// Value in pounds of the claimed miles at `MILEAGE_RATE_PENCE`.
pub fn mileage_value(miles: f64) -> f64 {
    miles * MILEAGE_RATE_PENCE / 100.0
}

/// Positive and an exact multiple of `ROUNDING_UNIT`.
///
/// Multiples of 1000 are multiples of 500, so each value counts at most once.
pub fn is_rounded(value: f64) -> bool {
    value > 0.0 && value % ROUNDING_UNIT == 0.0
}

/// Count the rounded headline figures.
pub fn rounded_count(input: &FinancialInput) -> u8 {
    let values = [
        input.turnover,
        input.total_expenses,
        input.motor_costs,
        input.home_office_amount,
        input.travel_subsistence,
        input.marketing,
    ];
    values.iter().filter(|v| is_rounded(**v)).count() as u8
}

/// Sum of the expense categories the form asks about individually.
pub fn categorized_expenses(input: &FinancialInput) -> f64 {
    input.motor_costs
        + input.home_office_amount
        + input.travel_subsistence
        + input.phone_internet
        + input.marketing
}

/// Compute every derived figure for a submission.
pub fn derive_figures(input: &FinancialInput) -> DerivedFigures {
    let turnover = input.turnover;
    let profit = turnover - input.total_expenses;
    let mileage_value = mileage_value(input.mileage_claimed);
    let calculated_loss = profit <= 0.0;

    DerivedFigures {
        profit,
        profit_ratio: ratio(profit, turnover),
        expense_ratio: ratio(input.total_expenses, turnover),
        motor_ratio: ratio(input.motor_costs, turnover),
        home_office_ratio: ratio(input.home_office_amount, turnover),
        travel_ratio: ratio(input.travel_subsistence, turnover),
        mileage_value,
        mileage_value_ratio: ratio(mileage_value, turnover),
        capital_allowance_ratio: ratio(input.capital_allowances, turnover),
        categorized_expenses: categorized_expenses(input),
        rounded_figures: rounded_count(input),
        calculated_loss,
        has_data_inconsistency: input.loss_this_year && !calculated_loss,
    }
}
