use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HomeLoanError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::HomeLoanResult;

use super::annuity::remaining_debt_after_years;

/// Longest schedule produced in one call.
const MAX_SCHEDULE_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingDebtInput {
    pub loan_amount: Money,
    /// Nominal interest rate p.a. in percent
    pub interest_rate_percent: Percent,
    /// Initial repayment rate p.a. in percent
    pub repayment_rate_percent: Percent,
    /// Last year of the schedule (inclusive)
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingDebtRow {
    pub year: u32,
    pub remaining_debt: Money,
    /// loan_amount - remaining_debt
    pub repaid_to_date: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemainingDebtSchedule {
    pub loan_amount: Money,
    /// Balance at the final year of the schedule
    pub remaining_debt: Money,
    /// First year in which the balance reaches zero, if within the schedule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_off_in_year: Option<u32>,
    pub rows: Vec<RemainingDebtRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Year-by-year remaining balance from year 0 (the principal) through
/// `input.years`, using the annual closed-form balance for every row.
pub fn remaining_debt_schedule(
    input: &RemainingDebtInput,
) -> HomeLoanResult<ComputationOutput<RemainingDebtSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.years > MAX_SCHEDULE_YEARS {
        return Err(HomeLoanError::InvalidInput {
            field: "years".into(),
            reason: format!("Schedule is limited to {MAX_SCHEDULE_YEARS} years"),
        });
    }

    let mut rows = Vec::with_capacity(input.years as usize + 1);
    let mut paid_off_in_year = None;
    for year in 0..=input.years {
        let remaining_debt = remaining_debt_after_years(
            input.loan_amount,
            input.interest_rate_percent,
            input.repayment_rate_percent,
            year,
        )?;
        if paid_off_in_year.is_none() && remaining_debt.is_zero() && !input.loan_amount.is_zero() {
            paid_off_in_year = Some(year);
        }
        rows.push(RemainingDebtRow {
            year,
            remaining_debt,
            repaid_to_date: input.loan_amount - remaining_debt,
        });
    }

    if input.repayment_rate_percent.is_zero() && !input.loan_amount.is_zero() {
        warnings.push("Repayment rate is zero: the balance never decreases".into());
    }

    let remaining_debt = rows
        .last()
        .map(|r| r.remaining_debt)
        .unwrap_or(input.loan_amount);

    let result = RemainingDebtSchedule {
        loan_amount: input.loan_amount,
        remaining_debt,
        paid_off_in_year,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annual annuity balance: K*q^n - R*(q^n - 1)/(q - 1), floored at zero",
        input,
        warnings,
        elapsed,
        result,
    ))
}
