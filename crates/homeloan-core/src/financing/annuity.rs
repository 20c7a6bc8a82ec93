//! Fixed-repayment annuity loan: the German "Annuitätendarlehen" as banks
//! quote it, with an initial interest rate and an initial repayment rate
//! ("anfängliche Tilgung") both stated in percent of the original principal.
//!
//! The monthly split uses first-period flat rates on the original principal.
//! The term uses the closed-form amortization length on monthly compounding,
//! while the remaining balance compounds annually at the nominal rate. The
//! two figures are therefore not mutually consistent; callers comparing them
//! should expect a gap of a few percent.

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::HomeLoanError;
use crate::time_value::{
    annuity_accumulation_factor, decimal_ln, decimal_powi, percent_to_rate, MONTHS_PER_YEAR,
};
use crate::types::{Money, Percent, Rate, Years};
use crate::HomeLoanResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Horizon for the remaining-debt figure when none is given; matches the
/// usual 10-year fixed-interest period.
pub const DEFAULT_HORIZON_YEARS: u32 = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Purchase and loan parameters for a single financing scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingInput {
    /// Property purchase price
    pub purchase_price: Money,
    /// Total equity available, before acquisition costs
    pub total_equity: Money,
    /// Nominal interest rate p.a. in percent (3.8 = 3.8%)
    pub interest_rate_percent: Percent,
    /// Initial repayment rate p.a. in percent (2.0 = 2%)
    pub repayment_rate_percent: Percent,
    /// Monthly maintenance fee (Hausgeld)
    pub maintenance_fee: Money,
    /// Monthly private reserve for repairs
    pub private_reserve: Money,
}

/// How long the loan runs until the balance reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "years", rename_all = "snake_case")]
pub enum AmortizationTerm {
    /// Paid off after this many (fractional) years.
    Years(Years),
    /// The payment never exceeds the interest accrual.
    NeverAmortizes,
}

/// Derived figures for one financing scenario. All monthly amounts are
/// first-period values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingResult {
    /// purchase_price * acquisition_cost_rate
    pub acquisition_cost: Money,
    /// Equity left after paying the acquisition costs
    pub net_equity: Money,
    pub loan_amount: Money,
    pub monthly_interest: Money,
    pub monthly_repayment: Money,
    /// Interest plus repayment, paid to the bank each month
    pub monthly_bank_rate: Money,
    pub term: AmortizationTerm,
    /// Bank rate plus maintenance fee and private reserve
    pub total_monthly_cost: Money,
    pub horizon_years: u32,
    pub remaining_debt_after_horizon: Money,
}

impl AmortizationTerm {
    pub fn years(&self) -> Option<Years> {
        match self {
            AmortizationTerm::Years(y) => Some(*y),
            AmortizationTerm::NeverAmortizes => None,
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, AmortizationTerm::NeverAmortizes)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the financing figures with the remaining debt taken after
/// [`DEFAULT_HORIZON_YEARS`].
pub fn compute_financing(
    input: &FinancingInput,
    acquisition_cost_rate: Rate,
) -> HomeLoanResult<FinancingResult> {
    compute_financing_with_horizon(input, acquisition_cost_rate, DEFAULT_HORIZON_YEARS)
}

/// Compute the financing figures with the remaining debt taken after
/// `horizon_years`.
///
/// Fails with [`HomeLoanError::InsufficientEquity`] when the equity does not
/// cover the acquisition costs; no partial result is produced.
pub fn compute_financing_with_horizon(
    input: &FinancingInput,
    acquisition_cost_rate: Rate,
    horizon_years: u32,
) -> HomeLoanResult<FinancingResult> {
    validate_input(input, acquisition_cost_rate)?;

    let acquisition_cost = input.purchase_price * acquisition_cost_rate;
    let net_equity = input.total_equity - acquisition_cost;
    if net_equity < Decimal::ZERO {
        return Err(HomeLoanError::InsufficientEquity {
            acquisition_cost,
            shortfall: -net_equity,
        });
    }

    let loan_amount = input.purchase_price - net_equity;
    if loan_amount < Decimal::ZERO {
        return Err(HomeLoanError::InvalidInput {
            field: "total_equity".into(),
            reason: "Equity exceeds purchase price plus acquisition costs".into(),
        });
    }

    let interest_rate = percent_to_rate(input.interest_rate_percent);
    let repayment_rate = percent_to_rate(input.repayment_rate_percent);

    let monthly_interest = monthly_share(loan_amount, interest_rate, "interest_rate_percent")?;
    let monthly_repayment = monthly_share(loan_amount, repayment_rate, "repayment_rate_percent")?;
    let monthly_bank_rate = monthly_interest
        .checked_add(monthly_repayment)
        .ok_or_else(|| out_of_range("repayment_rate_percent"))?;

    let term = estimate_term(loan_amount, interest_rate, monthly_interest, monthly_bank_rate)?;
    if term.is_never() {
        warn!(
            "repayment rate {}% does not amortize a loan of {} at {}% interest",
            input.repayment_rate_percent, loan_amount, input.interest_rate_percent
        );
    }

    let remaining_debt_after_horizon = remaining_debt_after_years(
        loan_amount,
        input.interest_rate_percent,
        input.repayment_rate_percent,
        horizon_years,
    )?;

    let total_monthly_cost = monthly_bank_rate
        .checked_add(input.maintenance_fee)
        .ok_or_else(|| out_of_range("maintenance_fee"))?
        .checked_add(input.private_reserve)
        .ok_or_else(|| out_of_range("private_reserve"))?;

    debug!(
        "loan {loan_amount}: bank rate {monthly_bank_rate}/month, term {term:?}, \
         remaining after {horizon_years}y {remaining_debt_after_horizon}"
    );

    Ok(FinancingResult {
        acquisition_cost,
        net_equity,
        loan_amount,
        monthly_interest,
        monthly_repayment,
        monthly_bank_rate,
        term,
        total_monthly_cost,
        horizon_years,
        remaining_debt_after_horizon,
    })
}

/// Outstanding balance after `years` of annual annuity payments:
///
/// `K * q^n - R * (q^n - 1) / (q - 1)` with `q = 1 + i` and
/// `R = K * (i + t)`, floored at zero.
pub fn remaining_debt_after_years(
    loan_amount: Money,
    interest_rate_percent: Percent,
    repayment_rate_percent: Percent,
    years: u32,
) -> HomeLoanResult<Money> {
    for (field, value) in [
        ("loan_amount", loan_amount),
        ("interest_rate_percent", interest_rate_percent),
        ("repayment_rate_percent", repayment_rate_percent),
    ] {
        require_non_negative(field, value)?;
    }

    let interest_rate = percent_to_rate(interest_rate_percent);
    let annual_annuity = loan_amount
        .checked_mul(interest_rate + percent_to_rate(repayment_rate_percent))
        .ok_or_else(|| out_of_range("repayment_rate_percent"))?;
    let q = Decimal::ONE + interest_rate;

    let grown = loan_amount
        .checked_mul(decimal_powi(q, years)?)
        .ok_or_else(|| HomeLoanError::InvalidInput {
            field: "years".into(),
            reason: format!("loan balance after {years} years exceeds the supported range"),
        })?;
    let paid = annual_annuity
        .checked_mul(annuity_accumulation_factor(q, years)?)
        .ok_or_else(|| HomeLoanError::InvalidInput {
            field: "years".into(),
            reason: format!("payments over {years} years exceed the supported range"),
        })?;
    Ok((grown - paid).max(Decimal::ZERO))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// n = -ln(1 - i*K/R) / ln(1 + i) months, with i the monthly rate.
/// i*K is the first month's interest.
fn estimate_term(
    loan_amount: Money,
    interest_rate: Rate,
    monthly_interest: Money,
    monthly_bank_rate: Money,
) -> HomeLoanResult<AmortizationTerm> {
    if loan_amount.is_zero() {
        return Ok(AmortizationTerm::Years(Decimal::ZERO));
    }
    if monthly_bank_rate <= Decimal::ZERO {
        return Ok(AmortizationTerm::NeverAmortizes);
    }

    // ln(1 + i) is zero when i vanishes below the Decimal precision
    let growth = decimal_ln(Decimal::ONE + interest_rate / MONTHS_PER_YEAR)?;
    if growth.is_zero() {
        // Interest-free: straight-line repayment
        let months = loan_amount
            .checked_div(monthly_bank_rate)
            .ok_or_else(|| out_of_range("repayment_rate_percent"))?;
        return Ok(AmortizationTerm::Years(months / MONTHS_PER_YEAR));
    }

    let log_arg = Decimal::ONE - monthly_interest / monthly_bank_rate;
    if log_arg <= Decimal::ZERO {
        return Ok(AmortizationTerm::NeverAmortizes);
    }

    let months = (-decimal_ln(log_arg)?)
        .checked_div(growth)
        .ok_or_else(|| out_of_range("repayment_rate_percent"))?;
    Ok(AmortizationTerm::Years(months / MONTHS_PER_YEAR))
}

/// loan * annual rate / 12
fn monthly_share(loan_amount: Money, annual_rate: Rate, field: &str) -> HomeLoanResult<Money> {
    loan_amount
        .checked_mul(annual_rate)
        .map(|annual| annual / MONTHS_PER_YEAR)
        .ok_or_else(|| out_of_range(field))
}

fn out_of_range(field: &str) -> HomeLoanError {
    HomeLoanError::InvalidInput {
        field: field.into(),
        reason: "Result exceeds the supported numeric range".into(),
    }
}

fn require_non_negative(field: &str, value: Decimal) -> HomeLoanResult<()> {
    if value < Decimal::ZERO {
        return Err(HomeLoanError::InvalidInput {
            field: field.into(),
            reason: "Must be non-negative".into(),
        });
    }
    Ok(())
}

fn validate_input(input: &FinancingInput, acquisition_cost_rate: Rate) -> HomeLoanResult<()> {
    if input.purchase_price <= Decimal::ZERO {
        return Err(HomeLoanError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }

    require_non_negative("total_equity", input.total_equity)?;
    require_non_negative("interest_rate_percent", input.interest_rate_percent)?;
    require_non_negative("repayment_rate_percent", input.repayment_rate_percent)?;
    require_non_negative("maintenance_fee", input.maintenance_fee)?;
    require_non_negative("private_reserve", input.private_reserve)?;

    if input.interest_rate_percent >= dec!(100) {
        return Err(HomeLoanError::InvalidInput {
            field: "interest_rate_percent".into(),
            reason: "Interest rate must be below 100%".into(),
        });
    }

    if acquisition_cost_rate < Decimal::ZERO || acquisition_cost_rate >= Decimal::ONE {
        return Err(HomeLoanError::InvalidInput {
            field: "acquisition_cost_rate".into(),
            reason: "Acquisition cost rate must be between 0 and 1 (exclusive upper)".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Munich flat: 800k price, 300k equity, 3.8% interest, 2% repayment
    fn sample_input() -> FinancingInput {
        FinancingInput {
            purchase_price: dec!(800000),
            total_equity: dec!(300000),
            interest_rate_percent: dec!(3.8),
            repayment_rate_percent: dec!(2.0),
            maintenance_fee: dec!(500),
            private_reserve: dec!(150),
        }
    }

    const BAVARIA: Rate = dec!(0.0857);

    #[test]
    fn test_reference_scenario() {
        let result = compute_financing(&sample_input(), BAVARIA).unwrap();

        // 800000 * 8.57% = 68560; 300000 - 68560 = 231440
        assert_eq!(result.acquisition_cost, dec!(68560));
        assert_eq!(result.net_equity, dec!(231440));
        assert_eq!(result.loan_amount, dec!(568560));

        // 568560 * 3.8% / 12 = 1800.44; * 2% / 12 = 947.60
        assert_eq!(result.monthly_interest, dec!(1800.44));
        assert_eq!(result.monthly_repayment, dec!(947.6));
        assert_eq!(result.monthly_bank_rate, dec!(2748.04));
        assert_eq!(result.total_monthly_cost, dec!(3398.04));
        assert_eq!(result.horizon_years, DEFAULT_HORIZON_YEARS);
    }

    #[test]
    fn test_reference_term() {
        let result = compute_financing(&sample_input(), BAVARIA).unwrap();
        // -ln(2/5.8) / ln(1 + 0.038/12) = 336.757 months = 28.063 years
        let years = result.term.years().unwrap();
        assert!((years - dec!(28.063)).abs() < dec!(0.001), "term was {years}");
    }

    #[test]
    fn test_reference_remaining_debt_after_ten_years() {
        let result = compute_financing(&sample_input(), BAVARIA).unwrap();
        let remaining = result.remaining_debt_after_horizon;
        assert!(remaining > Decimal::ZERO);
        assert!(remaining < result.loan_amount);
        assert!((remaining - dec!(433295.65)).abs() < dec!(0.01), "remaining was {remaining}");
    }

    #[test]
    fn test_interest_plus_repayment_equals_bank_rate() {
        let mut input = sample_input();
        input.interest_rate_percent = dec!(4.17);
        input.repayment_rate_percent = dec!(2.33);
        let r = compute_financing(&input, BAVARIA).unwrap();
        assert!((r.monthly_interest + r.monthly_repayment - r.monthly_bank_rate).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_insufficient_equity() {
        let mut input = sample_input();
        input.total_equity = dec!(50000);
        match compute_financing(&input, BAVARIA) {
            Err(HomeLoanError::InsufficientEquity {
                acquisition_cost,
                shortfall,
            }) => {
                assert_eq!(acquisition_cost, dec!(68560));
                assert_eq!(shortfall, dec!(18560));
            }
            other => panic!("expected InsufficientEquity, got {other:?}"),
        }
    }

    #[test]
    fn test_equity_exactly_covers_costs() {
        let mut input = sample_input();
        input.total_equity = dec!(68560);
        let result = compute_financing(&input, BAVARIA).unwrap();
        assert_eq!(result.net_equity, Decimal::ZERO);
        assert_eq!(result.loan_amount, input.purchase_price);
    }

    #[test]
    fn test_zero_repayment_never_amortizes() {
        let mut input = sample_input();
        input.repayment_rate_percent = Decimal::ZERO;
        let result = compute_financing(&input, BAVARIA).unwrap();
        assert_eq!(result.term, AmortizationTerm::NeverAmortizes);
        assert_eq!(result.monthly_bank_rate, result.monthly_interest);
    }

    #[test]
    fn test_zero_interest_and_repayment_never_amortizes() {
        let mut input = sample_input();
        input.interest_rate_percent = Decimal::ZERO;
        input.repayment_rate_percent = Decimal::ZERO;
        let result = compute_financing(&input, BAVARIA).unwrap();
        assert!(result.term.is_never());
    }

    #[test]
    fn test_interest_free_loan_is_straight_line() {
        let mut input = sample_input();
        input.interest_rate_percent = Decimal::ZERO;
        input.repayment_rate_percent = dec!(4);
        let result = compute_financing(&input, BAVARIA).unwrap();
        assert_eq!(result.term, AmortizationTerm::Years(dec!(25)));
    }

    #[test]
    fn test_fully_equity_financed() {
        let mut input = sample_input();
        input.total_equity = dec!(868560);
        let result = compute_financing(&input, BAVARIA).unwrap();
        assert_eq!(result.loan_amount, Decimal::ZERO);
        assert_eq!(result.monthly_interest, Decimal::ZERO);
        assert_eq!(result.monthly_repayment, Decimal::ZERO);
        assert_eq!(result.monthly_bank_rate, Decimal::ZERO);
        assert_eq!(result.term, AmortizationTerm::Years(Decimal::ZERO));
        assert_eq!(result.remaining_debt_after_horizon, Decimal::ZERO);
        assert_eq!(result.total_monthly_cost, dec!(650));
    }

    #[test]
    fn test_surplus_equity_rejected() {
        let mut input = sample_input();
        input.total_equity = dec!(900000);
        assert!(matches!(
            compute_financing(&input, BAVARIA),
            Err(HomeLoanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut input = sample_input();
        input.purchase_price = Decimal::ZERO;
        assert!(compute_financing(&input, BAVARIA).is_err());

        let mut input = sample_input();
        input.interest_rate_percent = dec!(-1);
        assert!(compute_financing(&input, BAVARIA).is_err());

        let mut input = sample_input();
        input.maintenance_fee = dec!(-0.01);
        assert!(compute_financing(&input, BAVARIA).is_err());

        assert!(compute_financing(&sample_input(), Decimal::ONE).is_err());
        assert!(compute_financing(&sample_input(), dec!(-0.01)).is_err());
    }

    #[test]
    fn test_custom_horizon() {
        let r = compute_financing_with_horizon(&sample_input(), BAVARIA, 20).unwrap();
        assert_eq!(r.horizon_years, 20);
        let expected =
            remaining_debt_after_years(r.loan_amount, dec!(3.8), dec!(2.0), 20).unwrap();
        assert_eq!(r.remaining_debt_after_horizon, expected);
    }

    #[test]
    fn test_remaining_debt_year_zero_is_principal() {
        let remaining = remaining_debt_after_years(dec!(100000), dec!(3), dec!(2), 0).unwrap();
        assert_eq!(remaining, dec!(100000));
    }

    #[test]
    fn test_remaining_debt_after_one_year() {
        // 100000 * 1.03 - 5000 = 98000
        let remaining = remaining_debt_after_years(dec!(100000), dec!(3), dec!(2), 1).unwrap();
        assert_eq!(remaining, dec!(98000));
    }

    #[test]
    fn test_remaining_debt_floored_at_zero() {
        let remaining = remaining_debt_after_years(dec!(568560), dec!(3.8), dec!(2.0), 40).unwrap();
        assert_eq!(remaining, Decimal::ZERO);
    }

    #[test]
    fn test_remaining_debt_zero_interest() {
        // 10% repayment per year, no interest: 100000 - 4 * 10000
        let remaining = remaining_debt_after_years(dec!(100000), dec!(0), dec!(10), 4).unwrap();
        assert_eq!(remaining, dec!(60000));
    }

    #[test]
    fn test_remaining_debt_without_repayment_stays_flat() {
        let remaining = remaining_debt_after_years(dec!(100000), dec!(5), dec!(0), 15).unwrap();
        assert!((remaining - dec!(100000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_remaining_debt_rejects_negative() {
        assert!(remaining_debt_after_years(dec!(-1), dec!(3), dec!(2), 5).is_err());
        assert!(remaining_debt_after_years(dec!(1000), dec!(3), dec!(-2), 5).is_err());
    }

    fn invalid_field(result: HomeLoanResult<impl std::fmt::Debug>) -> String {
        match result {
            Err(HomeLoanError::InvalidInput { field, .. }) => field,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_huge_repayment_rate_is_an_error() {
        let mut input = sample_input();
        input.repayment_rate_percent = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        assert_eq!(
            invalid_field(compute_financing(&input, BAVARIA)),
            "repayment_rate_percent"
        );

        let huge = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        assert_eq!(
            invalid_field(remaining_debt_after_years(dec!(568560), dec!(3.8), huge, 1)),
            "repayment_rate_percent"
        );
    }

    #[test]
    fn test_huge_monthly_extras_are_an_error() {
        let mut input = sample_input();
        input.maintenance_fee = Decimal::MAX;
        assert_eq!(invalid_field(compute_financing(&input, BAVARIA)), "maintenance_fee");

        let mut input = sample_input();
        input.private_reserve = Decimal::MAX;
        assert_eq!(invalid_field(compute_financing(&input, BAVARIA)), "private_reserve");
    }

    #[test]
    fn test_longest_horizon_is_computed_or_rejected() {
        // Interest-free and interest-less balances stay representable
        let flat = remaining_debt_after_years(dec!(100000), dec!(0), dec!(0), u32::MAX).unwrap();
        assert_eq!(flat, dec!(100000));
        assert!(remaining_debt_after_years(dec!(100000), dec!(0.0000001), dec!(0), u32::MAX).is_ok());

        // At a real interest rate the balance leaves the range
        assert_eq!(
            invalid_field(compute_financing_with_horizon(&sample_input(), BAVARIA, u32::MAX)),
            "years"
        );
    }

    #[test]
    fn test_term_serialises_as_tagged_enum() {
        let never = serde_json::to_value(AmortizationTerm::NeverAmortizes).unwrap();
        assert_eq!(never, serde_json::json!({ "kind": "never_amortizes" }));
        let years = serde_json::to_value(AmortizationTerm::Years(dec!(25))).unwrap();
        assert_eq!(years["kind"], "years");
    }
}
