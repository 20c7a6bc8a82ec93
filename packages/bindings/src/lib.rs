use napi::Result as NapiResult;
use napi_derive::napi;

use homeloan_core::financing::annuity;
use homeloan_core::financing::plan::{self, FinancingPlanInput};
use homeloan_core::financing::schedule::{self, RemainingDebtInput};
use homeloan_core::jurisdiction::acquisition_costs;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Financing
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_financing(input_json: String) -> NapiResult<String> {
    let input: FinancingPlanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = plan::plan_financing(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Remaining balance as a decimal string.
#[napi]
pub fn remaining_debt_after_years(input_json: String) -> NapiResult<String> {
    let input: RemainingDebtInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let remaining = annuity::remaining_debt_after_years(
        input.loan_amount,
        input.interest_rate_percent,
        input.repayment_rate_percent,
        input.years,
    )
    .map_err(to_napi_error)?;
    Ok(remaining.to_string())
}

#[napi]
pub fn remaining_debt_schedule(input_json: String) -> NapiResult<String> {
    let input: RemainingDebtInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::remaining_debt_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Jurisdictions
// ---------------------------------------------------------------------------

#[napi]
pub fn acquisition_cost_profiles() -> NapiResult<String> {
    serde_json::to_string(&acquisition_costs::list_profiles()).map_err(to_napi_error)
}
