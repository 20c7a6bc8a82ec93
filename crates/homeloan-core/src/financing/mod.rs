pub mod annuity;
pub mod plan;
pub mod schedule;

pub use annuity::{
    compute_financing, compute_financing_with_horizon, remaining_debt_after_years,
    AmortizationTerm, FinancingInput, FinancingResult, DEFAULT_HORIZON_YEARS,
};
