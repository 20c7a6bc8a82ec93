use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HomeLoanError;
use crate::jurisdiction::acquisition_costs::{AcquisitionCostProfile, Jurisdiction};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::HomeLoanResult;

use super::annuity::{
    compute_financing_with_horizon, AmortizationTerm, FinancingInput, FinancingResult,
    DEFAULT_HORIZON_YEARS,
};

/// Terms beyond this are flagged; most banks cap annuity loans around 40 years.
const LONG_TERM_WARNING_YEARS: Decimal = dec!(40);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Financing scenario plus how to resolve the acquisition cost rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingPlanInput {
    #[serde(flatten)]
    pub financing: FinancingInput,
    /// Explicit total acquisition cost rate; wins over `jurisdiction`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_cost_rate: Option<Rate>,
    /// Preset to take the rate from when no explicit rate is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Jurisdiction>,
    /// Fully custom cost breakdown; used when neither of the above is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_costs: Option<AcquisitionCostProfile>,
    /// Year at which to report the remaining debt
    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
}

/// Where the acquisition cost rate came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AcquisitionCostSource {
    Override { rate: Rate },
    Profile(AcquisitionCostProfile),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingPlan {
    #[serde(flatten)]
    pub financing: FinancingResult,
    pub acquisition_cost_rate: Rate,
    pub acquisition_costs: AcquisitionCostSource,
    /// purchase_price + acquisition_cost
    pub total_cost: Money,
    /// net_equity / purchase_price
    pub equity_ratio: Rate,
    /// loan_amount / purchase_price
    pub loan_to_value: Rate,
    /// Principal paid back by the horizon year
    pub repaid_by_horizon: Money,
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON_YEARS
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve the acquisition cost rate, run the annuity calculation and derive
/// the ratios a purchase overview needs.
pub fn plan_financing(
    input: &FinancingPlanInput,
) -> HomeLoanResult<ComputationOutput<FinancingPlan>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let source = resolve_acquisition_costs(input)?;
    let acquisition_cost_rate = match &source {
        AcquisitionCostSource::Override { rate } => *rate,
        AcquisitionCostSource::Profile(profile) => profile.total_rate(),
    };
    debug!("acquisition cost rate {acquisition_cost_rate} from {source:?}");

    let financing =
        compute_financing_with_horizon(&input.financing, acquisition_cost_rate, input.horizon_years)?;

    let price = input.financing.purchase_price;
    let total_cost = price
        .checked_add(financing.acquisition_cost)
        .ok_or_else(|| HomeLoanError::InvalidInput {
            field: "purchase_price".into(),
            reason: "Purchase price plus acquisition costs exceeds the supported numeric range".into(),
        })?;
    let equity_ratio = financing.net_equity / price;
    let loan_to_value = financing.loan_amount / price;
    let repaid_by_horizon = financing.loan_amount - financing.remaining_debt_after_horizon;

    match financing.term {
        AmortizationTerm::NeverAmortizes => warnings.push(format!(
            "Repayment rate of {}% is too low: the loan is never paid off",
            input.financing.repayment_rate_percent
        )),
        AmortizationTerm::Years(years) if years > LONG_TERM_WARNING_YEARS => warnings.push(format!(
            "Estimated term of {} years exceeds {LONG_TERM_WARNING_YEARS} years",
            years.round_dp(1)
        )),
        AmortizationTerm::Years(_) => {}
    }
    if loan_to_value > Decimal::ONE {
        warnings.push(format!(
            "Loan-to-value of {}% exceeds 100%: acquisition costs are partly financed",
            (loan_to_value * dec!(100)).round_dp(1)
        ));
    }
    if !financing.loan_amount.is_zero() {
        warnings.push(
            "Interest rate is assumed fixed for the whole term; fixed-rate periods usually end after 10, 15 or 20 years"
                .into(),
        );
    }

    let result = FinancingPlan {
        financing,
        acquisition_cost_rate,
        acquisition_costs: source,
        total_cost,
        equity_ratio,
        loan_to_value,
        repaid_by_horizon,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-repayment annuity: first-period monthly split, closed-form term on monthly compounding, annual remaining balance",
        input,
        warnings,
        elapsed,
        result,
    ))
}

/// Explicit rate first, then the named preset, then a custom profile, then
/// the Bavaria default.
pub fn resolve_acquisition_costs(
    input: &FinancingPlanInput,
) -> HomeLoanResult<AcquisitionCostSource> {
    if let Some(rate) = input.acquisition_cost_rate {
        return Ok(AcquisitionCostSource::Override { rate });
    }
    let profile = match (&input.jurisdiction, &input.acquisition_costs) {
        (Some(jurisdiction), _) => jurisdiction.profile(),
        (None, Some(custom)) => custom.clone(),
        (None, None) => AcquisitionCostProfile::default(),
    };
    profile.validate()?;
    Ok(AcquisitionCostSource::Profile(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> FinancingPlanInput {
        FinancingPlanInput {
            financing: FinancingInput {
                purchase_price: dec!(800000),
                total_equity: dec!(300000),
                interest_rate_percent: dec!(3.8),
                repayment_rate_percent: dec!(2.0),
                maintenance_fee: dec!(500),
                private_reserve: dec!(150),
            },
            acquisition_cost_rate: None,
            jurisdiction: None,
            acquisition_costs: None,
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }

    #[test]
    fn test_defaults_to_bavaria() {
        let out = plan_financing(&sample_input()).unwrap();
        let plan = &out.result;
        assert_eq!(plan.acquisition_cost_rate, dec!(0.0857));
        assert_eq!(plan.financing.loan_amount, dec!(568560));
        assert_eq!(plan.total_cost, dec!(868560));
        // 231440 / 800000
        assert_eq!(plan.equity_ratio, dec!(0.2893));
        // 568560 / 800000
        assert_eq!(plan.loan_to_value, dec!(0.7107));
        assert_eq!(
            plan.repaid_by_horizon,
            plan.financing.loan_amount - plan.financing.remaining_debt_after_horizon
        );
    }

    #[test]
    fn test_override_wins_over_jurisdiction() {
        let mut input = sample_input();
        input.acquisition_cost_rate = Some(dec!(0.05));
        input.jurisdiction = Some(Jurisdiction::Berlin);
        let out = plan_financing(&input).unwrap();
        assert_eq!(out.result.acquisition_cost_rate, dec!(0.05));
        assert_eq!(out.result.financing.acquisition_cost, dec!(40000));
        assert_eq!(
            out.result.acquisition_costs,
            AcquisitionCostSource::Override { rate: dec!(0.05) }
        );
    }

    #[test]
    fn test_jurisdiction_preset() {
        let mut input = sample_input();
        input.jurisdiction = Some(Jurisdiction::Berlin);
        let out = plan_financing(&input).unwrap();
        assert_eq!(out.result.acquisition_cost_rate, dec!(0.1107));
    }

    #[test]
    fn test_invalid_custom_profile_rejected() {
        let mut input = sample_input();
        input.acquisition_costs = Some(AcquisitionCostProfile {
            jurisdiction: "Nowhere".into(),
            land_transfer_tax: dec!(1.2),
            notary_and_registry: dec!(0.015),
            broker_commission: dec!(0.0),
        });
        assert!(matches!(
            plan_financing(&input),
            Err(HomeLoanError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_never_amortizes_warning() {
        let mut input = sample_input();
        input.financing.repayment_rate_percent = Decimal::ZERO;
        let out = plan_financing(&input).unwrap();
        assert!(out.result.financing.term.is_never());
        assert!(out.warnings.iter().any(|w| w.contains("never paid off")));
    }

    #[test]
    fn test_fixed_rate_note_always_present_for_loans() {
        let out = plan_financing(&sample_input()).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("assumed fixed")));
        assert!(!out.warnings.iter().any(|w| w.contains("Loan-to-value")));
    }

    #[test]
    fn test_insufficient_equity_propagates() {
        let mut input = sample_input();
        input.financing.total_equity = dec!(10000);
        assert!(matches!(
            plan_financing(&input),
            Err(HomeLoanError::InsufficientEquity { .. })
        ));
    }

    #[test]
    fn test_total_cost_beyond_range_is_an_error() {
        let mut input = sample_input();
        input.financing.purchase_price = Decimal::MAX;
        input.financing.total_equity = Decimal::MAX * dec!(0.0857);
        input.acquisition_cost_rate = Some(dec!(0.0857));
        input.horizon_years = 0;
        match plan_financing(&input) {
            Err(HomeLoanError::InvalidInput { field, .. }) => assert_eq!(field, "purchase_price"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialises_flat_json_with_defaults() {
        let json = serde_json::json!({
            "purchase_price": "800000",
            "total_equity": "300000",
            "interest_rate_percent": "3.8",
            "repayment_rate_percent": "2.0",
            "maintenance_fee": "500",
            "private_reserve": "150",
            "jurisdiction": "hamburg"
        });
        let input: FinancingPlanInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.horizon_years, DEFAULT_HORIZON_YEARS);
        assert_eq!(input.jurisdiction, Some(Jurisdiction::Hamburg));
        assert!(input.acquisition_cost_rate.is_none());
    }
}
