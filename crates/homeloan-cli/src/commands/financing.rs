use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use homeloan_core::financing::annuity::{self, FinancingInput, DEFAULT_HORIZON_YEARS};
use homeloan_core::financing::plan::{self, FinancingPlanInput};
use homeloan_core::financing::schedule::{self, RemainingDebtInput};
use homeloan_core::jurisdiction::acquisition_costs::Jurisdiction;
use homeloan_core::with_metadata;

use crate::input;

/// Arguments for a full financing calculation
#[derive(Args)]
pub struct FinancingArgs {
    /// Property purchase price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Total equity available, before acquisition costs
    #[arg(long, alias = "total-equity")]
    pub equity: Option<Decimal>,

    /// Nominal interest rate in percent (e.g. 3.8 for 3.8%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Initial repayment rate in percent (e.g. 2.0 for 2%)
    #[arg(long)]
    pub repayment_rate: Option<Decimal>,

    /// Monthly maintenance fee (Hausgeld)
    #[arg(long, default_value = "0")]
    pub maintenance_fee: Decimal,

    /// Monthly private reserve
    #[arg(long, default_value = "0")]
    pub private_reserve: Decimal,

    /// Total acquisition cost rate as a decimal (e.g. 0.0857); overrides --jurisdiction
    #[arg(long)]
    pub acquisition_cost_rate: Option<Decimal>,

    /// Acquisition cost preset (bavaria, baden-wuerttemberg, berlin, hamburg, nrw)
    #[arg(long)]
    pub jurisdiction: Option<Jurisdiction>,

    /// Year at which to report the remaining debt
    #[arg(long)]
    pub horizon_years: Option<u32>,

    /// Path to a JSON or YAML scenario file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the remaining debt after a number of years
#[derive(Args)]
pub struct RemainingDebtArgs {
    /// Loan principal
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Nominal interest rate in percent
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Initial repayment rate in percent
    #[arg(long)]
    pub repayment_rate: Option<Decimal>,

    /// Number of years elapsed
    #[arg(long, default_value_t = DEFAULT_HORIZON_YEARS)]
    pub years: u32,

    /// Emit the balance for every year up to --years
    #[arg(long)]
    pub schedule: bool,

    /// Path to a JSON or YAML file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_financing(args: FinancingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut plan_input: FinancingPlanInput = if let Some(ref path) = args.input {
        input::file::read_scenario(path)?
    } else if args.purchase_price.is_some() {
        plan_input_from_flags(&args)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--purchase-price (with the other loan flags), --input <file> or stdin required".into());
    };

    if let Some(rate) = args.acquisition_cost_rate {
        plan_input.acquisition_cost_rate = Some(rate);
    }
    if let Some(jurisdiction) = args.jurisdiction {
        plan_input.jurisdiction = Some(jurisdiction);
    }
    if let Some(years) = args.horizon_years {
        plan_input.horizon_years = years;
    }

    log::info!(
        "financing {} at {}% interest, {}% repayment",
        plan_input.financing.purchase_price,
        plan_input.financing.interest_rate_percent,
        plan_input.financing.repayment_rate_percent
    );
    let result = plan::plan_financing(&plan_input)?;
    Ok(serde_json::to_value(result)?)
}

fn plan_input_from_flags(
    args: &FinancingArgs,
) -> Result<FinancingPlanInput, Box<dyn std::error::Error>> {
    Ok(FinancingPlanInput {
        financing: FinancingInput {
            purchase_price: args
                .purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?,
            total_equity: args
                .equity
                .ok_or("--equity is required (or provide --input)")?,
            interest_rate_percent: args
                .interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            repayment_rate_percent: args
                .repayment_rate
                .ok_or("--repayment-rate is required (or provide --input)")?,
            maintenance_fee: args.maintenance_fee,
            private_reserve: args.private_reserve,
        },
        acquisition_cost_rate: None,
        jurisdiction: None,
        acquisition_costs: None,
        horizon_years: DEFAULT_HORIZON_YEARS,
    })
}

pub fn run_remaining_debt(args: RemainingDebtArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let debt_input: RemainingDebtInput = if let Some(ref path) = args.input {
        input::file::read_scenario(path)?
    } else if args.loan_amount.is_some() {
        RemainingDebtInput {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            interest_rate_percent: args
                .interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            repayment_rate_percent: args
                .repayment_rate
                .ok_or("--repayment-rate is required (or provide --input)")?,
            years: args.years,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--loan-amount (with rates), --input <file> or stdin required".into());
    };

    if args.schedule {
        let result = schedule::remaining_debt_schedule(&debt_input)?;
        return Ok(serde_json::to_value(result)?);
    }

    let start = Instant::now();
    let remaining_debt = annuity::remaining_debt_after_years(
        debt_input.loan_amount,
        debt_input.interest_rate_percent,
        debt_input.repayment_rate_percent,
        debt_input.years,
    )?;
    let result = serde_json::json!({
        "loan_amount": debt_input.loan_amount,
        "years": debt_input.years,
        "remaining_debt": remaining_debt,
        "repaid_to_date": debt_input.loan_amount - remaining_debt,
    });
    let output = with_metadata(
        "Annual annuity balance: K*q^n - R*(q^n - 1)/(q - 1), floored at zero",
        &debt_input,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
