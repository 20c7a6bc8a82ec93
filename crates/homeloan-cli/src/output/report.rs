use colored::Colorize;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use super::locale::{Labels, Locale};
use super::table;

const RULE: &str = "----------------------------------------";
const DOUBLE_RULE: &str = "========================================";
/// Fits "Remaining debt after 100 years:" so the value column stays aligned.
const LABEL_WIDTH: usize = 32;

/// Render a labelled console report. Financing plans and remaining-debt
/// schedules get a dedicated layout; anything else falls back to a table.
pub fn print_report(value: &Value, locale: Locale) {
    let labels = locale.labels();
    let result = value.get("result").unwrap_or(value);
    let assumptions = value.get("assumptions").unwrap_or(&Value::Null);

    let lines = if result.get("monthly_bank_rate").is_some() {
        financing_report(result, assumptions, labels)
    } else if result.get("rows").is_some() {
        schedule_report(result, labels)
    } else {
        table::print_table(value);
        return;
    };

    for line in lines {
        println!("{line}");
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}:", labels.warnings.bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
}

fn financing_report(result: &Value, assumptions: &Value, labels: &Labels) -> Vec<String> {
    let money = |v: &Value, key: &str| labels.euro(decimal_field(v, key).unwrap_or_default());
    let horizon = result
        .get("horizon_years")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    let repayment = decimal_field(assumptions, "repayment_rate_percent").unwrap_or_default();

    let mut lines = vec![
        format!(
            "{}",
            format!(
                "--- {} ({} {}%) ---",
                labels.scenario,
                labels.fixed_repayment,
                labels.number(repayment, 1)
            )
            .bold()
        ),
        row(labels.purchase_price, &money(assumptions, "purchase_price")),
        row(labels.acquisition_costs, &format!("+ {}", money(result, "acquisition_cost"))),
        row(labels.total_cost, &money(result, "total_cost")),
        row(labels.equity, &format!("- {}", money(assumptions, "total_equity"))),
        row(labels.loan_amount, &money(result, "loan_amount")),
        RULE.to_string(),
        row(
            labels.monthly_interest,
            &format!("{} {}", money(result, "monthly_interest"), labels.per_month),
        ),
        row(
            labels.monthly_repayment,
            &format!("{} {}", money(result, "monthly_repayment"), labels.per_month),
        ),
        row(
            labels.bank_rate,
            &format!("{} {}", money(result, "monthly_bank_rate"), labels.per_month),
        ),
        row(labels.maintenance_fee, &money(assumptions, "maintenance_fee")),
        row(labels.private_reserve, &money(assumptions, "private_reserve")),
        DOUBLE_RULE.to_string(),
        format!(
            "{}",
            row(labels.total_monthly_cost, &money(result, "total_monthly_cost")).bold()
        ),
        RULE.to_string(),
        row(labels.estimated_term, &term_text(result.get("term"), labels)),
        row(
            &format!("{} {} {}", labels.remaining_debt_after, horizon, labels.years_after),
            &money(result, "remaining_debt_after_horizon"),
        ),
        row(labels.repaid_by_then, &money(result, "repaid_by_horizon")),
    ];

    if let Some(ltv) = decimal_field(result, "loan_to_value") {
        lines.push(row(labels.loan_to_value, &labels.percent(ltv)));
    }
    lines
}

fn schedule_report(result: &Value, labels: &Labels) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:>6}  {:>18}  {:>18}",
            labels.year,
            labels.remaining_debt,
            labels.repaid_to_date
        ),
        RULE.to_string(),
    ];
    if let Some(Value::Array(rows)) = result.get("rows") {
        for r in rows {
            lines.push(format!(
                "{:>6}  {:>18}  {:>18}",
                r.get("year").and_then(Value::as_u64).unwrap_or_default(),
                labels.euro(decimal_field(r, "remaining_debt").unwrap_or_default()),
                labels.euro(decimal_field(r, "repaid_to_date").unwrap_or_default()),
            ));
        }
    }
    if let Some(year) = result.get("paid_off_in_year").and_then(Value::as_u64) {
        lines.push(RULE.to_string());
        lines.push(row(labels.paid_off_in_year, &year.to_string()));
    }
    lines
}

fn term_text(term: Option<&Value>, labels: &Labels) -> String {
    let Some(term) = term else {
        return String::new();
    };
    match term.get("kind").and_then(Value::as_str) {
        Some("years") => {
            let years = decimal_field(term, "years").unwrap_or_default();
            labels.duration(years)
        }
        _ => labels.never.to_string(),
    }
}

fn row(label: &str, value: &str) -> String {
    format!("{:<width$} {}", format!("{label}:"), value, width = LABEL_WIDTH)
}

/// Decimals serialise as strings; accept plain JSON numbers as well.
fn decimal_field(value: &Value, key: &str) -> Option<Decimal> {
    match value.get(key)? {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}
