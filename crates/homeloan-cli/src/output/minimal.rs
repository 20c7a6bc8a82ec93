use serde_json::Value;

use super::format_scalar;

/// Key answer per command, in order of priority.
const PRIORITY_KEYS: [&str; 4] = [
    "total_monthly_cost",
    "remaining_debt",
    "monthly_bank_rate",
    "loan_amount",
];

/// Print just the key answer value from the output.
///
/// Looks for the priority fields first, then falls back to the first
/// field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return format_scalar(val);
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result_obj)
}
