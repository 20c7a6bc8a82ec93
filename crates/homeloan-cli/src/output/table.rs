use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_fields, format_scalar};

/// Format output as tables using the tabled crate: one field/value table for
/// the result, plus one table per array of rows (e.g. a debt schedule).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => print_object(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_object(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested_rows = Vec::new();
    for (key, val) in flatten_fields(map) {
        match val {
            Value::Array(arr) if arr.iter().all(Value::is_object) && !arr.is_empty() => {
                nested_rows.push((key, arr));
            }
            Value::Array(arr) => {
                let items: Vec<String> = arr.iter().map(format_scalar).collect();
                builder.push_record([key, items.join(", ")]);
            }
            other => builder.push_record([key, format_scalar(&other)]),
        }
    }
    println!("{}", Table::from(builder));

    for (key, rows) in nested_rows {
        println!("\n{}:", key);
        print_rows(&rows);
    }
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_scalar(item));
        }
        return;
    };

    let headers: Vec<String> = flatten_fields(first).into_iter().map(|(k, _)| k).collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in arr {
        if let Value::Object(map) = item {
            let fields = flatten_fields(map);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    fields
                        .iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| format_scalar(v))
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
