use serde_json::Value;
use std::io;

use super::{flatten_fields, format_scalar};

/// Write output as CSV to stdout. A result holding `rows` (a schedule) is
/// written as one record per row; any other result as field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);
    let written = match result {
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
            _ => write_fields(&mut wtr, result),
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        other => wtr.write_record([format_scalar(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    if let Value::Object(map) = value {
        for (key, val) in flatten_fields(map) {
            if !val.is_array() {
                wtr.write_record([key, format_scalar(&val)])?;
            }
        }
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([format_scalar(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<String> = flatten_fields(first).into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;
    for item in rows {
        if let Value::Object(map) = item {
            let fields = flatten_fields(map);
            let record: Vec<String> = headers
                .iter()
                .map(|h| {
                    fields
                        .iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| format_scalar(v))
                        .unwrap_or_default()
                })
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}
