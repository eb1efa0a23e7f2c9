pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a serialised `Horizon` (`{"kind": "finite", "periods": "118.4"}`
/// or `{"kind": "never"}`) as a single cell.
pub fn horizon_label(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    match map.get("kind")?.as_str()? {
        "never" => Some("never".to_string()),
        "finite" => map.get("periods").map(|p| match p {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        _ => None,
    }
}

/// First non-empty array of objects in a result (schedules, breakdowns,
/// year-by-year projections), searching one level of nesting.
pub fn tabular_field(result: &serde_json::Map<String, Value>) -> Option<&[Value]> {
    fn rows_of(val: &Value) -> bool {
        matches!(val, Value::Array(rows) if matches!(rows.first(), Some(Value::Object(_))))
    }
    result
        .values()
        .find(|v| rows_of(v))
        .or_else(|| {
            result
                .values()
                .filter_map(Value::as_object)
                .flat_map(|inner| inner.values())
                .find(|v| rows_of(v))
        })
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}
