use serde_json::Value;

use super::horizon_label;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = [
        "monthly_payment",
        "new_payment",
        "tax_owed",
        "total_capital_gains_tax",
        "future_value",
        "minimum_payments",
        "cagr",
    ];

    if let Value::Object(map) = result_obj {
        // Try priority keys first (skip null values)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Not an object, just print directly
    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        // A payoff simulation reduces to its period count
        Value::Object(map) if map.contains_key("outcome") => {
            let periods = map.get("periods").map(format_minimal).unwrap_or_default();
            let outcome = map.get("outcome").map(format_minimal).unwrap_or_default();
            format!("{periods} ({outcome})")
        }
        _ => horizon_label(value).unwrap_or_else(|| serde_json::to_string(value).unwrap_or_default()),
    }
}
