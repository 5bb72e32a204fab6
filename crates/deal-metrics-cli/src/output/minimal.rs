use serde_json::{Map, Value};

/// Headline fields, most important first.
const PRIORITY_KEYS: [&str; 6] = ["overall", "score", "tcv", "term_profit", "arr", "monthly_revenue"];

/// Print just the headline value of the output.
///
/// Looks through the result object (and a nested `totals` object, as produced
/// by `analyze`) for the first non-null priority field. A cash-flow series
/// prints its final cumulative profit.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(found) = find_priority(map).or_else(|| {
                map.get("totals")
                    .and_then(Value::as_object)
                    .and_then(find_priority)
            }) {
                println!("{}", format_minimal(found));
            } else if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        Value::Array(points) => {
            let last = points.last().and_then(|p| p.get("cumulative_profit"));
            println!("{}", last.map(format_minimal).unwrap_or_default());
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn find_priority(map: &Map<String, Value>) -> Option<&Value> {
    PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
