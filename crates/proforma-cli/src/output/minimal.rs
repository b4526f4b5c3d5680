use serde_json::Value;

/// Print just the headline number from the output: the NPV for projections
/// and sensitivity runs, the weighted NPV for scenarios, the interest total
/// for amortisation schedules.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Indicators live one level down in the projection bundle
    let haystack = result
        .as_object()
        .and_then(|m| m.get("indicators"))
        .unwrap_or(result);

    let priority_keys = [
        "npv",
        "probabilityWeightedNpv",
        "baseNpv",
        "irr",
        "totalInterest",
    ];

    if let Value::Object(map) = haystack {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar(val));
                    return;
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val));
            return;
        }
    }

    println!("{}", scalar(haystack));
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
