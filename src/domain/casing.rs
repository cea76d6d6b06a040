//! Recursive key-casing conversion for untyped JSON crossing the wire
//! boundary: camelCase outside, snake_case inside.

use serde_json::Value;

pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('_');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Rewrite every object key in a JSON tree from camelCase to snake_case.
pub fn keys_to_snake(value: Value) -> Value {
    map_keys(value, &camel_to_snake)
}

/// Rewrite every object key in a JSON tree from snake_case to camelCase.
pub fn keys_to_camel(value: Value) -> Value {
    map_keys(value, &snake_to_camel)
}

fn map_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (convert(&key), map_keys(inner, convert)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| map_keys(item, convert))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_conversion_round_trips() {
        assert_eq!(camel_to_snake("departureTime"), "departure_time");
        assert_eq!(snake_to_camel("departure_time"), "departureTime");
        assert_eq!(snake_to_camel(&camel_to_snake("totalCapacityKg")), "totalCapacityKg");
        assert_eq!(camel_to_snake("id"), "id");
    }

    #[test]
    fn nested_objects_and_arrays_are_converted() {
        let wire = json!({
            "departureTime": "2026-04-01T08:00:00Z",
            "pricing": { "basePrice": 20.0, "pricePerKg": 1.5 },
            "stops": [ { "stopCity": "Lyon" }, { "stopCity": "Milan" } ]
        });

        let internal = keys_to_snake(wire.clone());
        assert_eq!(
            internal,
            json!({
                "departure_time": "2026-04-01T08:00:00Z",
                "pricing": { "base_price": 20.0, "price_per_kg": 1.5 },
                "stops": [ { "stop_city": "Lyon" }, { "stop_city": "Milan" } ]
            })
        );

        assert_eq!(keys_to_camel(internal), wire);
    }

    #[test]
    fn scalars_pass_through_untouched() {
        assert_eq!(keys_to_snake(json!(42)), json!(42));
        assert_eq!(keys_to_camel(json!("someString")), json!("someString"));
    }
}
