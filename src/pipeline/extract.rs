use serde_json::{Map, Value};

use crate::types::record::LatLng;

/// How a single value met during traversal is treated.
enum Node<'a> {
    Pair(LatLng),
    Object(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Discard,
}

fn classify(v: &Value) -> Node<'_> {
    match v {
        Value::Object(map) => {
            match (map.get("lat").and_then(coerce), map.get("lng").and_then(coerce)) {
                (Some(lat), Some(lng)) => Node::Pair(LatLng { lat, lng }),
                _ => Node::Object(map),
            }
        }
        Value::Array(items) => match items.as_slice() {
            [a, b] => match (coerce(a), coerce(b)) {
                (Some(lat), Some(lng)) => Node::Pair(LatLng { lat, lng }),
                _ => Node::Sequence(items),
            },
            _ => Node::Sequence(items),
        },
        _ => Node::Discard,
    }
}

/// Finite numbers, or strings holding one. `null`, booleans and empty
/// strings are not coordinates and do not read as 0.
fn coerce(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Flattens an arbitrarily nested structure into `(lat, lng)` pairs.
///
/// Accepts `[lat, lng]` pairs and `{lat, lng}` objects at any depth. The
/// root is always searched as a container, so a bare root pair yields
/// nothing. Traversal uses an explicit stack and expands last-in-first-out:
/// output order is not input order.
pub fn extract_points(raw: &Value) -> Vec<LatLng> {
    let mut out = Vec::new();
    let mut stack: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    while let Some(item) = stack.pop() {
        match classify(item) {
            Node::Pair(p) => out.push(p),
            Node::Object(map) => stack.extend(map.values()),
            Node::Sequence(items) => stack.extend(items.iter()),
            Node::Discard => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(v: &Value) -> Vec<(f64, f64)> {
        extract_points(v).into_iter().map(|p| (p.lat, p.lng)).collect()
    }

    #[test]
    fn extracts_array_pairs_in_lifo_order() {
        let raw = json!([[40.71, -74.0], [40.72, -74.01], [40.73, -74.02]]);
        assert_eq!(
            pairs(&raw),
            vec![(40.73, -74.02), (40.72, -74.01), (40.71, -74.0)]
        );
    }

    #[test]
    fn extracts_lat_lng_objects_and_coerces_strings() {
        let raw = json!([{"lat": "40.71", "lng": " -74.00 "}, {"lat": 1, "lng": 2, "extra": [3, 4]}]);
        let mut got = pairs(&raw);
        got.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        // The object's own pair wins; its nested [3, 4] is not visited.
        assert_eq!(got, vec![(1.0, 2.0), (40.71, -74.0)]);
    }

    #[test]
    fn descends_into_objects_without_coordinates() {
        let raw = json!({
            "zone_a": {"points": [[1.0, 2.0], [3.0, 4.0]]},
            "zone_b": {"lat": "n/a", "lng": 5, "inner": {"lat": 6, "lng": 7}}
        });
        let mut got = pairs(&raw);
        got.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        assert_eq!(got, vec![(1.0, 2.0), (3.0, 4.0), (6.0, 7.0)]);
    }

    #[test]
    fn bare_root_pair_yields_nothing() {
        assert!(pairs(&json!([40.71, -74.0])).is_empty());
        assert_eq!(pairs(&json!([[40.71, -74.0]])), vec![(40.71, -74.0)]);
    }

    #[test]
    fn counts_every_valid_leaf_in_mixed_nesting() {
        let raw = json!([
            [[[1, 1]], [[2, 2], [3, 3]]],
            {"a": {"lat": 4, "lng": 4}, "b": [[5, 5], "junk", null]},
            [6, 6, 6],
            [true, false],
            [null, null],
            ["", ""],
            "text",
            17
        ]);
        let got = extract_points(&raw);
        assert_eq!(got.len(), 5);
        assert!(got.iter().all(|p| p.lat.is_finite() && p.lng.is_finite()));
    }

    #[test]
    fn rejects_non_finite_and_scalar_roots() {
        assert!(pairs(&json!([["inf", 1]])).is_empty());
        assert!(pairs(&json!([["NaN", "NaN"]])).is_empty());
        assert!(pairs(&json!(42)).is_empty());
        assert!(pairs(&Value::Null).is_empty());
    }

    #[test]
    fn null_bool_and_empty_coordinates_are_skipped() {
        let raw = json!([{"lat": null, "lng": null}, [true, false], ["", " "], {"lat": "1.5", "lng": 2}]);
        assert_eq!(pairs(&raw), vec![(1.5, 2.0)]);
    }

    #[test]
    fn root_object_with_coordinates_is_a_point() {
        assert_eq!(pairs(&json!({"lat": 40.7, "lng": -74.0})), vec![(40.7, -74.0)]);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let mut v = json!([1.5, 2.5]);
        for _ in 0..10_000 {
            v = Value::Array(vec![v]);
        }
        assert_eq!(pairs(&v), vec![(1.5, 2.5)]);
        // serde_json's recursive Drop would overflow on this depth; unwind it iteratively.
        let mut cur = v;
        while let Value::Array(mut items) = cur {
            cur = items.pop().unwrap_or(Value::Null);
        }
    }
}
