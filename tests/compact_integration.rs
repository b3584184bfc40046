// Integration tests for the compact module.
//
// Covers the reference record, prefix anchoring, optional-field presence,
// pass-through of non-sequence input, and strict vs lenient expansion.

use deltaseal::compact::{self, PREFIX_TABLE, Strictness};
use serde_json::{Value, json};

fn reference_input() -> Value {
    json!([{
        "context": "vessels.urn:mrn:imo:mmsi:123456789",
        "updates": [{
            "timestamp": "2024-01-01T00:00:00.000Z",
            "values": [
                {"path": "navigation.position", "value": {"latitude": 60.123, "longitude": 24.987}},
                {"path": "environment.wind.speedApparent", "value": 10.5}
            ]
        }]
    }])
}

#[test]
fn reference_record_compacts_and_expands() {
    let compacted = compact::compact(&reference_input());
    assert_eq!(
        compacted,
        json!([{
            "c": "123456789",
            "u": [{
                "t": "2024-01-01T00:00:00.000Z",
                "v": [
                    {"p": "n.position", "v": {"latitude": 60.123, "longitude": 24.987}},
                    {"p": "e.wind.speedApparent", "v": 10.5}
                ]
            }]
        }])
    );
    assert_eq!(compact::expand(&compacted), reference_input());
    assert_eq!(compact::expand_strict(&compacted).unwrap(), reference_input());
}

#[test]
fn compaction_shrinks_serialized_size() {
    let original = serde_json::to_vec(&reference_input()).unwrap();
    let compacted = serde_json::to_vec(&compact::compact(&reference_input())).unwrap();
    assert!(compacted.len() < original.len());
}

#[test]
fn prefix_anchoring() {
    let input = json!([{"updates": [{"values": [
        {"path": "networking.navigation.foo", "value": 1},
        {"path": "environment.navigation.environment.", "value": 2},
        {"path": "custom.navigation.x", "value": 3}
    ]}]}]);
    let compacted = compact::compact(&input);
    let paths: Vec<&str> = compacted[0]["u"][0]["v"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["p"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        ["w.navigation.foo", "e.navigation.environment.", "custom.navigation.x"]
    );
    assert_eq!(compact::expand(&compacted), input);
}

#[test]
fn every_namespace_roundtrips() {
    let values: Vec<Value> = PREFIX_TABLE
        .iter()
        .enumerate()
        .map(|(i, (long, _))| json!({"path": format!("{long}sensor{i}"), "value": i}))
        .collect();
    let input = json!([{
        "context": "vessels.urn:mrn:imo:mmsi:987654321",
        "updates": [{"timestamp": "2024-06-01T00:00:00Z", "values": values}]
    }]);
    let compacted = compact::compact(&input);
    for (entry, (_, short)) in compacted[0]["u"][0]["v"]
        .as_array()
        .unwrap()
        .iter()
        .zip(PREFIX_TABLE)
    {
        assert!(entry["p"].as_str().unwrap().starts_with(short));
    }
    assert_eq!(compact::expand(&compacted), input);
}

#[test]
fn many_records_and_updates_keep_order() {
    let records: Vec<Value> = (0..50)
        .map(|i| {
            json!({
                "context": format!("vessels.urn:mrn:imo:mmsi:{}", 200000000 + i),
                "updates": (0..3).map(|u| json!({
                    "timestamp": format!("2024-01-01T00:00:{:02}Z", u),
                    "values": [{"path": "propulsion.main.temperature", "value": 340 + u}]
                })).collect::<Vec<_>>()
            })
        })
        .collect();
    let input = Value::Array(records);
    let compacted = compact::compact(&input);
    assert_eq!(compacted[49]["c"], "200000049");
    assert_eq!(compacted[0]["u"][2]["t"], "2024-01-01T00:00:02Z");
    assert_eq!(compact::expand(&compacted), input);
}

#[test]
fn scalar_and_object_inputs_pass_through() {
    for value in [json!(null), json!(true), json!(3.5), json!("x"), json!({"updates": []})] {
        assert_eq!(compact::compact(&value), value);
        assert_eq!(compact::expand(&value), value);
        assert_eq!(
            compact::expand_with(&value, Strictness::Strict).unwrap(),
            value
        );
    }
}

#[test]
fn strict_and_lenient_disagree_only_on_bad_shapes() {
    let bad = json!([{"c": "1", "u": [{"t": "x", "v": {"p": "n.a"}}]}]);
    assert!(compact::expand_strict(&bad).is_err());
    assert_eq!(
        compact::expand(&bad),
        json!([{
            "context": "vessels.urn:mrn:imo:mmsi:1",
            "updates": [{"timestamp": "x", "v": {"p": "n.a"}}]
        }])
    );
}
