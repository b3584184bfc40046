use deltaseal::compact;
use deltaseal::compact::PREFIX_TABLE;
use deltaseal::crypto;
use deltaseal::pipeline;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

const KEY: &str = "proptest-key-proptest-key-propte";

// Leading segments are at least two characters so an unprefixed path never
// looks like an abbreviated one (`n.`, `e.`, ...).
fn path_strategy() -> impl Strategy<Value = String> {
    let prefixes: Vec<&'static str> = PREFIX_TABLE
        .iter()
        .map(|(long, _)| *long)
        .chain(["design.", "custom.", ""])
        .collect();
    (
        proptest::sample::select(prefixes),
        "[a-z][a-zA-Z0-9]{1,8}(\\.[a-zA-Z0-9]{1,8}){0,3}",
    )
        .prop_map(|(prefix, rest)| format!("{prefix}{rest}"))
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
    ]
}

fn path_value_strategy() -> impl Strategy<Value = Value> {
    (path_strategy(), proptest::option::of(scalar_strategy())).prop_map(|(path, value)| {
        let mut m = Map::new();
        m.insert("path".into(), Value::from(path));
        if let Some(v) = value {
            m.insert("value".into(), v);
        }
        Value::Object(m)
    })
}

fn update_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of("2024-0[1-9]-[0-2][0-9]T[0-2][0-9]:[0-5][0-9]:[0-5][0-9]\\.[0-9]{3}Z"),
        proptest::option::of(proptest::collection::vec(path_value_strategy(), 0..5)),
        proptest::option::of("[a-z]{1,6}\\.[0-9]{1,3}"),
    )
        .prop_map(|(timestamp, values, source)| {
            let mut m = Map::new();
            if let Some(t) = timestamp {
                m.insert("timestamp".into(), Value::from(t));
            }
            if let Some(s) = source {
                m.insert("$source".into(), Value::from(s));
            }
            if let Some(vs) = values {
                m.insert("values".into(), Value::Array(vs));
            }
            Value::Object(m)
        })
}

fn context_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,9}".prop_map(|mmsi| format!("vessels.urn:mrn:imo:mmsi:{mmsi}")),
        Just("vessels.self".to_string()),
        "vessels\\.urn:mrn:signalk:uuid:[a-f0-9]{8}",
    ]
}

fn record_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(context_strategy()),
        proptest::option::of(proptest::collection::vec(update_strategy(), 0..4)),
    )
        .prop_map(|(context, updates)| {
            let mut m = Map::new();
            if let Some(c) = context {
                m.insert("context".into(), Value::from(c));
            }
            if let Some(us) = updates {
                m.insert("updates".into(), Value::Array(us));
            }
            Value::Object(m)
        })
}

fn records_strategy() -> impl Strategy<Value = Value> {
    proptest::collection::vec(record_strategy(), 0..6).prop_map(Value::Array)
}

proptest! {
    #[test]
    fn prop_compact_expand_roundtrip(records in records_strategy()) {
        let compacted = compact::compact(&records);
        prop_assert_eq!(compact::expand(&compacted), records.clone());
        prop_assert_eq!(compact::expand_strict(&compacted).unwrap(), records);
    }

    #[test]
    fn prop_compaction_never_grows_json(records in records_strategy()) {
        let before = serde_json::to_vec(&records).unwrap().len();
        let after = serde_json::to_vec(&compact::compact(&records)).unwrap().len();
        prop_assert!(after <= before, "after={} before={}", after, before);
    }

    #[test]
    fn prop_non_sequence_passthrough(value in scalar_strategy()) {
        prop_assert_eq!(compact::compact(&value), value.clone());
        prop_assert_eq!(compact::expand(&value), value);
    }

    #[test]
    fn prop_encrypt_decrypt_roundtrip(plaintext in proptest::collection::vec(any::<u8>(), 1..2048)) {
        let payload = crypto::encrypt(&plaintext, KEY).unwrap();
        prop_assert_eq!(crypto::decrypt(&payload, KEY).unwrap(), plaintext);
    }

    #[test]
    fn prop_pipeline_roundtrip(records in records_strategy()) {
        let wire = pipeline::encode(&records, KEY).unwrap();
        prop_assert_eq!(pipeline::decode(&wire, KEY).unwrap(), records);
    }
}

#[test]
fn object_input_roundtrips_through_pipeline() {
    let value = json!({"context": "vessels.urn:mrn:imo:mmsi:1"});
    let wire = pipeline::encode(&value, KEY).unwrap();
    assert_eq!(pipeline::decode(&wire, KEY).unwrap(), value);
}
