#![no_main]
use deltaseal::compact;
use deltaseal::pipeline;
use libfuzzer_sys::fuzz_target;

const KEY: &str = "fuzz-key-fuzz-key-fuzz-key-fuzz!";

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // Input already using short field names may be refused up front.
    let Ok(wire) = pipeline::encode(&value, KEY) else {
        return;
    };

    // Anything encode accepts must decode, to what expansion of the compact
    // form yields.
    let decoded = pipeline::decode(&wire, KEY).unwrap();
    assert_eq!(decoded, compact::expand(&compact::compact(&value)));
});
