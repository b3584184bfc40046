#![no_main]
use deltaseal::compact;
use deltaseal::compress::Codec;
use deltaseal::pipeline::{self, PipelineOptions};
use libfuzzer_sys::fuzz_target;

const KEY: &str = "fuzz-key-fuzz-key-fuzz-key-fuzz!";

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must never panic, only return errors.
    let _ = pipeline::decode(data, KEY);

    // Skip the outer codec so the envelope parser sees the raw bytes.
    let opts = PipelineOptions {
        codec: Codec::None,
        ..Default::default()
    };
    let _ = pipeline::decode_with_options(data, KEY, &opts);

    // Expansion of arbitrary JSON must not panic in either mode.
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = compact::expand(&value);
        let _ = compact::expand_strict(&value);
    }
});
