#![no_main]
use deltaseal::compact::{context, prefix};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Argument parsing must reject junk without panicking.
    let args: Vec<String> = text.split_whitespace().take(32).map(str::to_owned).collect();
    deltaseal::cli::fuzz_try_parse_args(&args);

    // A shortened path always lengthens back.
    let short = prefix::shorten(text);
    if short != text {
        assert_eq!(prefix::lengthen(&short), text);
    }

    // An extracted MMSI always rebuilds the same context.
    if let Some(mmsi) = context::mmsi_of(text) {
        assert_eq!(context::context_for(mmsi), text);
    }
});
