#![no_main]

use libfuzzer_sys::fuzz_target;
use tintlog::{ColorResolver, ColorRules};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Load errors are fine; we only care about panics.
        if let Ok(rules) = ColorRules::from_json(input) {
            let _ = rules.color_for(input);
        }
    }
});
