#![no_main]

use chrono::DateTime;
use libfuzzer_sys::fuzz_target;
use tintlog::header::{format_header, Caller, Flags};

const FILES: [&str; 4] = ["main.rs", "/abs/path/lib.rs", r"win\dir\mod.rs", ""];

fuzz_target!(|data: &[u8]| {
    if data.len() < 14 {
        return;
    }

    let flags = Flags::from_bits_truncate(data[0] as u32);
    let secs = i64::from_le_bytes(data[1..9].try_into().unwrap()) % 253_402_300_799;
    let nanos = u32::from_le_bytes(data[9..13].try_into().unwrap()) % 2_000_000_000;
    let caller = Caller {
        file: FILES[data[13] as usize % FILES.len()],
        line: data.len() as u32,
    };

    let Some(now) = DateTime::from_timestamp(secs, nanos) else {
        return;
    };

    let mut buf = Vec::new();
    format_header(&mut buf, flags, &now.naive_utc(), Some(caller));

    // Header always starts with a space and never contains a newline.
    assert_eq!(buf.first(), Some(&b' '));
    assert!(!buf.contains(&b'\n'));
});
