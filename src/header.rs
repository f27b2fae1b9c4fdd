//! Line header formatting
//!
//! Every line starts with `<LEVEL> <name>` followed by the header built
//! here: ` [YYYY/MM/DD ][HH:MM:SS[.micros] ][file:line: ]`.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::ops::{BitOr, BitOrAssign};
use std::panic::Location;
use std::str::FromStr;

/// Selects which fields appear in the line header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// `2009/01/23`
    pub const DATE: Flags = Flags(1 << 0);
    /// `01:23:23`
    pub const TIME: Flags = Flags(1 << 1);
    /// `01:23:23.123123`, implies `TIME`
    pub const MICROSECONDS: Flags = Flags(1 << 2);
    /// `/a/b/c/main.rs:23`
    pub const LONG_FILE: Flags = Flags(1 << 3);
    /// `main.rs:23`, overrides `LONG_FILE`
    pub const SHORT_FILE: Flags = Flags(1 << 4);
    pub const STD: Flags = Flags(Self::DATE.0 | Self::TIME.0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Unknown bits are dropped
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Flags(bits & 0b1_1111)
    }

    /// True when every bit of `other` is set
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when any bit of `other` is set
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether lines need the caller's file and line
    pub const fn wants_caller(self) -> bool {
        self.intersects(Flags(Self::LONG_FILE.0 | Self::SHORT_FILE.0))
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::STD
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl FromStr for Flags {
    type Err = anyhow::Error;

    /// Comma-separated list, e.g. `date,time,shortfile`
    fn from_str(s: &str) -> Result<Self> {
        let mut flags = Flags::NONE;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            flags |= match part.to_ascii_lowercase().as_str() {
                "none" => Flags::NONE,
                "date" => Flags::DATE,
                "time" => Flags::TIME,
                "micro" | "micros" | "microseconds" => Flags::MICROSECONDS,
                "longfile" | "long-file" => Flags::LONG_FILE,
                "shortfile" | "short-file" => Flags::SHORT_FILE,
                "std" | "default" => Flags::STD,
                other => return Err(anyhow!("Unknown header flag '{}'", other)),
            };
        }
        Ok(flags)
    }
}

/// Source location of a log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    /// Placeholder used when the location was not captured
    pub const UNKNOWN: Caller = Caller {
        file: "???",
        line: 0,
    };

    /// Location of the nearest caller not marked `#[track_caller]`
    #[track_caller]
    pub fn here() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Caller {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// Append `value` in decimal, zero-padded on the left to `width` digits.
/// A negative width never pads.
pub fn itoa(buf: &mut Vec<u8>, value: u64, width: i32) {
    if value == 0 && width <= 1 {
        buf.push(b'0');
        return;
    }

    // Assemble in reverse; u64::MAX has 20 digits.
    let mut digits = [0u8; 20];
    let mut pos = digits.len();
    let mut rest = value;
    let mut remaining = width;
    while (rest > 0 || remaining > 0) && pos > 0 {
        pos -= 1;
        remaining -= 1;
        digits[pos] = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    buf.extend_from_slice(&digits[pos..]);
}

/// Final path component, accepting both `/` and `\` separators
pub fn short_file(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Append the header for `flags` at time `now`.
///
/// `caller` is only consulted when a file flag is set; a missing caller is
/// written as `???:0`.
pub fn format_header(buf: &mut Vec<u8>, flags: Flags, now: &NaiveDateTime, caller: Option<Caller>) {
    buf.push(b' ');

    if flags.intersects(Flags::DATE | Flags::TIME | Flags::MICROSECONDS) {
        if flags.contains(Flags::DATE) {
            itoa(buf, now.year().max(0) as u64, 4);
            buf.push(b'/');
            itoa(buf, now.month() as u64, 2);
            buf.push(b'/');
            itoa(buf, now.day() as u64, 2);
            buf.push(b' ');
        }
        if flags.intersects(Flags::TIME | Flags::MICROSECONDS) {
            itoa(buf, now.hour() as u64, 2);
            buf.push(b':');
            itoa(buf, now.minute() as u64, 2);
            buf.push(b':');
            itoa(buf, now.second() as u64, 2);
            if flags.contains(Flags::MICROSECONDS) {
                buf.push(b'.');
                // Leap seconds report nanoseconds past 1e9.
                itoa(buf, (now.nanosecond() / 1_000 % 1_000_000) as u64, 6);
            }
            buf.push(b' ');
        }
    }

    if flags.wants_caller() {
        let caller = caller.unwrap_or(Caller::UNKNOWN);
        let file = if flags.contains(Flags::SHORT_FILE) {
            short_file(caller.file)
        } else {
            caller.file
        };
        buf.extend_from_slice(file.as_bytes());
        buf.push(b':');
        itoa(buf, caller.line as u64, -1);
        buf.extend_from_slice(b": ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn ts(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    fn itoa_str(value: u64, width: i32) -> String {
        let mut buf = Vec::new();
        itoa(&mut buf, value, width);
        String::from_utf8(buf).unwrap()
    }

    fn header(flags: Flags, caller: Option<Caller>) -> String {
        let mut buf = Vec::new();
        format_header(&mut buf, flags, &ts(3, 4, 5, 7_089), caller);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_itoa_widths() {
        assert_eq!(itoa_str(123, 5), "00123");
        assert_eq!(itoa_str(123, -5), "123");
        assert_eq!(itoa_str(123, 2), "123");
        assert_eq!(itoa_str(0, 1), "0");
        assert_eq!(itoa_str(0, -1), "0");
        assert_eq!(itoa_str(0, 2), "00");
        assert_eq!(itoa_str(u64::MAX, -1), u64::MAX.to_string());
    }

    #[test]
    fn test_itoa_appends() {
        let mut buf = b"x=".to_vec();
        itoa(&mut buf, 7, 3);
        assert_eq!(buf, b"x=007");
    }

    #[test]
    fn test_std_header() {
        assert_eq!(header(Flags::STD, None), " 2024/01/02 03:04:05 ");
    }

    #[test]
    fn test_no_flags_is_single_space() {
        assert_eq!(header(Flags::NONE, None), " ");
    }

    #[test]
    fn test_microseconds_imply_time() {
        assert_eq!(header(Flags::MICROSECONDS, None), " 03:04:05.007089 ");
        assert_eq!(
            header(Flags::DATE | Flags::MICROSECONDS, None),
            " 2024/01/02 03:04:05.007089 "
        );
    }

    #[test]
    fn test_date_only() {
        assert_eq!(header(Flags::DATE, None), " 2024/01/02 ");
    }

    #[test]
    fn test_long_and_short_file() {
        let caller = Some(Caller {
            file: "src/net/conn.rs",
            line: 42,
        });
        assert_eq!(header(Flags::LONG_FILE, caller), " src/net/conn.rs:42: ");
        assert_eq!(header(Flags::SHORT_FILE, caller), " conn.rs:42: ");
        assert_eq!(
            header(Flags::LONG_FILE | Flags::SHORT_FILE, caller),
            " conn.rs:42: "
        );
        assert_eq!(
            header(Flags::TIME | Flags::SHORT_FILE, caller),
            " 03:04:05 conn.rs:42: "
        );
    }

    #[test]
    fn test_missing_caller_uses_placeholder() {
        assert_eq!(header(Flags::SHORT_FILE, None), " ???:0: ");
    }

    #[test]
    fn test_short_file_variants() {
        assert_eq!(short_file("main.rs"), "main.rs");
        assert_eq!(short_file("/a/b/c.rs"), "c.rs");
        assert_eq!(short_file(r"src\win\d.rs"), "d.rs");
    }

    #[test]
    fn test_caller_here_points_at_this_file() {
        let caller = Caller::here();
        assert!(caller.file.ends_with("header.rs"));
        assert!(caller.line > 0);
    }

    #[test]
    fn test_flags_parse() {
        assert_eq!("std".parse::<Flags>().unwrap(), Flags::STD);
        assert_eq!(
            "date, time,shortfile".parse::<Flags>().unwrap(),
            Flags::STD | Flags::SHORT_FILE
        );
        assert_eq!("".parse::<Flags>().unwrap(), Flags::NONE);
        assert!("date,weekday".parse::<Flags>().is_err());
    }

    #[test]
    fn test_flags_queries() {
        let flags = Flags::DATE | Flags::LONG_FILE;
        assert!(flags.contains(Flags::DATE));
        assert!(!flags.contains(Flags::STD));
        assert!(flags.intersects(Flags::STD));
        assert!(flags.wants_caller());
        assert!(!Flags::STD.wants_caller());
        assert_eq!(Flags::from_bits_truncate(0xFFFF_FFFF).bits(), 0b1_1111);
    }

    proptest! {
        #[test]
        fn prop_itoa_matches_padded_format(value in 0u64..10_000_000, width in 0i32..12) {
            let expected = format!("{:0width$}", value, width = width as usize);
            prop_assert_eq!(itoa_str(value, width), expected);
        }

        #[test]
        fn prop_itoa_negative_width_is_minimal(value in any::<u64>(), width in -20i32..0) {
            prop_assert_eq!(itoa_str(value, width), value.to_string());
        }
    }
}
