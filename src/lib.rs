// Core library for the tintlog line logger
//
// A `Logger` writes one line per call:
//
//     [color]<LEVEL> <name> [date ][time[.micros] ][file:line: ]<message>[reset]\n
//
// Lines from concurrent callers never interleave. Calls at or above the
// escalation level come back as `Dispatch::Escalated` so the caller decides
// whether to exit, panic or carry on.

pub mod clock;
pub mod color_rules;
pub mod colors;
pub mod config;
pub mod config_file;
pub mod destination;
pub mod header;
pub mod level;
pub mod logger;
pub mod platform;
pub mod registry;
pub mod tty;

pub use clock::{Clock, FixedClock, SystemClock};
pub use color_rules::{ColorResolver, ColorRules};
pub use colors::Color;
pub use config::{ColorMode, LoggerSettings};
pub use config_file::ConfigFile;
pub use destination::Destination;
pub use header::{Caller, Flags};
pub use level::Level;
pub use logger::{Dispatch, Escalation, Logger, Message};
pub use registry::Registry;

/// `debugf!(logger, "x = {}", x)`
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(::std::format_args!($($arg)+))
    };
}

/// `infof!(logger, "x = {}", x)`
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(::std::format_args!($($arg)+))
    };
}

/// `warnf!(logger, "x = {}", x)`
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(::std::format_args!($($arg)+))
    };
}

/// `errorf!(logger, "x = {}", x)`
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(::std::format_args!($($arg)+))
    };
}

/// `fatalf!(logger, "x = {}", x)`
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::std::format_args!($($arg)+))
    };
}
