//! The logging object
//!
//! A `Logger` filters calls by severity, renders one line per call into a
//! reusable scratch buffer and hands it to its destination in a single
//! write. The scratch buffer and the destination share one mutex, so lines
//! from concurrent callers never interleave.

use anyhow::{Context, Result};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};

use chrono::NaiveDateTime;

use crate::clock::{Clock, SystemClock};
use crate::color_rules::ColorResolver;
use crate::colors::Color;
use crate::destination::Destination;
use crate::header::{format_header, Caller, Flags};
use crate::level::Level;

/// Message body of a log call
#[derive(Clone, Copy)]
pub enum Message<'a> {
    /// Pre-built `format_args!` output
    Format(fmt::Arguments<'a>),
    /// Values joined by single spaces and terminated by a newline
    Values(&'a [&'a dyn fmt::Display]),
}

impl Message<'_> {
    fn render(&self) -> String {
        match self {
            Message::Format(args) => fmt::format(*args),
            Message::Values(values) => {
                let mut text = String::new();
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        text.push(' ');
                    }
                    // Writing into a String cannot fail.
                    let _ = fmt::write(&mut text, format_args!("{}", value));
                }
                text.push('\n');
                text
            }
        }
    }
}

/// A call whose severity reached the logger's escalation threshold
#[derive(Debug)]
pub struct Escalation {
    pub level: Level,
    /// The formatted message text, without prefix or header
    pub message: String,
    /// Set when the line could not be written before escalating
    pub write_error: Option<anyhow::Error>,
}

impl Escalation {
    /// Terminate the process with a general error status
    pub fn exit(self) -> ! {
        std::process::exit(1)
    }

    /// Unwind with the message text as the panic payload
    pub fn panic(self) -> ! {
        std::panic::panic_any(self.message)
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} escalated: {}", self.level, self.message.trim_end())
    }
}

/// Outcome of a leveled log call
#[derive(Debug)]
pub enum Dispatch {
    /// Below the minimum level; nothing was formatted or written
    Suppressed,
    Written,
    /// The destination rejected the line
    Failed(anyhow::Error),
    /// Severity reached the escalation threshold; the write was attempted
    Escalated(Escalation),
}

impl Dispatch {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Dispatch::Suppressed)
    }

    pub fn is_escalated(&self) -> bool {
        matches!(self, Dispatch::Escalated(_))
    }

    pub fn escalation(&self) -> Option<&Escalation> {
        match self {
            Dispatch::Escalated(escalation) => Some(escalation),
            _ => None,
        }
    }

    /// Collapse into a `Result`, treating write failures and escalations as errors
    pub fn into_result(self) -> Result<()> {
        match self {
            Dispatch::Suppressed | Dispatch::Written => Ok(()),
            Dispatch::Failed(err) => Err(err),
            Dispatch::Escalated(escalation) => match escalation.write_error {
                Some(err) => Err(err.context(format!(
                    "{} escalated: {}",
                    escalation.level,
                    escalation.message.trim_end()
                ))),
                None => Err(anyhow::anyhow!("{}", escalation)),
            },
        }
    }
}

/// State touched only while holding the output lock
struct Output {
    scratch: Vec<u8>,
    destination: Destination,
}

/// Leveled, optionally colored line logger
pub struct Logger {
    name: String,
    flags: AtomicU32,
    level: AtomicU8,
    escalation_level: AtomicU8,
    color_enabled: AtomicBool,
    color_resolver: RwLock<Option<Weak<dyn ColorResolver>>>,
    clock: Arc<dyn Clock>,
    output: Mutex<Output>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("flags", &self.flags())
            .field("level", &self.level())
            .field("escalation_level", &self.escalation_level())
            .field("color_enabled", &self.color_enabled())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger writing to stdout with `Flags::STD`, minimum level `Debug`
    /// and escalation at `Fatal`
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            flags: AtomicU32::new(Flags::STD.bits()),
            level: AtomicU8::new(Level::Debug as u8),
            escalation_level: AtomicU8::new(Level::Fatal as u8),
            color_enabled: AtomicBool::new(false),
            color_resolver: RwLock::new(None),
            clock,
            output: Mutex::new(Output {
                scratch: Vec::with_capacity(256),
                destination: Destination::default(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.flags.load(Ordering::Relaxed))
    }

    pub fn set_flags(&self, flags: Flags) {
        self.flags.store(flags.bits(), Ordering::Relaxed);
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn set_level_by_name(&self, name: &str) -> Result<()> {
        self.set_level(name.parse()?);
        Ok(())
    }

    pub fn escalation_level(&self) -> Level {
        Level::from_u8(self.escalation_level.load(Ordering::Relaxed))
    }

    pub fn set_escalation_level(&self, level: Level) {
        self.escalation_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn set_escalation_level_by_name(&self, name: &str) -> Result<()> {
        self.set_escalation_level(name.parse()?);
        Ok(())
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.level() == Level::Debug
    }

    pub fn color_enabled(&self) -> bool {
        self.color_enabled.load(Ordering::Relaxed)
    }

    pub fn enable_color(&self, enabled: bool) {
        self.color_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Attach a text-driven color resolver. Only a weak reference is kept;
    /// once the caller drops the resolver it is silently ignored.
    pub fn set_color_resolver<R: ColorResolver + 'static>(&self, resolver: &Arc<R>) {
        let weak: Weak<R> = Arc::downgrade(resolver);
        let weak: Weak<dyn ColorResolver> = weak;
        *self.resolver_slot() = Some(weak);
    }

    /// Whether a resolver is attached and still alive
    pub fn has_color_resolver(&self) -> bool {
        self.resolver().is_some()
    }

    pub fn clear_color_resolver(&self) {
        *self.resolver_slot() = None;
    }

    /// Replace the destination. Meant for setup, before steady-state logging.
    pub fn set_destination(&self, destination: Destination) {
        self.lock_output().destination = destination;
    }

    /// Send all further lines to `path`, opened in append mode
    pub fn set_output_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let destination = Destination::file(path.as_ref())
            .with_context(|| format!("Logger '{}' cannot switch output", self.name))?;
        self.set_destination(destination);
        Ok(())
    }

    /// Whether the current destination is an interactive terminal
    pub fn destination_is_terminal(&self) -> bool {
        self.lock_output().destination.is_terminal()
    }

    fn lock_output(&self) -> MutexGuard<'_, Output> {
        // The scratch buffer is cleared on every write, so a poisoned lock
        // leaves nothing inconsistent behind.
        self.output.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn resolver_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<Weak<dyn ColorResolver>>> {
        self.color_resolver
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn resolver(&self) -> Option<Arc<dyn ColorResolver>> {
        let slot = self
            .color_resolver
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.as_ref().and_then(Weak::upgrade)
    }

    /// Render one line into `scratch`, replacing its previous contents
    fn render(
        scratch: &mut Vec<u8>,
        flags: Flags,
        now: &NaiveDateTime,
        caller: Option<Caller>,
        prefix: &str,
        text: &str,
        color: Color,
    ) {
        scratch.clear();
        scratch.extend_from_slice(color.prefix().as_bytes());
        scratch.extend_from_slice(prefix.as_bytes());
        format_header(scratch, flags, now, caller);
        // The reset goes before the line's single newline.
        let body = text.strip_suffix('\n').unwrap_or(text);
        scratch.extend_from_slice(body.as_bytes());
        scratch.extend_from_slice(color.suffix().as_bytes());
        scratch.push(b'\n');
    }

    /// Write one line to the logger's own destination.
    ///
    /// The timestamp is taken before the lock so that contended calls keep
    /// their invocation time.
    pub fn output(&self, caller: Option<Caller>, prefix: &str, text: &str, color: Color) -> Result<()> {
        let now = self.clock.now();
        let flags = self.flags();

        let mut guard = self.lock_output();
        let Output {
            scratch,
            destination,
        } = &mut *guard;
        Self::render(scratch, flags, &now, caller, prefix, text, color);
        destination.write_line(scratch)
    }

    /// Like `output`, but write to `out` instead of the logger's destination.
    /// The lock is still held so the scratch buffer stays exclusive.
    pub fn output_to<W: Write + ?Sized>(
        &self,
        caller: Option<Caller>,
        prefix: &str,
        text: &str,
        color: Color,
        out: &mut W,
    ) -> Result<()> {
        let now = self.clock.now();
        let flags = self.flags();

        let mut guard = self.lock_output();
        let scratch = &mut guard.scratch;
        Self::render(scratch, flags, &now, caller, prefix, text, color);
        out.write_all(scratch)
            .and_then(|()| out.flush())
            .with_context(|| format!("Logger '{}' failed to write", self.name))
    }

    fn resolve_color(&self, requested: Color, level: Level, text: &str) -> Color {
        if !self.color_enabled() {
            return Color::None;
        }

        let mut color = requested;
        if color.is_none() {
            if let Some(resolver) = self.resolver() {
                color = resolver.color_for(text);
            }
        }
        if level >= Level::Error {
            color = Color::Red;
        }
        color
    }

    /// Filter, format, color and write one call.
    ///
    /// The caller location is that of the nearest frame not marked
    /// `#[track_caller]`, i.e. the user's call site.
    #[track_caller]
    pub fn log(&self, color: Color, level: Level, message: Message<'_>) -> Dispatch {
        if level < self.level() {
            return Dispatch::Suppressed;
        }
        let caller = Caller::here();

        let prefix = format!("{} {}", level.name(), self.name);
        let text = message.render();
        let color = self.resolve_color(color, level, &text);

        let written = self.output(Some(caller), &prefix, &text, color);

        if level >= self.escalation_level() {
            return Dispatch::Escalated(Escalation {
                level,
                message: text,
                write_error: written.err(),
            });
        }

        match written {
            Ok(()) => Dispatch::Written,
            Err(err) => Dispatch::Failed(err),
        }
    }

    #[track_caller]
    pub fn debug_colorf(&self, color_name: &str, args: fmt::Arguments<'_>) -> Dispatch {
        let color = Color::from_name(color_name).unwrap_or(Color::White);
        self.log(color, Level::Debug, Message::Format(args))
    }

    #[track_caller]
    pub fn debug_colorln(&self, color_name: &str, values: &[&dyn fmt::Display]) -> Dispatch {
        let color = Color::from_name(color_name).unwrap_or(Color::White);
        self.log(color, Level::Debug, Message::Values(values))
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) -> Dispatch {
        self.log(Color::for_level(Level::Debug), Level::Debug, Message::Format(args))
    }

    #[track_caller]
    pub fn debugln(&self, values: &[&dyn fmt::Display]) -> Dispatch {
        self.log(Color::for_level(Level::Debug), Level::Debug, Message::Values(values))
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) -> Dispatch {
        self.log(Color::for_level(Level::Info), Level::Info, Message::Format(args))
    }

    #[track_caller]
    pub fn infoln(&self, values: &[&dyn fmt::Display]) -> Dispatch {
        self.log(Color::for_level(Level::Info), Level::Info, Message::Values(values))
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) -> Dispatch {
        self.log(Color::for_level(Level::Warn), Level::Warn, Message::Format(args))
    }

    #[track_caller]
    pub fn warnln(&self, values: &[&dyn fmt::Display]) -> Dispatch {
        self.log(Color::for_level(Level::Warn), Level::Warn, Message::Values(values))
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) -> Dispatch {
        self.log(Color::for_level(Level::Error), Level::Error, Message::Format(args))
    }

    #[track_caller]
    pub fn errorln(&self, values: &[&dyn fmt::Display]) -> Dispatch {
        self.log(Color::for_level(Level::Error), Level::Error, Message::Values(values))
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> Dispatch {
        self.log(Color::for_level(Level::Fatal), Level::Fatal, Message::Format(args))
    }

    #[track_caller]
    pub fn fatalln(&self, values: &[&dyn fmt::Display]) -> Dispatch {
        self.log(Color::for_level(Level::Fatal), Level::Fatal, Message::Values(values))
    }
}
