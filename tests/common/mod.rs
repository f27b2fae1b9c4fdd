// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use tintlog::{Destination, FixedClock, Logger};

/// Path of the tintlog binary built for this test run
pub fn tintlog_binary() -> &'static str {
    env!("CARGO_BIN_EXE_tintlog")
}

/// Run tintlog with given arguments and input via stdin.
/// Config files are always ignored unless the caller passes `--config`.
pub fn run_tintlog_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    let mut full_args = args.to_vec();
    if !args.contains(&"--config") {
        full_args.push("--ignore-config");
    }

    let mut cmd = Command::new(tintlog_binary())
        .args(&full_args)
        .env_remove("NO_COLOR")
        .env_remove("FORCE_COLOR")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start tintlog");

    if let Some(mut stdin) = cmd.stdin.take() {
        // tintlog may stop reading early (escalation), so a broken pipe here is fine
        let _ = stdin.write_all(input.as_bytes());
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Run tintlog without stdin input
pub fn run_tintlog(args: &[&str]) -> (String, String, i32) {
    run_tintlog_with_input(args, "")
}

/// 2024-01-02 03:04:05
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap()
}

/// In-memory destination that also counts write calls
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
    writes: Arc<AtomicUsize>,
}

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.bytes.lock().unwrap().clone()).expect("log output is UTF-8")
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that rejects everything
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Logger with a fixed clock writing into a fresh `SharedBuffer`
pub fn capture_logger(name: &str) -> (Logger, SharedBuffer) {
    let logger = Logger::with_clock(name, Arc::new(FixedClock(fixed_time())));
    let buffer = SharedBuffer::default();
    logger.set_destination(Destination::writer(buffer.clone()));
    (logger, buffer)
}
