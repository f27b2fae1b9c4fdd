use std::io;
use std::process;

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalPipe = 141, // 128 + SIGPIPE (13)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Cross-platform broken pipe detection
pub fn is_broken_pipe(e: &io::Error) -> bool {
    #[cfg(windows)]
    {
        // On Windows, broken pipe manifests as different error codes
        e.kind() == io::ErrorKind::BrokenPipe
            || e.raw_os_error() == Some(232) // ERROR_NO_DATA "The pipe is being closed"
            || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE "The pipe has been ended"
    }
    #[cfg(not(windows))]
    {
        e.kind() == io::ErrorKind::BrokenPipe
    }
}

/// Whether an error chain bottoms out in a broken pipe
pub fn caused_by_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(is_broken_pipe)
}
