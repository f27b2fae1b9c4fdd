//! Where log lines end up
//!
//! Every destination receives a finished line in one `write_all` and is
//! flushed right after, so readers tailing a file see whole lines.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Where a logger sends its lines
pub enum Destination {
    Stdout,
    Stderr,
    File(FileOut),
    Writer(Box<dyn Write + Send>),
}

impl Default for Destination {
    fn default() -> Self {
        Destination::Stdout
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("Stdout"),
            Destination::Stderr => f.write_str("Stderr"),
            Destination::File(file) => f.debug_tuple("File").field(&file.path).finish(),
            Destination::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl Destination {
    /// Open `path` for appending, creating it if needed
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Destination::File(FileOut::append(path)?))
    }

    /// Wrap an arbitrary writer
    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        Destination::Writer(Box::new(writer))
    }

    /// Whether the destination is an interactive terminal
    pub fn is_terminal(&self) -> bool {
        match self {
            Destination::Stdout => io::stdout().is_terminal(),
            Destination::Stderr => io::stderr().is_terminal(),
            Destination::File(_) | Destination::Writer(_) => false,
        }
    }

    /// Write one complete line and flush it
    pub(crate) fn write_line(&mut self, line: &[u8]) -> Result<()> {
        match self {
            Destination::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line)
                    .and_then(|()| out.flush())
                    .context("Failed to write to stdout")
            }
            Destination::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(line)
                    .and_then(|()| err.flush())
                    .context("Failed to write to stderr")
            }
            Destination::File(file) => file.write_line(line),
            Destination::Writer(writer) => writer
                .write_all(line)
                .and_then(|()| writer.flush())
                .context("Log writer failed"),
        }
    }
}

/// Create a helpful error message for file open failures
fn create_helpful_error_message(path: &Path, error: &io::Error) -> String {
    let base_msg = format!("Cannot open log file '{}': {}", path.display(), error);

    let suggestion = match error.kind() {
        io::ErrorKind::PermissionDenied => {
            if path.parent().is_some_and(|p| !p.as_os_str().is_empty() && !p.exists()) {
                "Suggestion: Parent directory does not exist, create it first"
            } else {
                "Suggestion: Check file permissions or choose a writable location"
            }
        }
        io::ErrorKind::NotFound => "Suggestion: Parent directory does not exist, create it first",
        _ if path.is_dir() => "Suggestion: Path points to a directory, specify a filename instead",
        io::ErrorKind::InvalidInput => "Suggestion: Check for invalid characters in filename",
        _ => return base_msg,
    };

    format!("{}\n{}", base_msg, suggestion)
}

/// Log file owned by a single logger
pub struct FileOut {
    file: File,
    path: String,
}

impl FileOut {
    /// Open `path` in append mode, creating it if it does not exist
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_string = path_ref.to_string_lossy().to_string();

        match OpenOptions::new().create(true).append(true).open(path_ref) {
            Ok(file) => Ok(Self {
                file,
                path: path_string,
            }),
            Err(e) => Err(anyhow!("{}", create_helpful_error_message(path_ref, &e))),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Write a line and flush immediately so tailing readers see it
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.file
            .write_all(line)
            .with_context(|| format!("Log file write failed '{}'", self.path))?;
        self.file
            .flush()
            .with_context(|| format!("Log file flush failed '{}'", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_destination_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "existing\n").unwrap();

        let mut dest = Destination::file(&path).unwrap();
        dest.write_line(b"next\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\nnext\n");
        assert!(!dest.is_terminal());
    }

    #[test]
    fn test_missing_parent_directory_is_explained() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("app.log");

        let err = Destination::file(&path).unwrap_err().to_string();
        assert!(err.contains("Cannot open log file"));
        assert!(err.contains("Parent directory does not exist"));
    }

    #[test]
    fn test_directory_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(Destination::file(dir.path()).is_err());
    }

    #[test]
    fn test_debug_shows_file_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dbg.log");
        let dest = Destination::file(&path).unwrap();
        assert!(format!("{:?}", dest).contains("dbg.log"));
        assert_eq!(format!("{:?}", Destination::default()), "Stdout");
    }
}
