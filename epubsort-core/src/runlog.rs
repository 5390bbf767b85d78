//! Timestamped run log
//!
//! A plain-text UTF-8 log owned by one invocation. The handle is passed
//! explicitly to whoever needs to write to it and is closed when dropped.

use chrono::Local;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Default log file name written into the scanned directory
pub const DEFAULT_LOG_FILE: &str = "run_log.txt";

/// Timestamped line writer
pub struct RunLog<W: Write> {
    writer: W,
}

impl RunLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write `message` with a timestamp and return the full line.
    ///
    /// Write failures are ignored: losing a log line must not stop a run.
    pub fn line(&mut self, message: &str) -> String {
        let line = format!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            tracing::warn!("Failed to write run log: {}", e);
        }
        line
    }

    /// Write multi-line text without a timestamp (e.g. an error chain)
    pub fn raw(&mut self, text: &str) {
        if let Err(e) = writeln!(self.writer, "{}", text).and_then(|_| self.writer.flush()) {
            tracing::warn!("Failed to write run log: {}", e);
        }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use tempfile::TempDir;

    #[test]
    fn test_lines_are_timestamped() {
        let mut log = RunLog::new(Vec::new());
        let line = log.line("Scanning /books");
        log.raw("detail");

        let stamp = Regex::new(r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\] Scanning /books$").unwrap();
        assert!(stamp.is_match(&line), "unexpected line: {}", line);

        let written = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(written, format!("{}\ndetail\n", line));
    }

    #[test]
    fn test_create_truncates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_LOG_FILE);
        std::fs::write(&path, "previous run\n").unwrap();

        {
            let mut log = RunLog::create(&path).unwrap();
            log.line("fresh start 中文");
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("previous run"));
        assert!(content.contains("fresh start 中文"));
    }
}
