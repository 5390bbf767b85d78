//! Console output and progress reporting shared by the batch commands

use epubsort_core::{RunEvent, RunLog, RunObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};

pub type FileLog = RunLog<BufWriter<File>>;

/// Where human-readable lines go. With `--json` stdout is reserved for the
/// counters, so lines move to stderr.
#[derive(Clone, Copy)]
pub struct Console {
    json: bool,
}

impl Console {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print a line. Write errors (closed pipe, odd terminal) are dropped.
    pub fn line(&self, text: &str) {
        let _ = if self.json {
            writeln!(io::stderr().lock(), "{}", text)
        } else {
            writeln!(io::stdout().lock(), "{}", text)
        };
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Log a message to the run log (if any) and mirror it on the console
pub fn announce(console: Console, log: Option<&mut FileLog>, message: &str) {
    match log {
        Some(log) => console.line(&log.line(message)),
        None => console.line(message),
    }
}

/// Progress bar plus per-file event reporting
pub struct ConsoleObserver<'a> {
    bar: ProgressBar,
    console: Console,
    log: Option<&'a mut FileLog>,
    echo_all: bool,
}

impl<'a> ConsoleObserver<'a> {
    /// `echo_all` prints every event; otherwise only skips and errors are shown
    pub fn new(console: Console, log: Option<&'a mut FileLog>, echo_all: bool) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            console,
            log,
            echo_all,
        }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl RunObserver for ConsoleObserver<'_> {
    fn started(&mut self, total: usize) {
        let message = format!("Found {} EPUB files", total);
        announce(self.console, self.log.as_deref_mut(), &message);

        if total > 0 {
            self.bar = ProgressBar::new(total as u64);
            self.bar.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
        }
    }

    fn event(&mut self, event: &RunEvent<'_>) {
        let message = event.message();
        let line = match self.log.as_deref_mut() {
            Some(log) => log.line(&message),
            None => message,
        };

        if self.echo_all || event.is_problem() {
            let console = self.console;
            self.bar.suspend(|| console.line(&line));
        }
    }

    fn advanced(&mut self) {
        self.bar.inc(1);
    }
}
