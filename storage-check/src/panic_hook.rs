//! Panic reporting.

use std::backtrace::Backtrace;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::logging::LOG_FILE_PREFIX;

/// What gets logged for a panic.
struct PanicRecord {
    at: DateTime<Local>,
    thread: String,
    location: String,
    message: String,
    backtrace: Backtrace,
}

impl PanicRecord {
    fn capture(info: &PanicHookInfo<'_>) -> Self {
        Self {
            at: Local::now(),
            thread: std::thread::current()
                .name()
                .unwrap_or("<unnamed>")
                .to_string(),
            location: info
                .location()
                .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
            message: info
                .payload_as_str()
                .map_or_else(|| info.to_string(), str::to_string),
            backtrace: Backtrace::force_capture(),
        }
    }

    /// Daily log file the record belongs to, matching the rolling appender.
    fn log_file(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(format!("{}.{}", LOG_FILE_PREFIX, self.at.format("%Y-%m-%d")))
    }

    fn append_to(&self, log_dir: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_file(log_dir))?;
        writeln!(file, "{self}")?;
        file.flush()
    }
}

impl fmt::Display for PanicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} PANIC thread={} location={} message={}\n{}",
            self.at.format("%Y-%m-%dT%H:%M:%S%.3f%:z"),
            self.thread,
            self.location,
            self.message,
            self.backtrace
        )
    }
}

/// Route panics through `tracing` before the default hook runs.
///
/// Release builds abort on panic, which can drop buffered file output, so
/// with a `log_dir` the record is also written to the day's log file
/// synchronously.
pub fn install(log_dir: Option<&Path>) {
    let log_dir = log_dir.map(Path::to_path_buf);
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let record = PanicRecord::capture(info);
        tracing::error!(target: "storage_check::panic", "{record}");

        if cfg!(panic = "abort")
            && let Some(dir) = log_dir.as_deref()
            && let Err(e) = record.append_to(dir)
        {
            eprintln!("failed to write panic record to {}: {e}", dir.display());
        }

        default_hook(info);
    }));
}
