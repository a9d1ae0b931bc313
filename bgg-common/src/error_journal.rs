//! Append-only error journal
//!
//! Every hard error of a run is written here as a timestamped line, in
//! addition to the tracing output, so failed IDs can be reconciled by hand
//! after the run. Journal failures never propagate to the caller.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Timestamped, append-only error log file
#[derive(Debug)]
pub struct ErrorJournal {
    path: Option<PathBuf>,
    // Serializes appends from concurrent callers
    lock: Mutex<()>,
}

impl ErrorJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            lock: Mutex::new(()),
        }
    }

    /// Journal that only forwards to tracing
    pub fn disabled() -> Self {
        Self {
            path: None,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Log `message` at error level and append it to the journal file.
    pub fn record(&self, message: &str) {
        tracing::error!(message = %message, "Recorded error");

        let Some(path) = &self.path else {
            return;
        };

        let line = format!(
            "[{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            tracing::warn!(file = %path.display(), error = %e, "Failed to append to error journal");
        }
    }
}
