use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Utc};

use crate::Result;

/// One relayed exchange, ready to be appended to the log.
#[derive(Clone, Copy, Debug)]
pub struct LogRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub sender: &'a str,
    pub text: &'a str,
    pub reply: &'a str,
}

/// Append-only plain-text conversation log.
///
/// One record per completed exchange, human-readable, not meant for
/// structured re-parsing. Concurrent appends are serialized so records
/// never interleave.
#[derive(Debug)]
pub struct ExchangeLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ExchangeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &LogRecord<'_>) -> Result<()> {
        let entry = format!(
            "[{}] {}: {}\n[Bot]: {}\n",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.sender,
            record.text,
            record.reply
        );

        // A poisoned lock still guards a usable file; keep appending.
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        Ok(())
    }
}
