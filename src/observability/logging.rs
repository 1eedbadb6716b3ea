use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Severity levels accepted by the engine logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the canonical uppercase representation.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rotation policy (default mirrors 1 GiB × 10 files).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRotationPolicy {
    pub max_bytes: usize,
    pub max_files: usize,
}

impl Default for LogRotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 1 << 30,
            max_files: 10,
        }
    }
}

/// Accumulated log lines for a rotated segment.
#[derive(Debug, Default, Clone)]
pub struct LogFile {
    lines: Vec<String>,
    bytes_written: usize,
}

impl LogFile {
    /// Lines contained within the segment.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Total bytes recorded before rotation.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}

/// JSON-line logger with deterministic rotation semantics.
#[derive(Debug, Clone)]
pub struct JsonLineLogger {
    policy: LogRotationPolicy,
    current_level: LogLevel,
    files: VecDeque<LogFile>,
    active: LogFile,
}

impl Default for JsonLineLogger {
    fn default() -> Self {
        Self::new(LogRotationPolicy::default())
    }
}

impl JsonLineLogger {
    /// Creates a logger anchored to the provided rotation policy.
    pub fn new(policy: LogRotationPolicy) -> Self {
        Self {
            policy,
            current_level: LogLevel::Info,
            files: VecDeque::new(),
            active: LogFile::default(),
        }
    }

    /// Returns the current log level.
    pub fn level(&self) -> LogLevel {
        self.current_level
    }

    /// Applies a dynamic log-level override.
    pub fn set_level(&mut self, level: LogLevel) {
        self.current_level = level;
    }

    /// Emits a JSON-line log entry stamped with the wall clock.
    pub fn log(
        &mut self,
        level: LogLevel,
        module: &str,
        message: &str,
    ) -> Result<(), LoggingError> {
        if level < self.current_level {
            return Ok(());
        }
        let record = LogRecord {
            ts: epoch_millis(),
            level: level.as_str(),
            module,
            message,
        };
        let line = serde_json::to_string(&record).map_err(LoggingError::Serialize)?;
        self.rotate_if_needed(line.len());
        self.active.bytes_written = self.active.bytes_written.saturating_add(line.len());
        self.active.lines.push(line);
        Ok(())
    }

    /// Returns the current file + rotated history.
    pub fn files(&self) -> impl Iterator<Item = &LogFile> {
        self.files.iter().chain(std::iter::once(&self.active))
    }

    fn rotate_if_needed(&mut self, next_line_len: usize) {
        if self.active.bytes_written + next_line_len <= self.policy.max_bytes {
            return;
        }
        if !self.active.lines.is_empty() {
            self.files.push_back(std::mem::take(&mut self.active));
            while self.files.len() > self.policy.max_files {
                self.files.pop_front();
            }
        }
        self.active = LogFile::default();
    }
}

/// Errors surfaced while serializing JSON-line logs.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct LogRecord<'a> {
    ts: u64,
    level: &'a str,
    module: &'a str,
    message: &'a str,
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Shared handle over the engine logger. The sink never surfaces errors to
/// callers; failed emissions are dropped.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    inner: Arc<Mutex<JsonLineLogger>>,
}

impl LogSink {
    pub fn new(logger: JsonLineLogger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(logger)),
        }
    }

    /// Applies a dynamic log-level override.
    pub fn set_level(&self, level: LogLevel) {
        self.inner.lock().unwrap().set_level(level);
    }

    pub fn debug(&self, module: &str, message: &str) {
        self.emit(LogLevel::Debug, module, message);
    }

    pub fn info(&self, module: &str, message: &str) {
        self.emit(LogLevel::Info, module, message);
    }

    pub fn warn(&self, module: &str, message: &str) {
        self.emit(LogLevel::Warn, module, message);
    }

    pub fn error(&self, module: &str, message: &str) {
        self.emit(LogLevel::Error, module, message);
    }

    fn emit(&self, level: LogLevel, module: &str, message: &str) {
        let _ = self.inner.lock().unwrap().log(level, module, message);
    }

    /// Snapshot of every recorded line, oldest segment first.
    pub fn lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .files()
            .flat_map(|file| file.lines().iter().cloned())
            .collect()
    }
}
