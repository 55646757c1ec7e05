//! Log sink used by the migration engine.
//!
//! The engine formats complete messages and hands them to a
//! [`MigrationLogger`]. [`TracingLogger`] forwards them to `tracing`;
//! [`MemoryLogger`] keeps them for inspection.

use std::fmt;
use std::sync::Mutex;

/// `tracing` target of every event emitted by [`TracingLogger`].
pub const LOG_TARGET: &str = "migra::migration";

/// Fire-and-forget sink for migration log lines.
pub trait MigrationLogger: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards migration log lines to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl MigrationLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: LOG_TARGET, "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: LOG_TARGET, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: LOG_TARGET, "{}", message);
    }
}

/// Severity of a recorded log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Debug,
    Error,
}

/// A log line captured by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every log line in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Messages logged at `level`, in order.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        // A poisoned log is still a valid log.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MigrationLogger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

/// Tags every message with `[MIGRATION::{request_id}] `.
pub(crate) struct RequestLog<'a> {
    logger: &'a dyn MigrationLogger,
    prefix: String,
}

impl<'a> RequestLog<'a> {
    pub(crate) fn new(logger: &'a dyn MigrationLogger, request_id: &str) -> Self {
        Self {
            logger,
            prefix: format!("[MIGRATION::{}] ", request_id),
        }
    }

    pub(crate) fn info(&self, args: fmt::Arguments<'_>) {
        self.logger.info(&self.tag(args));
    }

    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        self.logger.debug(&self.tag(args));
    }

    pub(crate) fn error(&self, args: fmt::Arguments<'_>) {
        self.logger.error(&self.tag(args));
    }

    fn tag(&self, args: fmt::Arguments<'_>) -> String {
        format!("{}{}", self.prefix, args)
    }
}
