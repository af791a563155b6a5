//! Access logging
//!
//! Builders and readers describe every statement, mutation and read they
//! issue through a [`Logger`], but only when logging was enabled at
//! construction. The default logger forwards to the standard `log` facade, so
//! whatever backend the application installed (env_logger, a JSON logger, ...)
//! receives the lines under the `rowmap` target.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Target used for lines emitted through the `log` facade
pub const LOG_TARGET: &str = "rowmap";

/// Sink for access log lines
pub trait Logger: Send + Sync {
    fn log(&self, args: fmt::Arguments<'_>);
}

impl<F> Logger for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn log(&self, args: fmt::Arguments<'_>) {
        self(args)
    }
}

/// Logger backed by the `log` crate
#[derive(Debug, Clone, Copy)]
pub struct LogCrateLogger {
    level: log::Level,
}

impl LogCrateLogger {
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> log::Level {
        self.level
    }
}

impl Default for LogCrateLogger {
    fn default() -> Self {
        Self::new(log::Level::Info)
    }
}

impl Logger for LogCrateLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        log::log!(target: LOG_TARGET, self.level, "{}", args);
    }
}

/// Logger that keeps every line in memory
#[derive(Debug, Clone, Default)]
pub struct CapturedLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines captured so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Logger for CapturedLog {
    fn log(&self, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).push(args.to_string());
    }
}

/// Logger plus the enabled flag, as held by builders and readers
#[derive(Clone)]
pub(crate) struct LogSink {
    logger: Arc<dyn Logger>,
    enabled: bool,
}

impl LogSink {
    pub(crate) fn new(logger: Arc<dyn Logger>, enabled: bool) -> Self {
        Self { logger, enabled }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    /// Forward a line to the logger when logging is enabled
    pub(crate) fn emit(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            self.logger.log(args);
        }
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").field("enabled", &self.enabled).finish_non_exhaustive()
    }
}
