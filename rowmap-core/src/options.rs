//! Construction-time options for builders and readers

use std::fmt;
use std::sync::Arc;

use crate::logging::{LogCrateLogger, LogSink, Logger};

/// Options consumed when a builder is constructed
///
/// ```rust,ignore
/// let options = Options::new()
///     .with_table_name("SingersV2")
///     .with_log_enabled(true);
/// let dml = Dml::<Singer>::with_options(options);
/// ```
#[derive(Clone)]
pub struct Options {
    pub(crate) table_name: Option<String>,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) log_enabled: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            table_name: None,
            logger: Arc::new(LogCrateLogger::default()),
            log_enabled: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `table_name` instead of the declared or derived table name
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn with_shared_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_log_enabled(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }

    pub(crate) fn log_sink(&self) -> LogSink {
        LogSink::new(Arc::clone(&self.logger), self.log_enabled)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("table_name", &self.table_name)
            .field("log_enabled", &self.log_enabled)
            .finish_non_exhaustive()
    }
}
