//! Injected logging.
//!
//! The controller and its managers log through an `Arc<dyn Logger>` rather
//! than calling `tracing` directly, so hosts choose where messages go and
//! tests can assert on what was reported.
//!
//! - [`TracingLogger`] forwards to `tracing`.
//! - [`NoOpLogger`] discards everything.
//! - [`MemoryLogger`] keeps entries in memory.
//!
//! ```
//! use boundaries_explorer::log::{Logger, MemoryLogger, LogLevel};
//! use boundaries_explorer::log_warn;
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemoryLogger::new());
//! let logger: Arc<dyn Logger> = memory.clone();
//! log_warn!(logger, "nearby fetch failed: {}", "timeout");
//!
//! assert!(memory.contains(LogLevel::Warn, "timeout"));
//! ```

mod adapters;
mod memory;

pub use adapters::{NoOpLogger, TracingLogger};
pub use memory::{LogEntry, MemoryLogger};

use std::fmt::{self, Arguments};

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Logging sink shared by controller components.
///
/// Implementors only provide [`Logger::log`]; the per-level methods delegate
/// to it.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    fn trace(&self, args: Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }

    fn debug(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    fn info(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn warn(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    fn error(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {
        $logger.trace(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(format_args!($($arg)*))
    };
}
