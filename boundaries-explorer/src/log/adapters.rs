//! `tracing` and silent loggers.

use std::fmt::Arguments;

use super::{LogLevel, Logger};

/// Forwards to the `tracing` macros. Needs a subscriber installed, see
/// [`crate::logging::init_logging`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Trace => tracing::trace!("{}", args),
            LogLevel::Debug => tracing::debug!("{}", args),
            LogLevel::Info => tracing::info!("{}", args),
            LogLevel::Warn => tracing::warn!("{}", args),
            LogLevel::Error => tracing::error!("{}", args),
        }
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_adapters_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingLogger>();
        assert_send_sync::<NoOpLogger>();
    }

    #[test]
    fn test_adapters_as_trait_objects() {
        let loggers: Vec<Arc<dyn Logger>> = vec![Arc::new(TracingLogger::new()), Arc::new(NoOpLogger)];
        for logger in loggers {
            logger.info(format_args!("boundary dataset loaded"));
            logger.warn(format_args!("nearby fetch failed"));
        }
    }
}
