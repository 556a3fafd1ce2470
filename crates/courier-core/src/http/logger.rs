//! Request logger collaborator
//!
//! The executor reports the start and completion of every request to an
//! optional [`RequestLogger`]. Any `Fn(&str, log::Level)` closure works as a
//! logger; [`TracingLogger`] forwards to `tracing`.

use log::Level;

/// Receives human-readable request lifecycle messages
pub trait RequestLogger: Send + Sync {
    fn log(&self, message: &str, level: Level);
}

impl<F> RequestLogger for F
where
    F: Fn(&str, Level) + Send + Sync,
{
    fn log(&self, message: &str, level: Level) {
        self(message, level)
    }
}

/// Logger emitting `tracing` events under the `courier::request` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn log(&self, message: &str, level: Level) {
        match level {
            Level::Error => tracing::error!(target: "courier::request", "{}", message),
            Level::Warn => tracing::warn!(target: "courier::request", "{}", message),
            Level::Info => tracing::info!(target: "courier::request", "{}", message),
            Level::Debug => tracing::debug!(target: "courier::request", "{}", message),
            Level::Trace => tracing::trace!(target: "courier::request", "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_logger() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let logger = move |message: &str, level: Level| {
            sink.lock().unwrap().push((message.to_string(), level));
        };

        logger.log("GET http://h", Level::Info);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("GET http://h".to_string(), Level::Info)]);
    }

    #[test]
    fn test_tracing_logger_accepts_all_levels() {
        let logger = TracingLogger;
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            logger.log("message", level);
        }
    }
}
