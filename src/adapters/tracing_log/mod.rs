// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::ports::*;

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
///
/// Logs go to stderr so stdout stays clean for command output. Calling this
/// twice is harmless; the second subscriber is simply not installed.
pub fn init_subscriber(level: LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fetchclip={}", level.as_str())));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Tracing log adapter
pub struct TracingLogAdapter {
    current_level: LogLevel,
}

impl TracingLogAdapter {
    /// Create new tracing log adapter
    pub fn new(current_level: LogLevel) -> Self {
        Self { current_level }
    }

    /// Check if log level should be logged
    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.current_level
    }

    fn render_context(event: &LogEvent) -> String {
        event
            .context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        if self.should_log(LogLevel::Info) {
            info!("{}", message);
        }
    }

    async fn warn(&self, message: &str) {
        if self.should_log(LogLevel::Warn) {
            warn!("{}", message);
        }
    }

    async fn error(&self, message: &str) {
        if self.should_log(LogLevel::Error) {
            error!("{}", message);
        }
    }

    async fn debug(&self, message: &str) {
        if self.should_log(LogLevel::Debug) {
            debug!("{}", message);
        }
    }

    async fn log_event(&self, event: &LogEvent) {
        if !self.should_log(event.level) {
            return;
        }

        let context = Self::render_context(event);
        match event.level {
            LogLevel::Error => error!(context = %context, "{}", event.message),
            LogLevel::Warn => warn!(context = %context, "{}", event.message),
            LogLevel::Info => info!(context = %context, "{}", event.message),
            LogLevel::Debug => debug!(context = %context, "{}", event.message),
            LogLevel::Trace => tracing::trace!(context = %context, "{}", event.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let adapter = TracingLogAdapter::new(LogLevel::Warn);
        assert!(adapter.should_log(LogLevel::Error));
        assert!(adapter.should_log(LogLevel::Warn));
        assert!(!adapter.should_log(LogLevel::Info));
        assert!(!adapter.should_log(LogLevel::Debug));
    }

    #[test]
    fn test_render_context() {
        let event = LogEvent::new(LogLevel::Info, "download finished")
            .with("file", "clip.webm")
            .with("bytes", 42);
        assert_eq!(
            TracingLogAdapter::render_context(&event),
            "file=clip.webm bytes=42"
        );
    }

    #[tokio::test]
    async fn test_logging_without_subscriber_does_not_panic() {
        let adapter = TracingLogAdapter::default();
        adapter.info("hello").await;
        adapter
            .log_event(&LogEvent::new(LogLevel::Error, "boom").with("k", "v"))
            .await;
    }
}
