//! Tracing subscriber setup for programs and test suites that drive the
//! pipeline.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Set to `1` or `true` to emit JSON log lines from [`TelemetryConfig::from_env`].
pub const LOG_JSON_ENV: &str = "GRADEGEN_LOG_JSON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    /// Verbosity when `RUST_LOG` is unset.
    pub level: Level,
    /// Write through libtest's capture, so only failing tests show logs.
    pub test_writer: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: Level::INFO,
            test_writer: false,
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let json = std::env::var(LOG_JSON_ENV)
            .map(|v| matches!(v.trim(), "1" | "true"))
            .unwrap_or(false);
        Self {
            format: if json { LogFormat::Json } else { LogFormat::Compact },
            ..Self::default()
        }
    }

    pub fn for_tests() -> Self {
        Self {
            format: LogFormat::Compact,
            level: Level::DEBUG,
            test_writer: true,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }
}

/// Install the global subscriber. Returns `false` when one is already set.
pub fn init_tracing(config: &TelemetryConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.filter());
    let layer = fmt::layer().with_target(true);
    match (config.format, config.test_writer) {
        (LogFormat::Json, false) => registry.with(layer.json()).try_init(),
        (LogFormat::Json, true) => registry.with(layer.json().with_test_writer()).try_init(),
        (LogFormat::Compact, false) => registry.with(layer.compact()).try_init(),
        (LogFormat::Compact, true) => registry.with(layer.compact().with_test_writer()).try_init(),
    }
    .is_ok()
}

/// Debug-level subscriber for test suites. Safe to call from every test.
pub fn init_test_tracing() -> bool {
    init_tracing(&TelemetryConfig::for_tests())
}
