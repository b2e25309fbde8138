//! Subscriber settings read from the environment.

use std::env;

const DEFAULT_SERVICE: &str = "ledger-testkit";
const DEFAULT_LEVEL: &str = "info";
const TEST_LEVEL: &str = "warn";

/// Settings for [`init_tracing`](crate::init_tracing).
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Reported on the startup event.
    pub service_name: String,
    /// A level (`debug`) or any `EnvFilter` directive (`lt_04=trace,warn`).
    pub log_level: String,
    /// JSON lines instead of human-readable output.
    pub json_logs: bool,
    /// Route output through libtest capture.
    pub test_writer: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE.to_string(),
            log_level: DEFAULT_LEVEL.to_string(),
            json_logs: false,
            test_writer: false,
        }
    }
}

impl TelemetryConfig {
    /// `LT_SERVICE_NAME`, `LT_LOG_LEVEL` (falling back to `RUST_LOG`) and
    /// `LT_JSON_LOGS` override the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: env::var("LT_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: level_from_env().unwrap_or(defaults.log_level),
            json_logs: env::var("LT_JSON_LOGS").is_ok_and(|v| is_truthy(&v)),
            test_writer: false,
        }
    }

    /// Like [`from_env`](Self::from_env), but only warnings unless a level is
    /// set explicitly, and output is captured per test.
    pub fn for_tests() -> Self {
        Self {
            log_level: level_from_env().unwrap_or_else(|| TEST_LEVEL.to_string()),
            test_writer: true,
            ..Self::from_env()
        }
    }
}

fn level_from_env() -> Option<String> {
    env::var("LT_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")).ok()
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
