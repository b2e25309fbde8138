//! # Ledger Testkit Telemetry
//!
//! Structured logging for the testkit crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lt_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_tracing(&config).expect("Failed to init tracing");
//! ```
//!
//! Inside tests use [`init_test_tracing`], which can be called from every test
//! without tripping over an already-installed subscriber.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LT_SERVICE_NAME` | `ledger-testkit` | Name on the startup event |
//! | `LT_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `LT_JSON_LOGS` | `false` | Emit JSON lines |

#![warn(missing_docs)]

mod config;
mod tracing_setup;

use std::sync::Once;

pub use config::TelemetryConfig;
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    /// The filter directive did not parse.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

static TEST_TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per process.
///
/// Later calls are no-ops, and so is a failure caused by some other
/// subscriber having been installed first.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let _ = init_tracing(&TelemetryConfig::for_tests());
    });
}
