//! Accord Telemetry - Logging setup for accord.
//!
//! This crate provides:
//! - [`LogConfig`]: level, per-crate directives, format and output target
//! - [`setup_logging`]: installs a global `tracing` subscriber from a config
//!
//! Log output goes to stderr by default so that command output on stdout
//! (including `--format json`) stays machine-readable.
//!
//! # Example
//!
//! ```rust,no_run
//! use accord_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), accord_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("accord_learning=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
