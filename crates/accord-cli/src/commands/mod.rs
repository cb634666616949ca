//! CLI subcommand implementations.

pub(crate) mod analyze;
pub(crate) mod calibrate;
pub(crate) mod config;
pub(crate) mod record;
pub(crate) mod review;
pub(crate) mod stats;
pub(crate) mod thresholds;
