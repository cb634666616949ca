//! Accord Test - Shared test utilities for accord.
//!
//! This crate provides fixtures, a temporary accord home, and a scripted
//! reviewer that can be used across accord crates as a dev-dependency.
//!
//! # Usage
//!
//! ```rust,ignore
//! use accord_test::{ScriptedReviewer, TestHome, approval, reference_now};
//!
//! let home = TestHome::new();
//! home.record(&[approval("git status", 3), approval("git log", 1)]);
//!
//! let engine = home.engine();
//! let report = engine
//!     .analyze(home.thresholds(), None, &home.configured_rules(), reference_now())
//!     .unwrap();
//! let mut reviewer = ScriptedReviewer::accept_all();
//! engine.review(&report.suggestions, &mut reviewer, reference_now()).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
