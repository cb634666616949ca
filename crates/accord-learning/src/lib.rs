//! Accord Learning - Turning approval history into permission rules.
//!
//! This crate provides:
//! - [`PatternCatalog`]: the fixed table of pattern categories
//! - [`PatternDetector`]: matches a window of approvals against the catalog
//! - [`scorer`]: bounded confidence from frequency, consistency and recency
//! - [`SuggestionFilter`]: thresholds, de-duplication against configured rules
//! - [`MetaCalibrator`]: moves thresholds based on accept/reject feedback
//! - [`LearningEngine`]: one full cycle over the on-disk logs
//!
//! # Data Flow
//!
//! ```text
//! ApprovalLog -> PatternDetector -> SuggestionFilter -> SuggestionReviewer
//!                      ^                                       |
//!                ThresholdConfig <- MetaCalibrator <- OutcomeLog
//! ```
//!
//! Thresholds are plain values: load them with a [`ThresholdStore`], pass them
//! into a run, and save whatever calibration hands back.
//!
//! # Example
//!
//! ```
//! use accord_learning::{PatternCatalog, PatternDetector, SuggestionFilter, ThresholdConfig};
//! use accord_log::ApprovalEntry;
//! use chrono::Utc;
//! use std::collections::HashSet;
//!
//! let entries = vec![
//!     ApprovalEntry::new("git status", "s1"),
//!     ApprovalEntry::new("git log", "s1"),
//!     ApprovalEntry::new("git diff", "s1"),
//! ];
//!
//! let thresholds = ThresholdConfig::default();
//! let detector = PatternDetector::new(PatternCatalog::builtin(), thresholds);
//! let patterns = detector.detect(&entries, Utc::now());
//!
//! let suggestions = SuggestionFilter::new(thresholds).apply(&patterns, &HashSet::<String>::new());
//! assert_eq!(suggestions[0].pattern.category_id, "git_read_only");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod calibrator;
pub mod catalog;
pub mod detector;
pub mod engine;
/// Error types and results for the learning module.
pub mod error;
pub mod filter;
pub mod review;
pub mod rule;
pub mod rules;
pub mod scorer;
pub mod threshold;

pub use calibrator::{Adjustment, CalibrationPolicy, CalibrationReport, MetaCalibrator};
pub use catalog::{PatternCatalog, PatternCategory};
pub use detector::{DetectedPattern, Detection, PatternDetector};
pub use engine::{AnalysisReport, LearningEngine, WindowStats};
pub use error::{LearningError, LearningResult};
pub use filter::{PatternSuggestion, SuggestionFilter};
pub use review::{ReviewDecision, SuggestionReviewer};
pub use rule::ProposedRule;
pub use rules::{ConfiguredRules, RuleLookup};
pub use scorer::ConfidenceBreakdown;
pub use threshold::{ThresholdConfig, ThresholdStore};
