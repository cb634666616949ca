//! Prelude module - commonly used types for convenient import.
//!
//! Use `use accord_learning::prelude::*;` to import all essential types.

// Errors
pub use crate::{LearningError, LearningResult};

// Detection
pub use crate::{DetectedPattern, PatternCatalog, PatternDetector, PatternSuggestion, SuggestionFilter};

// Calibration
pub use crate::{MetaCalibrator, ThresholdConfig, ThresholdStore};

// Orchestration
pub use crate::{ConfiguredRules, LearningEngine, ReviewDecision, RuleLookup, SuggestionReviewer};
