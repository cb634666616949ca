//! Prelude module - commonly used test helpers.
//!
//! Use `use accord_test::prelude::*;` in test files.

pub use crate::fixtures::{
    TEST_SESSION, approval, approval_in, approvals, days_ago, outcomes, reference_now,
    test_thresholds,
};
pub use crate::harness::{TestHome, setup_test_logging};
pub use crate::mocks::ScriptedReviewer;
