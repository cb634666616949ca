//! The boundary to whatever presents suggestions to the user.

use accord_core::Timestamp;
use accord_log::SuggestionOutcome;

use crate::error::LearningResult;
use crate::filter::PatternSuggestion;

/// A user's verdict on one suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDecision {
    /// The suggestion that was shown.
    pub suggestion: PatternSuggestion,
    /// Whether the user accepted it.
    pub accepted: bool,
}

impl ReviewDecision {
    /// Accept `suggestion`.
    #[must_use]
    pub fn accept(suggestion: PatternSuggestion) -> Self {
        Self {
            suggestion,
            accepted: true,
        }
    }

    /// Reject `suggestion`.
    #[must_use]
    pub fn reject(suggestion: PatternSuggestion) -> Self {
        Self {
            suggestion,
            accepted: false,
        }
    }

    /// Feedback record for this decision.
    #[must_use]
    pub fn to_outcome(&self, decided_at: Timestamp) -> SuggestionOutcome {
        SuggestionOutcome::new(
            self.suggestion.category_id(),
            self.accepted,
            self.suggestion.confidence(),
        )
        .with_rule(self.suggestion.proposed_rule.clone())
        .at(decided_at)
    }
}

/// Presents suggestions and collects decisions.
///
/// Implementations may block on user input; the learning core never does.
pub trait SuggestionReviewer {
    /// Decide on each suggestion. Suggestions left out of the result are
    /// treated as undecided and recorded as nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::Review`](crate::LearningError::Review) if the
    /// presentation layer fails.
    fn review(&mut self, suggestions: &[PatternSuggestion]) -> LearningResult<Vec<ReviewDecision>>;
}

impl<F> SuggestionReviewer for F
where
    F: FnMut(&PatternSuggestion) -> bool,
{
    fn review(&mut self, suggestions: &[PatternSuggestion]) -> LearningResult<Vec<ReviewDecision>> {
        Ok(suggestions
            .iter()
            .map(|s| ReviewDecision {
                accepted: self(s),
                suggestion: s.clone(),
            })
            .collect())
    }
}
