//! Mock implementations for testing.

use std::collections::{BTreeSet, VecDeque};

use accord_learning::{
    LearningError, LearningResult, PatternSuggestion, ReviewDecision, SuggestionReviewer,
};

/// A reviewer that answers from a script instead of prompting.
///
/// Answers come from, in order: the queued responses, the accepted
/// category set, then the default. Every suggestion shown is captured.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReviewer {
    /// Queued answers, consumed one per suggestion.
    responses: VecDeque<bool>,
    /// Categories accepted once the queue is empty.
    accept_categories: BTreeSet<String>,
    /// Answer when nothing else applies.
    default_accept: bool,
    /// Fail the next review call.
    fail_with: Option<String>,
    /// Category ids of every suggestion shown, in order.
    shown: Vec<String>,
}

impl ScriptedReviewer {
    /// Accept everything.
    #[must_use]
    pub fn accept_all() -> Self {
        Self {
            default_accept: true,
            ..Self::default()
        }
    }

    /// Reject everything.
    #[must_use]
    pub fn reject_all() -> Self {
        Self::default()
    }

    /// Answer with `responses` in order, then reject.
    #[must_use]
    pub fn scripted(responses: impl IntoIterator<Item = bool>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Accept only suggestions from `categories`.
    #[must_use]
    pub fn accepting<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accept_categories: categories.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Fail the next review with `message`, as a broken terminal would.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Category ids of every suggestion shown so far.
    #[must_use]
    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    fn decide(&mut self, suggestion: &PatternSuggestion) -> bool {
        if let Some(answer) = self.responses.pop_front() {
            return answer;
        }
        self.accept_categories.contains(suggestion.category_id()) || self.default_accept
    }
}

impl SuggestionReviewer for ScriptedReviewer {
    fn review(&mut self, suggestions: &[PatternSuggestion]) -> LearningResult<Vec<ReviewDecision>> {
        if let Some(message) = self.fail_with.take() {
            return Err(LearningError::Review(message));
        }
        Ok(suggestions
            .iter()
            .map(|s| {
                self.shown.push(s.category_id().to_owned());
                let accepted = self.decide(s);
                ReviewDecision {
                    suggestion: s.clone(),
                    accepted,
                }
            })
            .collect())
    }
}
