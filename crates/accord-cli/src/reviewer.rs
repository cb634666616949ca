//! Interactive review of suggestions in the terminal.

use accord_learning::{
    LearningError, LearningResult, PatternSuggestion, ReviewDecision, SuggestionReviewer,
};
use dialoguer::Confirm;

use crate::commands::analyze::render_suggestion;

/// Asks accept/reject for each suggestion on the terminal.
///
/// Prompts and suggestion details go to stderr.
pub(crate) struct TerminalReviewer;

impl SuggestionReviewer for TerminalReviewer {
    fn review(&mut self, suggestions: &[PatternSuggestion]) -> LearningResult<Vec<ReviewDecision>> {
        let mut decisions = Vec::with_capacity(suggestions.len());
        for (i, suggestion) in suggestions.iter().enumerate() {
            eprintln!("{}", render_suggestion(i.saturating_add(1), suggestion));
            let accepted = Confirm::new()
                .with_prompt("Add this rule?")
                .default(false)
                .interact()
                .map_err(|e| LearningError::Review(e.to_string()))?;
            decisions.push(if accepted {
                ReviewDecision::accept(suggestion.clone())
            } else {
                ReviewDecision::reject(suggestion.clone())
            });
            eprintln!();
        }
        Ok(decisions)
    }
}
