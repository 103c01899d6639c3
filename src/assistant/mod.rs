//! AI code review: prompt, request, parse, and present suggestions that can be
//! applied back to the sources.

pub mod panel;
pub mod prompt;
pub mod requestor;
pub mod suggestion;

pub use panel::{replacement, ApplyError, AssistantState, PanelView, SuggestionCard, SuggestionPanel};
pub use prompt::{build_review_prompt, response_schema};
pub use requestor::SuggestionRequestor;
pub use suggestion::{parse_suggestions, Suggestion, SuggestionBatch, SuggestionFile, FAILURE_TITLE};
