//! Suggestion presenter state.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::suggestion::{Suggestion, SuggestionBatch, SuggestionFile};
use crate::workspace::FileKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Error suggestions cannot be applied")]
    NotApplicable,
    #[error("Suggestion has no replacement code")]
    NoReplacement,
    #[error("No suggestion at index {0}")]
    NoSuchSuggestion(usize),
}

/// Exactly one of: nothing requested, a request in flight, or a finished batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssistantState {
    #[default]
    Idle,
    Loading { request_id: Uuid },
    Ready(SuggestionBatch),
}

impl AssistantState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AssistantState::Loading { .. })
    }

    pub fn batch(&self) -> Option<&SuggestionBatch> {
        match self {
            AssistantState::Ready(batch) => Some(batch),
            _ => None,
        }
    }
}

/// Target field and full replacement text of an applicable suggestion.
pub fn replacement(suggestion: &Suggestion) -> Result<(FileKind, &str), ApplyError> {
    let target = suggestion.file.target().ok_or(ApplyError::NotApplicable)?;
    let code = suggestion
        .replacement_code
        .as_deref()
        .ok_or(ApplyError::NoReplacement)?;
    Ok((target, code))
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SuggestionCard {
    pub index: usize,
    pub file: SuggestionFile,
    pub title: String,
    pub explanation: String,
    pub code: Option<String>,
    pub applicable: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "cards", rename_all = "lowercase")]
pub enum PanelView {
    Hidden,
    Loading,
    Cards(Vec<SuggestionCard>),
}

#[derive(Debug, Default)]
pub struct SuggestionPanel {
    open: bool,
    state: AssistantState,
}

impl SuggestionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> &AssistantState {
        &self.state
    }

    pub fn batch(&self) -> Option<&SuggestionBatch> {
        self.state.batch()
    }

    /// Opens the panel and drops the previous batch before any response arrives.
    pub fn begin(&mut self, request_id: Uuid) {
        self.open = true;
        self.state = AssistantState::Loading { request_id };
    }

    /// Stores `batch` if `request_id` is the request in flight; anything else is stale.
    pub fn complete(&mut self, request_id: Uuid, batch: SuggestionBatch) -> bool {
        match &self.state {
            AssistantState::Loading { request_id: current } if *current == request_id => {
                self.state = AssistantState::Ready(batch);
                true
            }
            _ => {
                debug!(%request_id, "Discarding stale analysis response");
                false
            }
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn suggestion(&self, index: usize) -> Result<&Suggestion, ApplyError> {
        self.batch()
            .and_then(|batch| batch.get(index))
            .ok_or(ApplyError::NoSuchSuggestion(index))
    }

    pub fn view(&self) -> PanelView {
        if !self.open {
            return PanelView::Hidden;
        }
        match &self.state {
            AssistantState::Loading { .. } => PanelView::Loading,
            AssistantState::Idle => PanelView::Cards(Vec::new()),
            AssistantState::Ready(batch) => PanelView::Cards(
                batch
                    .iter()
                    .enumerate()
                    .map(|(index, s)| SuggestionCard {
                        index,
                        file: s.file,
                        title: s.title.clone(),
                        explanation: s.explanation.clone(),
                        code: s.replacement_code.clone(),
                        applicable: s.is_applicable(),
                    })
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelView::Hidden => Ok(()),
            PanelView::Loading => {
                writeln!(f, "Analyzing your code...")?;
                writeln!(
                    f,
                    "The assistant is looking for accessibility, performance and best-practice improvements."
                )
            }
            PanelView::Cards(cards) if cards.is_empty() => writeln!(f, "No suggestions."),
            PanelView::Cards(cards) => {
                for card in cards {
                    writeln!(f, "[{}] {} - {}", card.index, card.file, card.title)?;
                    writeln!(f, "    {}", card.explanation)?;
                    if let Some(code) = &card.code {
                        writeln!(f, "    Suggested code:")?;
                        for line in code.lines() {
                            writeln!(f, "      {}", line)?;
                        }
                    }
                    if card.applicable {
                        writeln!(f, "    (apply with index {})", card.index)?;
                    }
                }
                Ok(())
            }
        }
    }
}
