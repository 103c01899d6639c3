//! Packages the sources into a review request and turns any outcome into a batch.

use std::sync::Arc;
use tracing::{error, info, instrument};

use super::prompt::{build_review_prompt, response_schema};
use super::suggestion::{parse_suggestions, SuggestionBatch};
use crate::llm::{CompletionRequest, CompletionService, LlmResult};
use crate::workspace::SourceBuffer;

pub struct SuggestionRequestor {
    service: Arc<dyn CompletionService>,
    model: String,
}

impl SuggestionRequestor {
    pub fn new(service: Arc<dyn CompletionService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
        }
    }

    pub fn build_request(&self, buffer: &SourceBuffer) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: build_review_prompt(buffer),
            response_schema: response_schema(),
        }
    }

    /// One review round trip. No retry: the user re-triggers analysis.
    #[instrument(skip_all, fields(service = self.service.name(), model = %self.model))]
    pub async fn request_suggestions(&self, buffer: &SourceBuffer) -> LlmResult<SuggestionBatch> {
        let request = self.build_request(buffer);
        let text = self.service.complete(&request).await?;
        parse_suggestions(&text)
    }

    /// Like `request_suggestions`, but every failure becomes a single error card.
    pub async fn analyze(&self, buffer: &SourceBuffer) -> SuggestionBatch {
        match self.request_suggestions(buffer).await {
            Ok(batch) => {
                info!(count = batch.len(), "Code analysis completed");
                batch
            }
            Err(e) => {
                error!(error = %e, "Error analyzing code with AI");
                SuggestionBatch::failure(&e.to_string())
            }
        }
    }
}
