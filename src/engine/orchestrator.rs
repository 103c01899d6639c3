//! High-level coordinator: edits → preview, analysis → suggestions → apply-back.

use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::assistant::{replacement, ApplyError, AssistantState, Suggestion, SuggestionBatch, SuggestionPanel, SuggestionRequestor};
use crate::engine::types::PendingAnalysis;
use crate::llm::CompletionService;
use crate::preview::{PreviewDocument, PreviewRenderer, RenderSurface, SurfaceError};
use crate::workspace::{CatalogError, FileKind, SourceBuffer, TemplateCatalog};

/// One editor session. Every write to the sources goes through here and
/// re-arms the debounced preview; must be driven from within a tokio runtime.
pub struct Playground {
    buffer: SourceBuffer,
    catalog: Arc<TemplateCatalog>,
    preview: PreviewRenderer,
    panel: SuggestionPanel,
    requestor: Arc<SuggestionRequestor>,
    in_flight: Weak<()>,
}

/// Explanation on the card left behind by a request whose caller went away.
pub const ABANDONED_ANALYSIS: &str = "The analysis was cancelled before the assistant answered. Please try again.";

impl Playground {
    pub fn new(
        catalog: Arc<TemplateCatalog>,
        surface: Arc<dyn RenderSurface>,
        service: Arc<dyn CompletionService>,
        model: impl Into<String>,
    ) -> Self {
        let buffer = SourceBuffer::from_template(catalog.default_template());
        let mut preview = PreviewRenderer::new(surface);
        preview.schedule(&buffer);

        Self {
            buffer,
            catalog,
            preview,
            panel: SuggestionPanel::new(),
            requestor: Arc::new(SuggestionRequestor::new(service, model)),
            in_flight: Weak::new(),
        }
    }

    pub fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn panel(&self) -> &SuggestionPanel {
        &self.panel
    }

    pub fn preview(&self) -> &PreviewRenderer {
        &self.preview
    }

    pub fn edit(&mut self, kind: FileKind, text: impl Into<String>) {
        self.buffer.set(kind, text);
        self.preview.schedule(&self.buffer);
    }

    pub fn select_template(&mut self, id: &str) -> Result<(), CatalogError> {
        let template = self.catalog.find_by_id(id)?;
        self.buffer.load_template(template);
        self.preview.schedule(&self.buffer);
        info!(template = id, "Template loaded");
        Ok(())
    }

    /// Starts an analysis, or returns `None` while one is already loading.
    pub fn begin_analysis(&mut self) -> Option<PendingAnalysis> {
        self.settle_abandoned_analysis();
        if self.panel.state().is_loading() {
            debug!("Analysis already in flight");
            return None;
        }

        let request_id = Uuid::new_v4();
        let liveness = Arc::new(());
        self.in_flight = Arc::downgrade(&liveness);
        self.panel.begin(request_id);
        Some(PendingAnalysis {
            request_id,
            snapshot: self.buffer.clone(),
            requestor: Arc::clone(&self.requestor),
            _liveness: liveness,
        })
    }

    /// Fails a loading request whose `PendingAnalysis` was dropped before it
    /// finished, so the panel shows an error card instead of loading forever.
    pub fn settle_abandoned_analysis(&mut self) -> bool {
        let request_id = match self.panel.state() {
            AssistantState::Loading { request_id } if self.in_flight.upgrade().is_none() => *request_id,
            _ => return false,
        };
        warn!(%request_id, "Analysis abandoned before completion");
        self.panel
            .complete(request_id, SuggestionBatch::failure(ABANDONED_ANALYSIS))
    }

    /// Stores the batch if it answers the current request. Returns whether it did.
    pub fn finish_analysis(&mut self, request_id: Uuid, batch: SuggestionBatch) -> bool {
        self.panel.complete(request_id, batch)
    }

    #[instrument(skip(self))]
    pub async fn analyze(&mut self) -> Option<&SuggestionBatch> {
        let pending = self.begin_analysis()?;
        let (request_id, batch) = pending.run().await;
        self.finish_analysis(request_id, batch);
        self.panel.batch()
    }

    /// Replaces the target source in full and closes the panel.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> Result<FileKind, ApplyError> {
        let (kind, code) = replacement(suggestion)?;
        self.buffer.set(kind, code);
        self.preview.schedule(&self.buffer);
        self.panel.close();
        info!(file = %kind, "Suggestion applied");
        Ok(kind)
    }

    pub fn apply_at(&mut self, index: usize) -> Result<FileKind, ApplyError> {
        let suggestion = self.panel.suggestion(index)?.clone();
        self.apply_suggestion(&suggestion)
    }

    pub fn close_assistant(&mut self) {
        self.panel.close();
    }

    /// Free-form instructions are accepted and logged but not acted on.
    pub fn submit_prompt(&self, prompt: &str) -> bool {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return false;
        }
        info!(prompt, "AI prompt submitted");
        true
    }

    pub async fn flush_preview(&mut self) -> Result<PreviewDocument, SurfaceError> {
        self.preview.flush(&self.buffer).await
    }
}
