//! Shared structs.

use std::sync::Arc;
use uuid::Uuid;

use crate::assistant::{SuggestionBatch, SuggestionRequestor};
use crate::workspace::SourceBuffer;

/// An analysis that has been started but not yet sent. Runs without borrowing
/// the session, so a host can release its lock while the request is in flight.
///
/// Keep it alive until the batch has been handed to `finish_analysis`; once it
/// is dropped the session treats the request as abandoned.
pub struct PendingAnalysis {
    pub request_id: Uuid,
    pub(crate) snapshot: SourceBuffer,
    pub(crate) requestor: Arc<SuggestionRequestor>,
    pub(crate) _liveness: Arc<()>,
}

impl PendingAnalysis {
    pub async fn run(&self) -> (Uuid, SuggestionBatch) {
        let batch = self.requestor.analyze(&self.snapshot).await;
        (self.request_id, batch)
    }
}
