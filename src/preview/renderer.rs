//! Debounced recomposition of the preview document.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::composer::{compose_document, PreviewDocument};
use super::debounce::Debouncer;
use super::surface::{RenderSurface, SurfaceError};
use crate::workspace::SourceBuffer;

/// Quiet period after the last edit before the surface is reloaded.
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(250);

pub struct PreviewRenderer {
    surface: Arc<dyn RenderSurface>,
    debouncer: Debouncer,
    revision: Arc<AtomicU64>,
    renders: Arc<AtomicU64>,
}

impl PreviewRenderer {
    pub fn new(surface: Arc<dyn RenderSurface>) -> Self {
        Self {
            surface,
            debouncer: Debouncer::new(PREVIEW_DEBOUNCE),
            revision: Arc::new(AtomicU64::new(0)),
            renders: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Restarts the quiet period with a snapshot of `buffer`. A snapshot
    /// superseded before the period elapses is never composed.
    pub fn schedule(&mut self, buffer: &SourceBuffer) {
        let snapshot = buffer.clone();
        let surface = Arc::clone(&self.surface);
        let revision = Arc::clone(&self.revision);
        let renders = Arc::clone(&self.renders);

        self.debouncer.schedule(async move {
            if let Err(e) = render(surface.as_ref(), &snapshot, &revision, &renders).await {
                warn!(surface = surface.name(), error = %e, "Preview render failed");
            }
        });
    }

    /// Drops any pending recomposition and renders `buffer` right away.
    pub async fn flush(&mut self, buffer: &SourceBuffer) -> Result<PreviewDocument, SurfaceError> {
        self.debouncer.cancel();
        render(self.surface.as_ref(), buffer, &self.revision, &self.renders).await
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Number of documents delivered to the surface so far.
    pub fn renders(&self) -> u64 {
        self.renders.load(Ordering::SeqCst)
    }
}

async fn render(
    surface: &dyn RenderSurface,
    buffer: &SourceBuffer,
    revision: &AtomicU64,
    renders: &AtomicU64,
) -> Result<PreviewDocument, SurfaceError> {
    let document = PreviewDocument {
        revision: revision.fetch_add(1, Ordering::SeqCst) + 1,
        html: compose_document(buffer),
        composed_at: Utc::now(),
    };

    surface.load(&document).await?;
    renders.fetch_add(1, Ordering::SeqCst);

    debug!(
        surface = surface.name(),
        revision = document.revision,
        bytes = document.html.len(),
        "Preview composed"
    );
    Ok(document)
}
