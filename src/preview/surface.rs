//! Isolated rendering surfaces.
//!
//! Composed documents only ever reach a host page through an `<iframe>` whose
//! sandbox grants script execution and nothing else: no same-origin access, no
//! top-level navigation, no popups. Loading a document replaces the frame
//! wholesale, which discards any global state left by the previous one.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use super::composer::{escape_attribute, PreviewDocument};

/// Sandbox tokens granted to the preview frame.
pub const SANDBOX_POLICY: &str = "allow-scripts";

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Failed to write preview: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait RenderSurface: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load(&self, document: &PreviewDocument) -> Result<(), SurfaceError>;
}

/// Markup for the sandboxed frame hosting `document`.
pub fn iframe_markup(document: &str) -> String {
    format!(
        r#"<iframe title="Live Preview" sandbox="{}" srcdoc="{}" frameborder="0" width="100%" height="100%"></iframe>"#,
        SANDBOX_POLICY,
        escape_attribute(document)
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameContent {
    pub document: Option<PreviewDocument>,
    pub reloads: u64,
}

/// In-process surface for embedding hosts. Each load is published on a watch
/// channel so a UI can redraw its iframe from `host_markup`.
pub struct SandboxedFrame {
    tx: watch::Sender<FrameContent>,
}

impl SandboxedFrame {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FrameContent::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<FrameContent> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> FrameContent {
        self.tx.borrow().clone()
    }

    pub fn reloads(&self) -> u64 {
        self.tx.borrow().reloads
    }

    pub fn host_markup(&self) -> String {
        let content = self.tx.borrow();
        let html = content
            .document
            .as_ref()
            .map(|d| d.html.as_str())
            .unwrap_or("");
        iframe_markup(html)
    }
}

impl Default for SandboxedFrame {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenderSurface for SandboxedFrame {
    fn name(&self) -> &'static str {
        "frame"
    }

    async fn load(&self, document: &PreviewDocument) -> Result<(), SurfaceError> {
        self.tx.send_modify(|content| {
            content.document = Some(document.clone());
            content.reloads += 1;
        });
        debug!(revision = document.revision, "Frame reloaded");
        Ok(())
    }
}

/// Writes a standalone host page around the sandboxed frame.
pub struct FileSurface {
    path: PathBuf,
}

impl FileSurface {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

pub fn host_page(document: &PreviewDocument) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Vista Previa</title>\n</head>\n<body style=\"margin:0;height:100vh\">\n<!-- revision {} composed {} -->\n{}\n</body>\n</html>\n",
        document.revision,
        document.composed_at.to_rfc3339(),
        iframe_markup(&document.html)
    )
}

#[async_trait]
impl RenderSurface for FileSurface {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, document: &PreviewDocument) -> Result<(), SurfaceError> {
        tokio::fs::write(&self.path, host_page(document)).await?;
        debug!(path = %self.path.display(), revision = document.revision, "Preview written");
        Ok(())
    }
}
