//! Live preview: compose the three sources into one document and push it,
//! debounced, to a sandboxed surface.

pub mod composer;
pub mod debounce;
pub mod renderer;
pub mod surface;

pub use composer::{compose_document, PreviewDocument};
pub use debounce::Debouncer;
pub use renderer::{PreviewRenderer, PREVIEW_DEBOUNCE};
pub use surface::{FileSurface, FrameContent, RenderSurface, SandboxedFrame, SurfaceError};
