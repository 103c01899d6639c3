//! Editable sources and the templates that seed them.

pub mod buffer;
pub mod templates;

pub use buffer::{FileKind, SourceBuffer};
pub use templates::{CatalogError, Template, TemplateCatalog, TemplateSummary};

#[cfg(test)]
mod tests;
