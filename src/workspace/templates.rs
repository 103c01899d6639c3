//! Read-only catalog of starter templates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
    #[error("Template catalog is empty")]
    Empty,
    #[error("Duplicate template id: {0}")]
    DuplicateId(String),
    #[error("Template id cannot be empty")]
    EmptyId,
    #[error("Failed to parse template catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to read template catalog: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub html: String,
    pub css: String,
    pub js: String,
}

/// What a host needs to draw the template picker.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<Template>,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(include_str!("./templates.toml"))
    }

    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::new(file.templates)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Loading template catalog");
        Self::from_toml_str(&source)
    }

    pub fn new(templates: Vec<Template>) -> Result<Self, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for template in &templates {
            if template.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(template.id.as_str()) {
                return Err(CatalogError::DuplicateId(template.id.clone()));
            }
        }

        Ok(Self { templates })
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Template, CatalogError> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CatalogError::UnknownTemplate(id.to_string()))
    }

    /// The template a fresh session starts from.
    pub fn default_template(&self) -> &Template {
        // `new` rejects empty catalogs
        &self.templates[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn summaries(&self) -> Vec<TemplateSummary> {
        self.templates
            .iter()
            .map(|t| TemplateSummary {
                id: t.id.clone(),
                name: t.name.clone(),
            })
            .collect()
    }
}
