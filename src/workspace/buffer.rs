//! The three editable code blobs plus template bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::templates::Template;

/// One of the three editable sources.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "CSS")]
    Css,
    JavaScript,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Html, FileKind::Css, FileKind::JavaScript];

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Html => "HTML",
            FileKind::Css => "CSS",
            FileKind::JavaScript => "JavaScript",
        }
    }

    /// Markdown fence language used when quoting this source in a prompt.
    pub fn fence_language(&self) -> &'static str {
        match self {
            FileKind::Html => "html",
            FileKind::Css => "css",
            FileKind::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(FileKind::Html),
            "css" => Ok(FileKind::Css),
            "javascript" | "js" => Ok(FileKind::JavaScript),
            other => Err(format!("Unknown source file: {}", other)),
        }
    }
}

/// Session-local editor state.
///
/// `active_template_id` tracks the last template loaded. Hand edits do not
/// re-sync it; `is_edited` tells whether the buffer still matches that template.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    markup: String,
    style: String,
    script: String,
    active_template_id: String,
    edited: bool,
}

impl SourceBuffer {
    pub fn from_template(template: &Template) -> Self {
        Self {
            markup: template.html.clone(),
            style: template.css.clone(),
            script: template.js.clone(),
            active_template_id: template.id.clone(),
            edited: false,
        }
    }

    /// Overwrites all three sources at once. Prior content is discarded, never merged.
    pub fn load_template(&mut self, template: &Template) {
        *self = Self::from_template(template);
    }

    pub fn set(&mut self, kind: FileKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            FileKind::Html => self.markup = text,
            FileKind::Css => self.style = text,
            FileKind::JavaScript => self.script = text,
        }
        self.edited = true;
    }

    pub fn get(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Html => &self.markup,
            FileKind::Css => &self.style,
            FileKind::JavaScript => &self.script,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn active_template_id(&self) -> &str {
        &self.active_template_id
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }
}
