//! Builds the single document handed to the rendering surface.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workspace::SourceBuffer;

/// A composed document ready for an isolated surface.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PreviewDocument {
    pub revision: u64,
    pub html: String,
    pub composed_at: DateTime<Utc>,
}

/// User code is embedded as-is; nothing is validated or escaped.
pub fn compose_document(buffer: &SourceBuffer) -> String {
    format!(
        "<html>\n<body>{}</body>\n<style>{}</style>\n<script>{}</script>\n</html>\n",
        buffer.markup(),
        buffer.style(),
        buffer.script()
    )
}

/// Escapes text for use inside a double-quoted HTML attribute.
pub fn escape_attribute(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + raw.len() / 8);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
