//! Review findings as returned by the completion service.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::llm::{LlmError, LlmResult};
use crate::workspace::FileKind;

pub const FAILURE_TITLE: &str = "Failed to analyze code";
pub const FAILURE_FALLBACK: &str = "There was an error communicating with the AI assistant. \
Please check the logs for details and try again.";

/// Which source a finding is about. `Error` marks the synthetic failure card.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionFile {
    #[serde(rename = "HTML", alias = "html", alias = "Html")]
    Html,
    #[serde(rename = "CSS", alias = "css", alias = "Css")]
    Css,
    #[serde(rename = "JavaScript", alias = "javascript", alias = "Javascript", alias = "JS", alias = "js")]
    JavaScript,
    #[serde(rename = "Error", alias = "error")]
    Error,
}

impl SuggestionFile {
    pub const VARIANTS: [&'static str; 4] = ["HTML", "CSS", "JavaScript", "Error"];

    /// Buffer field a replacement would overwrite.
    pub fn target(&self) -> Option<FileKind> {
        match self {
            SuggestionFile::Html => Some(FileKind::Html),
            SuggestionFile::Css => Some(FileKind::Css),
            SuggestionFile::JavaScript => Some(FileKind::JavaScript),
            SuggestionFile::Error => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SuggestionFile::Html => "HTML",
            SuggestionFile::Css => "CSS",
            SuggestionFile::JavaScript => "JavaScript",
            SuggestionFile::Error => "Error",
        }
    }
}

impl From<FileKind> for SuggestionFile {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Html => SuggestionFile::Html,
            FileKind::Css => SuggestionFile::Css,
            FileKind::JavaScript => SuggestionFile::JavaScript,
        }
    }
}

impl fmt::Display for SuggestionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub file: SuggestionFile,
    #[serde(rename = "suggestion")]
    pub title: String,
    pub explanation: String,
    /// Full replacement for the target file, never a patch.
    #[serde(rename = "suggestedCode", default, skip_serializing_if = "Option::is_none")]
    pub replacement_code: Option<String>,
}

impl Suggestion {
    /// The card shown when analysis fails.
    pub fn failure(message: &str) -> Self {
        let explanation = if message.trim().is_empty() {
            FAILURE_FALLBACK.to_string()
        } else {
            message.to_string()
        };
        Self {
            file: SuggestionFile::Error,
            title: FAILURE_TITLE.to_string(),
            explanation,
            replacement_code: None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        self.file.target().is_some() && self.replacement_code.is_some()
    }
}

/// Findings of one analysis request, in service order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct SuggestionBatch(Vec<Suggestion>);

impl SuggestionBatch {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self(suggestions)
    }

    pub fn failure(message: &str) -> Self {
        Self(vec![Suggestion::failure(message)])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Suggestion> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Suggestion> {
        self.0.iter()
    }

    /// True only for the synthetic card produced when analysis itself failed.
    pub fn is_failure(&self) -> bool {
        match self.0.as_slice() {
            [only] => only.file == SuggestionFile::Error && only.title == FAILURE_TITLE,
            _ => false,
        }
    }
}

impl<'a> IntoIterator for &'a SuggestionBatch {
    type Item = &'a Suggestion;
    type IntoIter = std::slice::Iter<'a, Suggestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Decodes the model's answer. The service is asked for bare JSON, but a
/// Markdown fence around it is tolerated.
pub fn parse_suggestions(text: &str) -> LlmResult<SuggestionBatch> {
    let json = extract_json_array(text)?;
    let mut suggestions: Vec<Suggestion> = serde_json::from_str(json).map_err(|e| {
        LlmError::MalformedPayload(format!("Failed to parse suggestions as JSON: {}", e))
    })?;

    for suggestion in &mut suggestions {
        if suggestion
            .replacement_code
            .as_deref()
            .map(|code| code.trim().is_empty())
            .unwrap_or(false)
        {
            suggestion.replacement_code = None;
        }
    }

    Ok(SuggestionBatch(suggestions))
}

fn json_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("fence pattern is valid")
    })
}

fn extract_json_array(response: &str) -> LlmResult<&str> {
    let trimmed = response.trim();

    if trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    if let Some(inner) = json_fence().captures(trimmed).and_then(|c| c.get(1)) {
        return Ok(inner.as_str());
    }

    Err(LlmError::MalformedPayload(
        "No JSON array found in response".to_string(),
    ))
}
