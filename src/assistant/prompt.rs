//! Review instruction and the output schema declared to the service.

use serde_json::{json, Value};

use super::suggestion::SuggestionFile;
use crate::workspace::{FileKind, SourceBuffer};

pub fn build_review_prompt(buffer: &SourceBuffer) -> String {
    let mut prompt = String::from(
        "Analyze the following code (HTML, CSS, JavaScript) for a web component. \
Provide suggestions to improve accessibility, performance, and best practices. \
Also, identify any potential errors.

For each suggestion that involves a code change, you MUST provide the complete, corrected code \
for that specific file (HTML, CSS, or JavaScript) in the \"suggestedCode\" field. \
If a suggestion is conceptual and doesn't have a direct code change, omit the \"suggestedCode\" field.
",
    );

    for kind in FileKind::ALL {
        prompt.push_str(&format!(
            "\n{}:\n```{}\n{}\n```\n",
            kind.label(),
            kind.fence_language(),
            buffer.get(kind)
        ));
    }

    prompt.push_str(
        "\nReturn the suggestions as a JSON array. Each object in the array should have four properties: \
\"file\" (either \"HTML\", \"CSS\", \"JavaScript\", or \"Error\"), \
\"suggestion\" (a brief title for the suggestion), \
\"explanation\" (a detailed explanation of the suggestion and how to fix it), \
and an optional \"suggestedCode\" containing the full corrected code block.",
    );

    prompt
}

/// Array of findings; `suggestedCode` is the only optional property.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "file": {
                    "type": "STRING",
                    "format": "enum",
                    "enum": SuggestionFile::VARIANTS,
                    "description": "The file type, can be HTML, CSS, JavaScript, or Error."
                },
                "suggestion": {
                    "type": "STRING",
                    "description": "A brief title for the suggestion."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "A detailed explanation of the suggestion."
                },
                "suggestedCode": {
                    "type": "STRING",
                    "description": "The complete, corrected code block for the specified file."
                }
            },
            "required": ["file", "suggestion", "explanation"],
            "propertyOrdering": ["file", "suggestion", "explanation", "suggestedCode"]
        }
    })
}
