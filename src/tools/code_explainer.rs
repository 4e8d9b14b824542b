//! Code explanation tool

use serde_json::{Value, json};
use std::sync::Arc;

use super::{ParseFailure, ask, text_field};
use crate::agent::Tool;
use crate::payload;
use crate::provider::CompletionProvider;

const TEMPERATURE: f32 = 0.3;

const SUMMARY_MARKER: &str = "1. 📌 **High-Level Summary**";
const LINES_MARKER: &str = "2. 🔍 **Line-by-Line Explanation**";
const IMPROVEMENTS_MARKER: &str = "3. ✅ **Possible Improvements or Best Practices**";

pub struct CodeExplainerTool {
    provider: Arc<dyn CompletionProvider>,
}

impl CodeExplainerTool {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Explanation {
    pub summary: String,
    pub line_by_line: String,
    pub recommendations: String,
}

pub fn build_prompt(code: &str, language: &str, depth: &str) -> String {
    format!(
        r#"You are an expert software engineer.

Explain the following code in {language} at a {depth} level of detail.

Code:
{code}

Your output must follow this format:

{SUMMARY_MARKER}
{LINES_MARKER}
{IMPROVEMENTS_MARKER}

Only output the explanation. Don't restate the code."#
    )
}

/// Split the three numbered sections. The line-by-line marker is mandatory,
/// the improvements section may be missing.
pub fn parse_sections(text: &str) -> Result<Explanation, ParseFailure> {
    let (head, rest) = text
        .split_once(LINES_MARKER)
        .ok_or(ParseFailure("missing line-by-line section"))?;

    let summary = head.rsplit(SUMMARY_MARKER).next().unwrap_or(head);
    let (line_by_line, recommendations) = rest.split_once(IMPROVEMENTS_MARKER).unwrap_or((rest, ""));

    Ok(Explanation {
        summary: summary.trim().to_string(),
        line_by_line: line_by_line.trim().to_string(),
        recommendations: recommendations.trim().to_string(),
    })
}

impl Tool for CodeExplainerTool {
    fn call(&self, input: &Value) -> Value {
        let Some(code) = text_field(input, "code", "code") else {
            return payload::error("Missing 'code' input.");
        };
        let language = text_field(input, "language", "code").unwrap_or_else(|| "Python".to_string());
        let depth = text_field(input, "depth", "code").unwrap_or_else(|| "detailed".to_string());

        let prompt = build_prompt(&code, &language, &depth);
        let output = match ask(self.provider.as_ref(), "code_explainer", &prompt, TEMPERATURE) {
            Ok(text) => text,
            Err(error) => return error,
        };

        let explanation = parse_sections(&output).unwrap_or_else(|e| {
            log::warn!("Code explanation fallback: {}", e);
            Explanation {
                summary: output.trim().to_string(),
                ..Explanation::default()
            }
        });

        json!({
            "summary": explanation.summary,
            "line_by_line": explanation.line_by_line,
            "recommendations": explanation.recommendations,
        })
    }
}
