//! Builtin tools
//!
//! Manifest entries reference tools by locator (`tools.email`). The table
//! below is the only way a locator becomes code; the legacy
//! `agents.<name>.agent` module paths are accepted as aliases so existing
//! manifests keep working.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::agent::Tool;
use crate::error::SwitchboardError;
use crate::payload;
use crate::provider::{CompletionParams, CompletionProvider};

pub mod code_explainer;
pub mod doc_qa;
pub mod email;
pub mod resume;
pub mod slides;
pub mod sql;

type ToolConstructor = fn(Arc<dyn CompletionProvider>) -> Box<dyn Tool>;

static BUILTIN_TOOLS: Lazy<IndexMap<&'static str, ToolConstructor>> = Lazy::new(|| {
    let mut table: IndexMap<&'static str, ToolConstructor> = IndexMap::new();
    table.insert("tools.email", |p| Box::new(email::EmailTool::new(p)));
    table.insert("tools.code_explainer", |p| Box::new(code_explainer::CodeExplainerTool::new(p)));
    table.insert("tools.sql_generator", |p| Box::new(sql::SqlGeneratorTool::new(p)));
    table.insert("tools.slide_generator", |p| Box::new(slides::SlideGeneratorTool::new(p)));
    table.insert("tools.resume_analyzer", |p| Box::new(resume::ResumeAnalyzerTool::new(p)));
    table.insert("tools.doc_qa", |p| Box::new(doc_qa::DocQaTool::new(p)));
    table
});

static ALIASES: &[(&str, &str)] = &[
    ("agents.email_agent.agent", "tools.email"),
    ("agents.code_explainer_agent.agent", "tools.code_explainer"),
    ("agents.sql_generator_agent.agent", "tools.sql_generator"),
    ("agents.slide_generator_agent.agent", "tools.slide_generator"),
    ("agents.resume_analyzer_agent.agent", "tools.resume_analyzer"),
    ("agents.doc_qa_agent.agent", "tools.doc_qa"),
];

/// Build the tool a locator refers to, if any
pub fn resolve(path: &str, provider: Arc<dyn CompletionProvider>) -> Option<Box<dyn Tool>> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == path)
        .map(|(_, target)| *target)
        .unwrap_or(path);

    BUILTIN_TOOLS.get(canonical).map(|construct| construct(provider))
}

/// Canonical locators, in registration order
pub fn builtin_paths() -> Vec<&'static str> {
    BUILTIN_TOOLS.keys().copied().collect()
}

/// Best-effort segmentation of provider text did not find its markers
#[derive(Error, Debug, PartialEq, Eq)]
#[error("could not segment provider output: {0}")]
pub struct ParseFailure(pub &'static str);

/// Read a text field. A bare string input stands in for the tool's primary field.
pub(crate) fn text_field(input: &Value, name: &str, primary: &str) -> Option<String> {
    match input {
        Value::String(s) if name == primary => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        _ => payload::str_field(input, name).map(str::to_string),
    }
}

/// Call the provider, turning a fault into an `{"error": ...}` payload
pub(crate) fn ask(
    provider: &dyn CompletionProvider,
    tool: &str,
    prompt: &str,
    temperature: f32,
) -> Result<String, Value> {
    provider
        .complete(prompt, &CompletionParams::with_temperature(temperature))
        .map_err(|e| {
            log::error!("{} provider call failed: {}", tool, e);
            SwitchboardError::from(e).to_payload()
        })
}

/// Parse provider text as JSON, or report it verbatim
pub(crate) fn parse_json_output(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("Failed to parse JSON from LLM result: {}", e);
            SwitchboardError::MalformedProviderOutput {
                message: "LLM returned invalid JSON".to_string(),
                raw_output: raw.to_string(),
            }
            .to_payload()
        }
    }
}
