//! Agents and the uniform agent contract
//!
//! Every agent exposes `run(input) -> output` over `serde_json::Value`.
//! Two implementations exist:
//! - [`ToolAgent`] wraps a deterministic callable (a builtin [`Tool`])
//! - [`LlmAgent`] renders a prompt template against the input fields and
//!   hands it to the completion provider

use eyre::Result;
use lazy_regex::regex;
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::error::SwitchboardError;
use crate::payload;
use crate::provider::{CompletionParams, CompletionProvider};

pub mod registry;

/// A named unit of work
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Run the agent. Agent-level failures (missing fields, bad provider
    /// output) come back as `{"error": ...}` payloads; `Err` is reserved for
    /// faults the agent could not turn into a payload.
    fn run(&self, input: &Value) -> Result<Value>;
}

/// A deterministic callable behind a [`ToolAgent`]
pub trait Tool: Send + Sync {
    fn call(&self, input: &Value) -> Value;
}

pub struct ToolAgent {
    name: String,
    description: String,
    tool: Box<dyn Tool>,
}

impl ToolAgent {
    pub fn new(name: &str, description: &str, tool: Box<dyn Tool>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tool,
        }
    }
}

impl Agent for ToolAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, input: &Value) -> Result<Value> {
        Ok(self.tool.call(input))
    }
}

pub struct LlmAgent {
    name: String,
    description: String,
    template: String,
    temperature: f32,
    provider: Arc<dyn CompletionProvider>,
}

impl LlmAgent {
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;

    pub fn new(
        name: &str,
        description: &str,
        template: &str,
        temperature: Option<f32>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            template: template.to_string(),
            temperature: temperature.unwrap_or(Self::DEFAULT_TEMPERATURE),
            provider,
        }
    }
}

impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, input: &Value) -> Result<Value> {
        let fields = match input {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("input".to_string(), other.clone());
                map
            }
        };

        let prompt = render_prompt(&self.template, &fields)?;
        let output = self
            .provider
            .complete(&prompt, &CompletionParams::with_temperature(self.temperature))
            .map_err(SwitchboardError::from)?;

        Ok(json!({ "output": output }))
    }
}

/// Render a format-style prompt template.
///
/// `{field}` is replaced with the text of `fields[field]`; `{{` and `}}`
/// produce literal braces. A placeholder with no matching field is an error.
/// Non-object agent input is exposed as `{input}`.
pub fn render_prompt(template: &str, fields: &Map<String, Value>) -> Result<String> {
    let pattern = regex!(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}");

    let mut missing = Vec::new();
    let rendered = pattern.replace_all(template, |caps: &regex::Captures| match caps.get(1) {
        None if &caps[0] == "{{" => "{".to_string(),
        None => "}".to_string(),
        Some(name) => match fields.get(name.as_str()) {
            Some(value) => payload::to_text(value),
            None => {
                missing.push(name.as_str().to_string());
                caps[0].to_string()
            }
        },
    });

    if !missing.is_empty() {
        eyre::bail!("Missing template field(s): {}", missing.join(", "));
    }

    Ok(rendered.into_owned())
}
