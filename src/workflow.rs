//! Sequential multi-step workflows
//!
//! A workflow is an ordered list of steps. Each step names an agent and an
//! input template; placeholders in the template are filled from a context
//! built from shared memory overlaid with the workflow's own values (caller
//! input plus the outputs of earlier steps).
//!
//! Workflow files look like:
//!
//! ```json
//! {
//!   "input": {
//!     "topic": "quarterly results",
//!     "steps": [
//!       {"agent": "slide_generator_agent", "input": {"topic": "{topic}"}},
//!       {"agent": "email_generator_agent",
//!        "input": {"purpose": "share slides", "content": "{output_1}", "tone": "formal"},
//!        "output_key": "email"}
//!     ]
//!   }
//! }
//! ```

use eyre::{Context, Result};
use lazy_regex::lazy_regex;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::agent::registry::AgentRegistry;
use crate::config::PlaceholderStyle;
use crate::error::fault_payload;
use crate::memory::MemoryStore;
use crate::payload;

static SINGLE_BRACE: Lazy<Regex> = lazy_regex!(r"\{([A-Za-z_][\w.-]*)\}");
static DOUBLE_BRACE: Lazy<Regex> = lazy_regex!(r"\{\{\s*([A-Za-z_][\w.-]*)\s*\}\}");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub agent: String,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
}

/// A parsed workflow document: its steps and the initial context
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowFile {
    pub steps: Vec<WorkflowStep>,
    pub context: Map<String, Value>,
}

#[derive(Deserialize)]
struct WorkflowDocument {
    input: Map<String, Value>,
}

impl WorkflowFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read workflow file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid workflow file: {}", path.display()))
    }

    /// Parse `{"input": {"steps": [...], ...context}}`
    pub fn parse(content: &str) -> Result<Self> {
        let document: WorkflowDocument = serde_json::from_str(content).context("Expected {\"input\": {...}}")?;
        let mut context = document.input;

        let steps = match context.remove("steps") {
            Some(steps) => serde_json::from_value(steps).context("Invalid 'steps' list")?,
            None => Vec::new(),
        };

        Ok(Self { steps, context })
    }
}

/// Where a run is. Transitions are logged as they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    NotStarted,
    Running(usize),
    Completed(usize),
    Finished,
    Failed(String),
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::NotStarted => write!(f, "not started"),
            WorkflowState::Running(step) => write!(f, "running step {}", step),
            WorkflowState::Completed(step) => write!(f, "step {} complete", step),
            WorkflowState::Finished => write!(f, "finished"),
            WorkflowState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

pub struct WorkflowEngine {
    registry: Arc<AgentRegistry>,
    memory: Arc<MemoryStore>,
    style: PlaceholderStyle,
}

impl WorkflowEngine {
    pub fn new(registry: Arc<AgentRegistry>, memory: Arc<MemoryStore>, style: PlaceholderStyle) -> Self {
        Self {
            registry,
            memory,
            style,
        }
    }

    /// Run `steps` in order, returning the final context or `{"error": ...}`
    pub fn run(&self, steps: &[WorkflowStep], initial: Map<String, Value>) -> Value {
        let mut state = WorkflowState::NotStarted;
        let mut context = initial;
        log::info!("Workflow starting with {} steps, context keys: {:?}", steps.len(), context.keys().collect::<Vec<_>>());

        for (idx, step) in steps.iter().enumerate() {
            let number = idx + 1;
            transition(&mut state, WorkflowState::Running(number));

            let mut resolution = self.memory.all();
            resolution.extend(context.iter().map(|(k, v)| (k.clone(), v.clone())));
            let input = resolve_template(&step.input, &resolution, self.style);

            let Some(agent) = self.registry.get(&step.agent) else {
                let message = format!("Unknown agent: {}", step.agent);
                transition(&mut state, WorkflowState::Failed(message.clone()));
                return payload::error(message);
            };

            log::info!("Workflow step {}: running {}", number, step.agent);
            let output = match agent.run(&input) {
                Ok(output) => output,
                Err(e) => {
                    transition(&mut state, WorkflowState::Failed(format!("step {} ({}): {:#}", number, step.agent, e)));
                    return fault_payload(&e);
                }
            };

            let key = step.output_key.clone().unwrap_or_else(|| format!("output_{}", number));
            if let Err(e) = self.memory.store(&key, output.clone()) {
                transition(&mut state, WorkflowState::Failed(format!("{:#}", e)));
                return payload::error(format!("Failed to store '{}': {:#}", key, e));
            }
            context.insert(key.clone(), output);

            log::info!("Workflow step {} saved output to '{}'", number, key);
            transition(&mut state, WorkflowState::Completed(number));
        }

        transition(&mut state, WorkflowState::Finished);
        Value::Object(context)
    }
}

fn transition(state: &mut WorkflowState, next: WorkflowState) {
    match &next {
        WorkflowState::Failed(_) => log::error!("Workflow {} -> {}", state, next),
        _ => log::debug!("Workflow {} -> {}", state, next),
    }
    *state = next;
}

/// Substitute placeholders in every string leaf of `template`.
///
/// Placeholders with no entry in `context` are left untouched. Values are
/// inserted as text: strings verbatim, anything else as compact JSON.
pub fn resolve_template(template: &Value, context: &Map<String, Value>, style: PlaceholderStyle) -> Value {
    match template {
        Value::String(s) => Value::String(resolve_string(s, context, style)),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve_template(v, context, style)).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), resolve_template(v, context, style)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn resolve_string(s: &str, context: &Map<String, Value>, style: PlaceholderStyle) -> String {
    let pattern = match style {
        PlaceholderStyle::Single => &*SINGLE_BRACE,
        PlaceholderStyle::Double => &*DOUBLE_BRACE,
    };

    pattern
        .replace_all(s, |caps: &regex::Captures| match context.get(&caps[1]) {
            Some(value) => payload::to_text(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}
