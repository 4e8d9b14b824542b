//! Input adaptation
//!
//! Each agent may ship a schema next to it, `<agents_dir>/<name>/config.json`
//! (YAML also accepted), declaring the fields it expects:
//!
//! ```json
//! { "description": "Analyzes resumes", "required_inputs": ["resume_text", "job_description"] }
//! ```
//!
//! The adapter reshapes caller input to that list before the agent runs.
//! It never fails: a missing or unreadable schema means "no declared fields".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_FILES: &[&str] = &["config.json", "config.yaml", "config.yml"];

/// Per-agent declared input schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSchema {
    pub description: String,
    pub required_inputs: Vec<String>,
}

impl AgentSchema {
    /// Load the schema colocated with `agent_name`, or the empty schema
    pub fn load(agents_dir: &Path, agent_name: &str) -> Self {
        let agent_dir = agents_dir.join(agent_name);

        let Some(path) = SCHEMA_FILES.iter().map(|f| agent_dir.join(f)).find(|p| p.exists()) else {
            log::debug!("No config found for agent '{}' in {}", agent_name, agent_dir.display());
            return Self::default();
        };

        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_yaml::from_str::<AgentSchema>(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(schema) => {
                log::debug!("Loaded schema for '{}' ({}): {:?}", agent_name, schema.description, schema.required_inputs);
                schema
            }
            Err(e) => {
                log::warn!("Ignoring unreadable agent config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

pub struct InputAdapter {
    agents_dir: PathBuf,
}

impl InputAdapter {
    pub fn new(agents_dir: impl Into<PathBuf>) -> Self {
        Self {
            agents_dir: agents_dir.into(),
        }
    }

    pub fn schema(&self, agent_name: &str) -> AgentSchema {
        AgentSchema::load(&self.agents_dir, agent_name)
    }

    /// Shape `input` into the fields `agent_name` declares
    pub fn adapt(&self, agent_name: &str, input: &Value) -> Value {
        let required = self.schema(agent_name).required_inputs;
        adapt_to_fields(agent_name, &required, input)
    }
}

/// The adaptation rules, independent of where the field list came from
pub fn adapt_to_fields(agent_name: &str, required: &[String], input: &Value) -> Value {
    if required.is_empty() {
        return input.clone();
    }

    let adapted: Map<String, Value> = match input {
        Value::Object(fields) => required
            .iter()
            .map(|field| (field.clone(), fields.get(field).cloned().unwrap_or(Value::Null)))
            .collect(),
        single if required.len() == 1 => Map::from_iter([(required[0].clone(), single.clone())]),
        shared => {
            // Known limitation: agents needing distinct fields all get the same text
            log::warn!(
                "Input for '{}' is not a mapping; copying it into every required field ({})",
                agent_name,
                required.join(", ")
            );
            required.iter().map(|field| (field.clone(), shared.clone())).collect()
        }
    };

    log::debug!("Adapted input for {}: {}", agent_name, Value::Object(adapted.clone()));
    Value::Object(adapted)
}
