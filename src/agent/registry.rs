//! Agent manifest loading and the agent registry
//!
//! The manifest is an ordered list of agent descriptors (YAML or JSON):
//!
//! ```yaml
//! - name: email_generator_agent
//!   description: Generates emails from purpose, content, and tone.
//!   required_inputs: [purpose, content, tone]
//!   path: tools.email
//! - name: haiku_agent
//!   description: Writes a haiku about a topic.
//!   prompt: "Write a haiku about {topic}."
//!   temperature: 0.7
//! ```
//!
//! `path` entries resolve through the builtin tool table, `prompt` entries
//! become prompt-template agents. Resolution happens once, at startup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::{Agent, LlmAgent, ToolAgent};
use crate::error::SwitchboardError;
use crate::provider::CompletionProvider;
use crate::tools;

/// One manifest entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Declared input fields, shown in listings
    #[serde(default)]
    pub required_inputs: Vec<String>,

    #[serde(flatten)]
    pub implementation: Implementation,
}

/// How a descriptor becomes a runnable agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Implementation {
    /// Builtin tool locator, e.g. `tools.email`
    Tool { path: String },
    /// Prompt template rendered against the input fields
    Prompt {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<f32>,
    },
}

/// Parse a manifest document
pub fn parse_manifest(content: &str) -> Result<Vec<AgentDescriptor>, serde_yaml::Error> {
    // YAML is a superset of JSON, so both manifest flavours go through serde_yaml
    serde_yaml::from_str(content)
}

/// Registered agents, keyed by name, in manifest order
pub struct AgentRegistry {
    descriptors: Vec<AgentDescriptor>,
    agents: IndexMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            agents: IndexMap::new(),
        }
    }

    /// Read the manifest at `path` and materialize every agent
    pub fn load(path: &Path, provider: Arc<dyn CompletionProvider>) -> Result<Self, SwitchboardError> {
        let content = fs::read_to_string(path).map_err(|e| SwitchboardError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let descriptors = parse_manifest(&content).map_err(|e| SwitchboardError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let registry = Self::from_descriptors(descriptors, provider)?;
        log::info!("Loaded {} agents from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Materialize each descriptor into an agent
    pub fn from_descriptors(
        descriptors: Vec<AgentDescriptor>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, SwitchboardError> {
        let mut registry = Self::new();

        for descriptor in descriptors {
            let agent = build_agent(&descriptor, provider.clone())?;
            registry.register(descriptor, agent)?;
        }

        Ok(registry)
    }

    /// Register an already-built agent under its descriptor's name
    pub fn register(&mut self, descriptor: AgentDescriptor, agent: Arc<dyn Agent>) -> Result<(), SwitchboardError> {
        if self.agents.contains_key(&descriptor.name) {
            return Err(SwitchboardError::DuplicateAgent(descriptor.name));
        }

        log::debug!("Registered agent '{}'", descriptor.name);
        self.agents.insert(descriptor.name.clone(), agent);
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Descriptors in manifest order
    pub fn list(&self) -> &[AgentDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn build_agent(
    descriptor: &AgentDescriptor,
    provider: Arc<dyn CompletionProvider>,
) -> Result<Arc<dyn Agent>, SwitchboardError> {
    match &descriptor.implementation {
        Implementation::Tool { path } => {
            let tool = tools::resolve(path, provider).ok_or_else(|| {
                log::error!("Known tool locators: {}", tools::builtin_paths().join(", "));
                SwitchboardError::MissingManifestEntry {
                    agent: descriptor.name.clone(),
                    path: path.clone(),
                }
            })?;
            Ok(Arc::new(ToolAgent::new(&descriptor.name, &descriptor.description, tool)))
        }
        Implementation::Prompt { prompt, temperature } => Ok(Arc::new(LlmAgent::new(
            &descriptor.name,
            &descriptor.description,
            prompt,
            *temperature,
            provider,
        ))),
    }
}
