//! Request orchestration: route, adapt, run, remember
//!
//! [`Orchestrator::handle`] is the free-text entry point. It never returns an
//! error to its caller; every fault is folded into an `{"error": ...}`
//! payload.

use eyre::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::adapter::InputAdapter;
use crate::agent::registry::AgentRegistry;
use crate::error::{SwitchboardError, fault_payload};
use crate::memory::MemoryStore;
use crate::payload;
use crate::router::Router;

pub const LAST_INPUT_KEY: &str = "last_input";
pub const LAST_RESPONSE_KEY: &str = "last_response";

/// Listing entry for one agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub description: String,
    pub required_inputs: Vec<String>,
}

pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    adapter: InputAdapter,
    router: Router,
    memory: Arc<MemoryStore>,
}

impl Orchestrator {
    pub fn new(registry: Arc<AgentRegistry>, adapter: InputAdapter, router: Router, memory: Arc<MemoryStore>) -> Self {
        Self {
            registry,
            adapter,
            router,
            memory,
        }
    }

    /// Route `input` to one agent and return its response
    pub fn handle(&self, input: &Value) -> Value {
        match self.dispatch(input) {
            Ok(response) => response,
            Err(e) => {
                log::error!("Request failed: {:#}", e);
                fault_payload(&e)
            }
        }
    }

    fn dispatch(&self, input: &Value) -> Result<Value> {
        let routing_text = match input {
            Value::String(s) => s.clone(),
            Value::Object(_) => serde_json::to_string(input).context("Failed to serialize input for routing")?,
            _ => return Err(SwitchboardError::InvalidInput.into()),
        };

        let selected = self.router.choose(&routing_text, self.registry.list())?;

        // An unregistered name is treated the same as no answer
        let Some(agent) = selected.as_deref().and_then(|name| self.registry.get(name)) else {
            return Err(SwitchboardError::RoutingFailure { input: routing_text }.into());
        };

        log::info!("Routing to agent: {}", agent.name());
        log::debug!("{}: {}", agent.name(), agent.description());
        let adapted = self.adapter.adapt(agent.name(), input);
        let response = agent.run(&adapted)?;

        self.memory
            .store(LAST_INPUT_KEY, input.clone())
            .context("Failed to record last input")?;
        self.memory
            .store(LAST_RESPONSE_KEY, Value::String(payload::to_text(&response)))
            .context("Failed to record last response")?;

        Ok(response)
    }

    /// Run a named agent directly, bypassing routing and adaptation
    pub fn invoke(&self, name: &str, input: &Value) -> Result<Value, SwitchboardError> {
        let agent = self
            .registry
            .get(name)
            .ok_or_else(|| SwitchboardError::UnknownAgent(name.to_string()))?;

        log::info!("Invoking agent '{}' directly", name);
        let output = match agent.run(input) {
            Ok(output) => output,
            Err(e) => {
                log::error!("Agent '{}' failed: {:#}", name, e);
                fault_payload(&e)
            }
        };

        Ok(json!({ "agent": name, "output": output }))
    }

    pub fn list(&self) -> Vec<AgentSummary> {
        self.registry
            .list()
            .iter()
            .map(|d| AgentSummary {
                name: d.name.clone(),
                description: d.description.clone(),
                required_inputs: d.required_inputs.clone(),
            })
            .collect()
    }
}
