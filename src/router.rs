//! Intent routing
//!
//! One deterministic provider call picks an agent for free text. The reply
//! must be a JSON object `{"selected_agent": "<name>"}`; anything else means
//! "no agent", never an error.

use serde::Deserialize;
use std::sync::Arc;

use crate::agent::registry::AgentDescriptor;
use crate::error::SwitchboardError;
use crate::provider::{CompletionParams, CompletionProvider};

#[derive(Debug, Deserialize)]
struct RouterDecision {
    #[serde(default)]
    selected_agent: String,
}

pub struct Router {
    provider: Arc<dyn CompletionProvider>,
}

impl Router {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Pick an agent name for `query`, or `None` when the reply is unusable.
    ///
    /// The name is not checked against the registry here.
    pub fn choose(&self, query: &str, descriptors: &[AgentDescriptor]) -> Result<Option<String>, SwitchboardError> {
        let prompt = build_prompt(query, descriptors);
        let raw = self.provider.complete(&prompt, &CompletionParams::deterministic())?;
        let decision = parse_decision(&raw);

        match &decision {
            Some(name) => log::info!("Router selected '{}'", name),
            None => log::warn!("Router reply did not name an agent: {}", raw.trim()),
        }

        Ok(decision)
    }
}

pub fn build_prompt(query: &str, descriptors: &[AgentDescriptor]) -> String {
    let agents = descriptors
        .iter()
        .map(|d| {
            let description = if d.description.is_empty() {
                "No description provided"
            } else {
                d.description.as_str()
            };
            format!("- {}: {}", d.name, description)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a task router in a multi-agent AI system.

Below are the available agents and their functions:
{agents}

Given the following user query:
"{query}"

Decide which ONE agent is most appropriate to handle this query.

Respond with only a JSON object like:
{{ "selected_agent": "agent_name_here" }}"#
    )
}

/// Strictly parse the router reply
pub fn parse_decision(raw: &str) -> Option<String> {
    serde_json::from_str::<RouterDecision>(raw.trim())
        .ok()
        .map(|d| d.selected_agent.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::registry::Implementation;
    use crate::provider::ProviderError;
    use crate::provider::testing::ScriptedProvider;

    fn descriptor(name: &str, description: &str) -> AgentDescriptor {
        AgentDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            required_inputs: Vec::new(),
            implementation: Implementation::Tool {
                path: "tools.email".to_string(),
            },
        }
    }

    #[test]
    fn test_prompt_lists_agents_in_order() {
        let prompt = build_prompt(
            "write SQL",
            &[descriptor("sql_agent", "Writes SQL"), descriptor("mute_agent", "")],
        );
        assert!(prompt.contains("- sql_agent: Writes SQL\n- mute_agent: No description provided"));
        assert!(prompt.contains("\"write SQL\""));
        assert!(prompt.ends_with(r#"{ "selected_agent": "agent_name_here" }"#));
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!(parse_decision(r#" {"selected_agent": "sql_agent"} "#), Some("sql_agent".to_string()));
        assert_eq!(parse_decision(r#"{"selected_agent": ""}"#), None);
        assert_eq!(parse_decision(r#"{"agent": "sql_agent"}"#), None);
        assert_eq!(parse_decision("sql_agent"), None);
        assert_eq!(parse_decision(r#"Sure! {"selected_agent": "sql_agent"}"#), None);
    }

    #[test]
    fn test_choose_single_deterministic_call() {
        let provider = ScriptedProvider::new(&[r#"{"selected_agent": "sql_agent"}"#]);
        let router = Router::new(provider.clone());

        let choice = router.choose("top customers", &[descriptor("sql_agent", "Writes SQL")]).unwrap();

        assert_eq!(choice.as_deref(), Some("sql_agent"));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.calls.lock().unwrap()[0].1.temperature, 0.0);
    }

    #[test]
    fn test_choose_malformed_reply_is_none() {
        let provider = ScriptedProvider::new(&["I think the SQL agent"]);
        let router = Router::new(provider);
        assert_eq!(router.choose("q", &[descriptor("sql_agent", "")]).unwrap(), None);
    }

    #[test]
    fn test_choose_provider_fault_is_err() {
        let provider = ScriptedProvider::failing(ProviderError::Status(429));
        let router = Router::new(provider);
        assert!(router.choose("q", &[]).is_err());
    }
}
