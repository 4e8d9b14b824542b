//! Error kinds surfaced by the routing core
//!
//! Core entry points never return these raw to callers: they are rendered as
//! `{"error": ...}` payloads with [`SwitchboardError::to_payload`]. Only the
//! manifest variants are allowed to stop the process, and only at startup.

use serde_json::{Value, json};
use std::path::PathBuf;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum SwitchboardError {
    /// Request input was neither text nor a mapping
    #[error("Invalid input format.")]
    InvalidInput,

    /// Router returned nothing usable, or a name that is not registered
    #[error("Could not determine appropriate agent.")]
    RoutingFailure { input: String },

    /// Direct invocation of an agent that does not exist
    #[error("Agent not found: {0}")]
    UnknownAgent(String),

    /// The completion provider failed (auth, quota, network, timeout)
    #[error("{0}")]
    ProviderFault(#[from] ProviderError),

    /// Provider text could not be parsed into the expected shape
    #[error("{message}")]
    MalformedProviderOutput { message: String, raw_output: String },

    /// A manifest entry points at an implementation that does not exist
    #[error("Agent '{agent}' references unknown implementation '{path}'")]
    MissingManifestEntry { agent: String, path: String },

    /// Two manifest entries share a name
    #[error("Duplicate agent name in manifest: {0}")]
    DuplicateAgent(String),

    /// The manifest itself could not be read or parsed
    #[error("Failed to load manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },
}

impl SwitchboardError {
    /// Render as the `{error, ...}` mapping returned by core entry points
    pub fn to_payload(&self) -> Value {
        match self {
            SwitchboardError::RoutingFailure { input } => json!({
                "error": self.to_string(),
                "input": input,
            }),
            SwitchboardError::MalformedProviderOutput { raw_output, .. } => json!({
                "error": self.to_string(),
                "raw_output": raw_output,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }

    /// True for errors that mean "not found" to a transport layer
    pub fn is_not_found(&self) -> bool {
        matches!(self, SwitchboardError::UnknownAgent(_))
    }
}

/// Render any fault as an error payload, keeping the typed shape when there is one
pub fn fault_payload(err: &eyre::Report) -> Value {
    match err.downcast_ref::<SwitchboardError>() {
        Some(typed) => typed.to_payload(),
        None => json!({ "error": format!("{:#}", err) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_failure_payload_carries_input() {
        let err = SwitchboardError::RoutingFailure {
            input: "do something".to_string(),
        };
        let payload = err.to_payload();
        assert_eq!(payload["error"], "Could not determine appropriate agent.");
        assert_eq!(payload["input"], "do something");
    }

    #[test]
    fn test_malformed_output_payload_carries_raw_text() {
        let err = SwitchboardError::MalformedProviderOutput {
            message: "LLM returned invalid JSON".to_string(),
            raw_output: "not json".to_string(),
        };
        let payload = err.to_payload();
        assert_eq!(payload["error"], "LLM returned invalid JSON");
        assert_eq!(payload["raw_output"], "not json");
    }

    #[test]
    fn test_unknown_agent_is_not_found() {
        let err = SwitchboardError::UnknownAgent("ghost".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_payload()["error"], "Agent not found: ghost");
        assert!(!SwitchboardError::DuplicateAgent("a".to_string()).is_not_found());
    }

    #[test]
    fn test_invalid_input_payload() {
        assert_eq!(SwitchboardError::InvalidInput.to_payload(), json!({"error": "Invalid input format."}));
    }

    #[test]
    fn test_fault_payload_keeps_typed_fields() {
        let report = eyre::Report::new(SwitchboardError::RoutingFailure {
            input: "hi".to_string(),
        });
        assert_eq!(fault_payload(&report)["input"], "hi");

        let plain = eyre::eyre!("disk full");
        assert_eq!(fault_payload(&plain), json!({"error": "disk full"}));
    }
}
