//! Completion providers
//!
//! The routing core only needs `complete(prompt, params) -> text`. Everything
//! about HTTP, keys and timeouts stays behind the [`CompletionProvider`] trait.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};

/// Sampling parameters for one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub temperature: f32,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Overrides the provider's default token limit
    pub max_tokens: Option<u32>,
}

impl CompletionParams {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            model: None,
            max_tokens: None,
        }
    }

    /// Deterministic sampling, used for routing
    pub fn deterministic() -> Self {
        Self::with_temperature(0.0)
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Provider returned HTTP status {0}")]
    Status(u16),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Unexpected provider response: {0}")]
    Response(String),
}

impl From<ureq::Error> for ProviderError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => ProviderError::Status(code),
            ureq::Error::Timeout(_) => ProviderError::Timeout,
            other => ProviderError::Transport(other.to_string()),
        }
    }
}

/// A text completion backend
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;
    fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String, ProviderError>;
}

/// Build the provider selected in configuration
pub fn build_provider(config: &ProviderConfig) -> Arc<dyn CompletionProvider> {
    match config.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config)),
        ProviderKind::Echo => Arc::new(EchoProvider),
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// OpenAI-compatible `/completions` endpoint
pub struct OpenAiProvider {
    agent: ureq::Agent,
    api_base: String,
    model: String,
    max_tokens: u32,
    api_key_env: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            log::warn!("{} is not set, completion calls will fail", config.api_key_env);
        }

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key_env: config.api_key_env.clone(),
            api_key,
        }
    }
}

impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingApiKey(self.api_key_env.clone()))?;

        let model = params.model.as_deref().unwrap_or(&self.model);
        let request = CompletionRequest {
            model,
            prompt,
            temperature: params.temperature,
            max_tokens: params.max_tokens.unwrap_or(self.max_tokens),
        };
        let request_body = serde_json::to_string(&request).map_err(|e| ProviderError::Response(e.to_string()))?;

        log::debug!(
            "Calling {} model={} temperature={} prompt_len={}",
            self.api_base,
            model,
            params.temperature,
            prompt.len()
        );

        let url = format!("{}/completions", self.api_base);
        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .send(request_body.as_bytes())?;

        let response_body = response.body_mut().read_to_string()?;
        let parsed: CompletionResponse =
            serde_json::from_str(&response_body).map_err(|e| ProviderError::Response(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| ProviderError::Response("no choices in completion response".to_string()))
    }
}

/// Offline provider that answers with the prompt itself
pub struct EchoProvider;

impl CompletionProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn complete(&self, prompt: &str, _params: &CompletionParams) -> Result<String, ProviderError> {
        Ok(prompt.to_string())
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted provider for unit tests

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every call
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        pub calls: Mutex<Vec<(String, CompletionParams)>>,
    }

    impl ScriptedProvider {
        pub fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(error: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(VecDeque::from([Err(error)])),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn prompts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete(&self, prompt: &str, params: &CompletionParams) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push((prompt.to_string(), params.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Response("script exhausted".to_string())))
        }
    }
}
