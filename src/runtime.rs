//! Wiring: build the provider, registry, memory, orchestrator and workflow
//! engine from a [`Config`]

use eyre::{Context, Result};
use std::sync::Arc;

use crate::adapter::InputAdapter;
use crate::agent::registry::AgentRegistry;
use crate::config::Config;
use crate::memory::MemoryStore;
use crate::orchestrator::Orchestrator;
use crate::provider::build_provider;
use crate::router::Router;
use crate::workflow::WorkflowEngine;

pub struct Switchboard {
    pub orchestrator: Orchestrator,
    pub workflow: WorkflowEngine,
    pub memory: Arc<MemoryStore>,
}

impl Switchboard {
    /// Build everything. A manifest that cannot be loaded is fatal.
    pub fn build(config: &Config) -> Result<Self> {
        let provider = build_provider(&config.provider);
        log::info!("Using completion provider: {}", provider.name());

        let manifest = Config::expand_path(&config.paths.manifest);
        let registry = Arc::new(
            AgentRegistry::load(&manifest, provider.clone())
                .with_context(|| format!("Failed to load agent registry from {}", manifest.display()))?,
        );

        if registry.is_empty() {
            log::warn!("Manifest {} defines no agents", manifest.display());
        }

        let memory = open_memory(config);
        let adapter = InputAdapter::new(Config::expand_path(&config.paths.agents));

        let orchestrator = Orchestrator::new(registry.clone(), adapter, Router::new(provider), memory.clone());
        let workflow = WorkflowEngine::new(registry, memory.clone(), config.workflow.placeholder);

        Ok(Self {
            orchestrator,
            workflow,
            memory,
        })
    }

    /// Flush memory on the way out
    pub fn shutdown(&self) -> Result<()> {
        self.memory.shutdown().context("Failed to flush memory")
    }
}

/// Open the memory store on its own, for commands that need nothing else
pub fn open_memory(config: &Config) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::init(Config::expand_path(&config.paths.memory)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.provider.kind = ProviderKind::Echo;
        config.paths.manifest = dir.path().join("agents_manifest.yaml");
        config.paths.agents = dir.path().join("agents");
        config.paths.memory = dir.path().join("memory.json");
        config
    }

    #[test]
    fn test_build_with_echo_provider() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        fs::write(&config.paths.manifest, "- name: echo_agent\n  prompt: \"{input}\"\n").unwrap();

        let switchboard = Switchboard::build(&config).unwrap();

        assert_eq!(switchboard.orchestrator.list().len(), 1);
        let result = switchboard.orchestrator.invoke("echo_agent", &json!("ping")).unwrap();
        assert_eq!(result["output"]["output"], "ping");
        switchboard.shutdown().unwrap();
        assert!(config.paths.memory.exists());
    }

    #[test]
    fn test_build_fails_without_manifest() {
        let temp = TempDir::new().unwrap();
        let err = Switchboard::build(&config_in(&temp)).err().unwrap();
        assert!(err.to_string().contains("Failed to load agent registry"));
    }
}
