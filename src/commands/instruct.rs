//! One-shot routed requests

use eyre::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::print_payload;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::runtime::Switchboard;

pub fn text(words: &[String], format: OutputFormat, config: &Config) -> Result<()> {
    let request = Value::String(words.join(" "));
    handle(&request, format, config)
}

pub fn json(path: &Path, format: OutputFormat, config: &Config) -> Result<()> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let request: Value =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    handle(&request, format, config)
}

fn handle(request: &Value, format: OutputFormat, config: &Config) -> Result<()> {
    let switchboard = Switchboard::build(config)?;
    let response = switchboard.orchestrator.handle(request);
    print_payload("Output:", &response, format)?;
    switchboard.shutdown()
}
