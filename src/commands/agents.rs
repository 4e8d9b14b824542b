//! Agent listing and direct invocation

use colored::*;
use eyre::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::print_payload;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::payload;
use crate::runtime::Switchboard;

pub fn list(format: OutputFormat, config: &Config) -> Result<()> {
    let switchboard = Switchboard::build(config)?;
    let agents = switchboard.orchestrator.list();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&agents)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&agents)?),
        OutputFormat::Text => {
            println!("{}", "Available Agents:".bold());
            println!();

            if agents.is_empty() {
                println!("  {} No agents in {}", "(none)".dimmed(), config.paths.manifest.display());
            }

            for agent in &agents {
                println!("  {} {}", "●".green(), agent.name.bold());
                if !agent.description.is_empty() {
                    println!("    {}", agent.description.dimmed());
                }
                if !agent.required_inputs.is_empty() {
                    println!("    Inputs: {}", agent.required_inputs.join(", ").cyan());
                }
                println!();
            }
        }
    }

    Ok(())
}

/// `agent <name> key=value...`
pub fn invoke(name: &str, inputs: &[String], format: OutputFormat, config: &Config) -> Result<()> {
    let input = Value::Object(payload::parse_key_values(inputs)?);
    run_agent(name, input, format, config)
}

/// `file <name> <path>`
pub fn file(name: &str, path: &Path, format: OutputFormat, config: &Config) -> Result<()> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    run_agent(name, Value::String(content), format, config)
}

fn run_agent(name: &str, input: Value, format: OutputFormat, config: &Config) -> Result<()> {
    let switchboard = Switchboard::build(config)?;

    if format == OutputFormat::Text {
        println!("Calling {} with {}", name.blue().bold(), payload::truncate(&payload::to_text(&input), 80));
        println!();
    }

    let result = match switchboard.orchestrator.invoke(name, &input) {
        Ok(result) => result,
        Err(e) if e.is_not_found() => eyre::bail!("{} (run `switchboard agents` to list them)", e),
        Err(e) => return Err(e.into()),
    };
    let output = result.get("output").cloned().unwrap_or(Value::Null);

    match format {
        OutputFormat::Text => print_payload(&format!("{} Output:", name), &output, format)?,
        _ => print_payload(name, &result, format)?,
    }

    switchboard.shutdown()
}
