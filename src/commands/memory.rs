//! Shared memory commands

use colored::*;
use eyre::{Context, Result, bail};

use super::terminal_width;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::payload;
use crate::runtime::open_memory;

pub fn show(key: Option<&str>, format: OutputFormat, config: &Config) -> Result<()> {
    let memory = open_memory(config);

    if let Some(key) = key {
        let Some(value) = memory.get(key) else {
            bail!("No memory entry named '{}'", key);
        };
        return super::print_payload(key, &value, format);
    }

    let entries = memory.all();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&entries)?),
        OutputFormat::Text => {
            println!(
                "{} {}",
                "Current Memory:".bold(),
                format!("({} items in {})", memory.len(), memory.path().display()).dimmed()
            );
            println!();

            if memory.is_empty() {
                println!("  {}", "Memory is empty.".yellow());
                return Ok(());
            }

            let width = terminal_width();
            for (key, value) in &entries {
                // "  key: " prefix
                let available = width.saturating_sub(key.chars().count() + 4).max(20);
                let text = payload::to_text(value).replace('\n', " ");
                println!("  {}: {}", key.green(), payload::truncate(&text, available));
            }
        }
    }

    Ok(())
}

pub fn clear(config: &Config) -> Result<()> {
    let memory = open_memory(config);
    memory.clear().context("Failed to clear memory")?;
    println!("{} Memory cleared.", "✓".green());
    Ok(())
}
