pub mod agents;
pub mod chat;
pub mod completions;
pub mod eval;
pub mod instruct;
pub mod memory;
pub mod workflow;

use colored::*;
use eyre::Result;
use serde_json::Value;
use terminal_size::{Width, terminal_size};

use crate::cli::OutputFormat;
use crate::payload;

/// Get terminal width, defaulting to 80 if unavailable
pub fn terminal_width() -> usize {
    terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(80)
}

/// Print a response payload in the requested format
pub fn print_payload(title: &str, value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => {
            if payload::is_error(value) {
                println!("{} {}", "✗".red(), payload::to_text(&value["error"]).red());
                for (key, detail) in value.as_object().into_iter().flatten() {
                    if key != "error" {
                        println!("  {}: {}", key.dimmed(), payload::to_text(detail));
                    }
                }
            } else {
                println!("{}", title.cyan().bold());
                match value {
                    Value::String(s) => println!("{}", s),
                    other => println!("{}", serde_json::to_string_pretty(other)?),
                }
            }
        }
    }
    Ok(())
}
