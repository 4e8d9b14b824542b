//! Interactive chat loop over the router

use colored::*;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::Value;

use super::print_payload;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::runtime::Switchboard;

const PROMPT: &str = "You: ";
const HISTORY_FILE: &str = "chat_history";

/// True for the words that end the session
pub fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

pub fn run(config: &Config) -> Result<()> {
    let switchboard = Switchboard::build(config)?;

    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;
    let history_path = Config::switchboard_dir().join(HISTORY_FILE);
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
    }

    println!("{}", "Switchboard chat".green().bold());
    println!("Type 'exit' to quit");
    println!();

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        if is_exit(request) {
            break;
        }
        let _ = editor.add_history_entry(request);

        let response = switchboard.orchestrator.handle(&Value::String(request.to_string()));
        println!();
        print_payload("Response:", &response, OutputFormat::Text)?;
        println!();
    }

    if let Err(e) = editor.save_history(&history_path) {
        log::warn!("Failed to save chat history to {}: {}", history_path.display(), e);
    }

    switchboard.shutdown()
}
