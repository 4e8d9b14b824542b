//! Workflow command

use colored::*;
use eyre::Result;
use std::path::Path;

use super::print_payload;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::payload;
use crate::runtime::Switchboard;
use crate::workflow::WorkflowFile;

pub fn run(file: &Path, vars: &[String], format: OutputFormat, config: &Config) -> Result<()> {
    let mut workflow = WorkflowFile::load(file)?;

    for (key, value) in payload::parse_key_values(vars)? {
        if format == OutputFormat::Text {
            println!(
                "{} {}='{}'",
                "Overriding context:".yellow(),
                key,
                payload::truncate(&payload::to_text(&value), 30)
            );
        }
        workflow.context.insert(key, value);
    }

    let switchboard = Switchboard::build(config)?;
    let result = switchboard.workflow.run(&workflow.steps, workflow.context);
    print_payload("Workflow Output:", &result, format)?;
    switchboard.shutdown()
}
