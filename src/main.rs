use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod adapter;
mod agent;
mod cli;
mod commands;
mod config;
mod documents;
mod error;
mod eval;
mod memory;
mod orchestrator;
mod payload;
mod provider;
mod router;
mod runtime;
mod tools;
mod workflow;

use cli::{Cli, Commands, OutputFormat};
use config::{Config, LogLevel};

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("switchboard")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("switchboard.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.level_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Mem { key, format } => commands::memory::show(key.as_deref(), OutputFormat::resolve(format), &config),
        Commands::ClearMem => commands::memory::clear(&config),
        Commands::Agents { format } => commands::agents::list(OutputFormat::resolve(format), &config),
        Commands::Agent { name, inputs, format } => {
            commands::agents::invoke(&name, &inputs, OutputFormat::resolve(format), &config)
        }
        Commands::File { name, path, format } => {
            commands::agents::file(&name, &path, OutputFormat::resolve(format), &config)
        }
        Commands::Instruct { text, format } => commands::instruct::text(&text, OutputFormat::resolve(format), &config),
        Commands::Json { path, format } => commands::instruct::json(&path, OutputFormat::resolve(format), &config),
        Commands::Workflow { file, vars, format } => {
            commands::workflow::run(&file, &vars, OutputFormat::resolve(format), &config)
        }
        Commands::Chat => commands::chat::run(&config),
        Commands::Eval { suite } => commands::eval::run(&suite, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("Starting switchboard with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
