//! Evaluation suite command

use colored::*;
use eyre::Result;
use std::path::Path;

use crate::config::Config;
use crate::eval::{EvalRunner, load_suite};
use crate::runtime::Switchboard;

pub fn run(suite: &Path, config: &Config) -> Result<()> {
    let cases = load_suite(suite)?;
    let switchboard = Switchboard::build(config)?;
    let runner = EvalRunner::new(&switchboard.orchestrator, Config::expand_path(&config.paths.traces));

    let mut passed = 0;
    for case in &cases {
        let outcome = runner.run_case(case)?;
        println!("Running test: {}", outcome.name.bold());
        if outcome.passed {
            passed += 1;
            println!("  {} PASSED", "✓".green());
        } else {
            println!("  {} FAILED", "✗".red());
        }
        println!("  {}", outcome.trace_path.display().to_string().dimmed());
    }

    println!();
    let summary = format!("{}/{} passed", passed, cases.len());
    if passed == cases.len() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }

    switchboard.shutdown()
}
