//! Evaluation runner
//!
//! Replays a suite of requests through the orchestrator and checks each
//! response for an expected substring. Suites are YAML:
//!
//! ```yaml
//! tests:
//!   - name: sql basic
//!     input: "Get the top 5 customers by revenue"
//!     expected_contains: "SELECT"
//! ```
//!
//! The check runs against the compact JSON rendering of the response:
//! no spaces after `:` or `,`, and non-ASCII characters kept as-is rather
//! than `\u` escaped. An expectation spanning a key and its value must be
//! written `"sql":"select`, not `"sql": "select`. Expectations that name a
//! single word or phrase inside one value are unaffected.
//!
//! `input` must be a string or a mapping; anything else is answered with
//! an `Invalid input format.` error and the case fails.
//!
//! Every case leaves a trace file `<traces>/<name>.json`.

use chrono::Local;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::orchestrator::Orchestrator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalCase {
    pub name: String,
    pub input: Value,
    pub expected_contains: String,
}

#[derive(Debug, Deserialize)]
struct EvalSuite {
    #[serde(default)]
    tests: Vec<EvalCase>,
}

/// Trace written for each case
#[derive(Debug, Serialize, Deserialize)]
pub struct EvalTrace {
    pub test: EvalCase,
    pub output: Value,
    pub passed: bool,
    pub timestamp: String,
}

#[derive(Debug)]
pub struct EvalOutcome {
    pub name: String,
    pub passed: bool,
    pub trace_path: PathBuf,
}

pub fn load_suite(path: &Path) -> Result<Vec<EvalCase>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read test suite: {}", path.display()))?;
    let suite: EvalSuite =
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse test suite: {}", path.display()))?;
    Ok(suite.tests)
}

/// Case-insensitive substring check against the JSON rendering of `output`
pub fn output_contains(output: &Value, expected: &str) -> bool {
    output.to_string().to_lowercase().contains(&expected.to_lowercase())
}

/// File name for a case's trace: spaces become underscores
pub fn trace_file_name(case_name: &str) -> String {
    format!("{}.json", case_name.replace(' ', "_"))
}

pub struct EvalRunner<'a> {
    orchestrator: &'a Orchestrator,
    trace_dir: PathBuf,
}

impl<'a> EvalRunner<'a> {
    pub fn new(orchestrator: &'a Orchestrator, trace_dir: impl Into<PathBuf>) -> Self {
        Self {
            orchestrator,
            trace_dir: trace_dir.into(),
        }
    }

    /// Run one case and write its trace
    pub fn run_case(&self, case: &EvalCase) -> Result<EvalOutcome> {
        log::info!("Running eval case: {}", case.name);
        let output = self.orchestrator.handle(&case.input);
        let passed = output_contains(&output, &case.expected_contains);

        fs::create_dir_all(&self.trace_dir)
            .with_context(|| format!("Failed to create trace directory: {}", self.trace_dir.display()))?;

        let trace_path = self.trace_dir.join(trace_file_name(&case.name));
        let trace = EvalTrace {
            test: case.clone(),
            output,
            passed,
            timestamp: Local::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&trace).context("Failed to serialize trace")?;
        fs::write(&trace_path, json).with_context(|| format!("Failed to write trace: {}", trace_path.display()))?;

        log::info!("Eval case '{}' {}", case.name, if passed { "passed" } else { "failed" });
        Ok(EvalOutcome {
            name: case.name.clone(),
            passed,
            trace_path,
        })
    }
}
