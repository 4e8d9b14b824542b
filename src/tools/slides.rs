//! Slide deck generation tool

use lazy_regex::regex_replace_all;
use serde_json::Value;
use std::sync::Arc;

use super::{ask, parse_json_output, text_field};
use crate::agent::Tool;
use crate::payload;
use crate::provider::CompletionProvider;

const TEMPERATURE: f32 = 0.4;

const DECK_FORMAT: &str = r#"{
  "slides": [
    {"title": "...", "bullets": ["...", "..."]},
    ...
  ]
}"#;

pub struct SlideGeneratorTool {
    provider: Arc<dyn CompletionProvider>,
}

impl SlideGeneratorTool {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

pub fn build_prompt(topic: &str, bullets: &[String]) -> String {
    if bullets.is_empty() {
        format!(
            r#"You are a presentation design assistant.

Create a slide deck based on the topic: "{topic}"

Each slide should include:
- Slide title
- 2–4 concise bullet points

Output must be valid JSON like this:
{DECK_FORMAT}"#
        )
    } else {
        let bullets = bullets.iter().map(|b| format!("- {}", b)).collect::<Vec<_>>().join("\n");
        format!(
            r#"You are a presentation design assistant.

Using the following bullet points, organize them into slides.

Bullets:
{bullets}

Each slide must include:
- Slide title
- 2–4 concise bullet points

Output format:
{DECK_FORMAT}"#
        )
    }
}

/// Drop trailing commas before `]` or `}`, a common LLM JSON slip
pub fn strip_trailing_commas(raw: &str) -> String {
    regex_replace_all!(r",\s*([\]}])", raw, |_, closer: &str| closer.to_string()).into_owned()
}

fn bullets_field(input: &Value) -> Vec<String> {
    match input.get("bullets") {
        Some(Value::Array(items)) => items.iter().map(payload::to_text).collect(),
        Some(Value::String(s)) => s.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

impl Tool for SlideGeneratorTool {
    fn call(&self, input: &Value) -> Value {
        let topic = text_field(input, "topic", "topic").unwrap_or_default();
        let bullets = bullets_field(input);

        if topic.is_empty() && bullets.is_empty() {
            return payload::error("Provide either a 'topic' or a list of 'bullets'.");
        }

        let prompt = build_prompt(&topic, &bullets);
        match ask(self.provider.as_ref(), "slide_generator", &prompt, TEMPERATURE) {
            Ok(raw) => parse_json_output(&strip_trailing_commas(raw.trim())),
            Err(error) => error,
        }
    }
}
