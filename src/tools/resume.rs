//! Resume analysis tool

use serde_json::Value;
use std::sync::Arc;

use super::{ask, parse_json_output, text_field};
use crate::agent::Tool;
use crate::payload;
use crate::provider::CompletionProvider;

const TEMPERATURE: f32 = 0.3;

pub struct ResumeAnalyzerTool {
    provider: Arc<dyn CompletionProvider>,
}

impl ResumeAnalyzerTool {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

pub fn build_prompt(resume: &str, job_description: &str) -> String {
    format!(
        r#"You are an expert career advisor and resume reviewer.

Analyze the resume and job description below.

Resume:
{resume}

Job Description:
{job_description}

---

Return a JSON object with:
1. "match_score": score from 0 to 100 based on how well resume fits job
2. "summary": extracted summary with keys - skills, experience, education
3. "suggestions": list of 2-5 suggestions to improve the resume

Only return a valid JSON object. Do not explain anything."#
    )
}

impl Tool for ResumeAnalyzerTool {
    fn call(&self, input: &Value) -> Value {
        log::debug!("resume_analyzer received input: {}", input);

        let resume = text_field(input, "resume_text", "resume_text");
        let job_description = text_field(input, "job_description", "resume_text");

        let (Some(resume), Some(job_description)) = (resume, job_description) else {
            log::warn!("resume_analyzer missing input fields");
            return payload::error("Missing required input: resume_text or job_description");
        };

        let prompt = build_prompt(&resume, &job_description);
        match ask(self.provider.as_ref(), "resume_analyzer", &prompt, TEMPERATURE) {
            Ok(raw) => parse_json_output(raw.trim()),
            Err(error) => error,
        }
    }
}
