//! Email drafting tool

use serde_json::{Value, json};
use std::sync::Arc;

use super::{ParseFailure, ask, text_field};
use crate::agent::Tool;
use crate::payload;
use crate::provider::CompletionProvider;

const TEMPERATURE: f32 = 0.3;

const FALLBACK_SUBJECT: &str = "Generated Email";

pub struct EmailTool {
    provider: Arc<dyn CompletionProvider>,
}

impl EmailTool {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

/// Subject and body split out of provider text
#[derive(Debug, PartialEq, Eq)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

pub fn build_prompt(purpose: &str, content: &str, tone: &str) -> String {
    format!(
        r#"You are an expert assistant that writes well-crafted, human-like emails.

Write an email with the following context:
- Purpose: {purpose}
- Tone: {tone}
- Content Brief: {content}

Return the output in this format:

Subject: <short subject line>
Body:
<email body>"#
    )
}

/// Split `Subject: ... Body: ...` text
pub fn parse_draft(text: &str) -> Result<EmailDraft, ParseFailure> {
    let (_, after_subject) = text.split_once("Subject:").ok_or(ParseFailure("missing 'Subject:'"))?;
    let (subject, body) = after_subject
        .split_once("Body:")
        .ok_or(ParseFailure("missing 'Body:' after 'Subject:'"))?;

    Ok(EmailDraft {
        subject: subject.trim().to_string(),
        body: body.trim().to_string(),
    })
}

impl Tool for EmailTool {
    fn call(&self, input: &Value) -> Value {
        let purpose = text_field(input, "purpose", "purpose");
        let content = text_field(input, "content", "purpose");
        let tone = text_field(input, "tone", "purpose").unwrap_or_else(|| "formal".to_string());

        let (Some(purpose), Some(content)) = (purpose, content) else {
            return payload::error("Missing required fields: purpose or content.");
        };

        let prompt = build_prompt(&purpose, &content, &tone);
        let response = match ask(self.provider.as_ref(), "email", &prompt, TEMPERATURE) {
            Ok(text) => text,
            Err(error) => return error,
        };

        let draft = parse_draft(&response).unwrap_or_else(|e| {
            log::warn!("Email output fallback: {}", e);
            EmailDraft {
                subject: FALLBACK_SUBJECT.to_string(),
                body: response.trim().to_string(),
            }
        });

        json!({ "subject": draft.subject, "body": draft.body })
    }
}
