//! Document question answering tool

use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

use super::{ask, text_field};
use crate::agent::Tool;
use crate::documents::{self, KeywordRetriever, PlainTextExtractor, Retriever, TextExtractor};
use crate::payload;
use crate::provider::CompletionProvider;

const TEMPERATURE: f32 = 0.2;

pub struct DocQaTool {
    provider: Arc<dyn CompletionProvider>,
    extractor: Box<dyn TextExtractor>,
    retriever: Box<dyn Retriever>,
}

impl DocQaTool {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_parts(provider, Box::new(PlainTextExtractor), Box::new(KeywordRetriever::default()))
    }

    pub fn with_parts(
        provider: Arc<dyn CompletionProvider>,
        extractor: Box<dyn TextExtractor>,
        retriever: Box<dyn Retriever>,
    ) -> Self {
        Self {
            provider,
            extractor,
            retriever,
        }
    }
}

pub fn build_prompt(context: &[String], question: &str) -> String {
    format!(
        r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{}

Question: {question}
Helpful Answer:"#,
        context.join("\n\n")
    )
}

impl Tool for DocQaTool {
    fn call(&self, input: &Value) -> Value {
        let pdf_path = text_field(input, "pdf_path", "pdf_path");
        let question = text_field(input, "question", "pdf_path");

        let (Some(pdf_path), Some(question)) = (pdf_path, question) else {
            return payload::error("Missing pdf_path or question");
        };

        let text = match self.extractor.extract_text(Path::new(&pdf_path)) {
            Ok(text) => text,
            Err(e) => return payload::error(format!("{:#}", e)),
        };

        let chunks = documents::split_chunks(&text, documents::CHUNK_SIZE, documents::CHUNK_OVERLAP);
        let sources = self.retriever.retrieve_relevant(&question, &chunks);
        log::debug!("doc_qa retrieved {} of {} chunks", sources.len(), chunks.len());

        let prompt = build_prompt(&sources, &question);
        match ask(self.provider.as_ref(), "doc_qa", &prompt, TEMPERATURE) {
            Ok(answer) => json!({ "answer": answer.trim(), "sources": sources }),
            Err(error) => error,
        }
    }
}
