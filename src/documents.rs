//! Document text extraction and passage retrieval for document QA
//!
//! Both are narrow seams: [`TextExtractor`] turns a path into text and
//! [`Retriever`] picks the passages most relevant to a question. The builtin
//! implementations read plain text and rank passages by term overlap.

use eyre::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 50;

pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String>;
}

pub trait Retriever: Send + Sync {
    fn retrieve_relevant(&self, query: &str, corpus: &[String]) -> Vec<String>;
}

/// Reads UTF-8 text documents
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let is_pdf = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            eyre::bail!("Failed to extract text: PDF extraction is not available, supply a text export of {}", path.display());
        }

        let text = fs::read_to_string(path).with_context(|| format!("Failed to extract text from {}", path.display()))?;
        Ok(text.trim().to_string())
    }
}

/// Ranks passages by how many distinct query terms they contain
pub struct KeywordRetriever {
    pub top_k: usize,
}

impl Default for KeywordRetriever {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

impl Retriever for KeywordRetriever {
    fn retrieve_relevant(&self, query: &str, corpus: &[String]) -> Vec<String> {
        let query_terms = terms(query);

        let mut scored: Vec<(usize, &String)> = corpus
            .iter()
            .map(|chunk| (query_terms.intersection(&terms(chunk)).count(), chunk))
            .collect();

        // Stable sort keeps document order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(self.top_k).map(|(_, chunk)| chunk.clone()).collect()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Split text into overlapping character windows
pub fn split_chunks(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }

    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}
