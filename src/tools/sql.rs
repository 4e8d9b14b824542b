//! SQL generation tool

use serde_json::{Value, json};
use std::sync::Arc;

use super::{ask, text_field};
use crate::agent::Tool;
use crate::payload;
use crate::provider::CompletionProvider;

const TEMPERATURE: f32 = 0.2;

pub struct SqlGeneratorTool {
    provider: Arc<dyn CompletionProvider>,
}

impl SqlGeneratorTool {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

pub fn build_prompt(instruction: &str, table_schema: &str, dialect: &str) -> String {
    let table_schema = if table_schema.is_empty() { "Not provided" } else { table_schema };
    let dialect = if dialect.is_empty() { "PostgreSQL" } else { dialect };

    format!(
        r#"You are a senior data engineer skilled in SQL.

Generate a SQL query based on the user's request.

Instruction:
{instruction}

Table Schema:
{table_schema}

SQL Dialect: {dialect}

Only return valid SQL. Do not include any explanation or formatting."#
    )
}

/// Strip code fences and make sure the statement is terminated
pub fn clean_sql(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```sql")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    if unfenced.contains(';') {
        unfenced.to_string()
    } else {
        format!("{};", unfenced)
    }
}

impl Tool for SqlGeneratorTool {
    fn call(&self, input: &Value) -> Value {
        let Some(instruction) = text_field(input, "instruction", "instruction") else {
            return payload::error("Missing 'instruction' input.");
        };
        let table_schema = text_field(input, "table_schema", "instruction").unwrap_or_default();
        let dialect = text_field(input, "dialect", "instruction").unwrap_or_else(|| "PostgreSQL".to_string());

        let prompt = build_prompt(&instruction, &table_schema, &dialect);
        match ask(self.provider.as_ref(), "sql_generator", &prompt, TEMPERATURE) {
            Ok(raw) => json!({ "sql": clean_sql(&raw) }),
            Err(error) => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedProvider;

    #[test]
    fn test_clean_sql_appends_semicolon() {
        assert_eq!(clean_sql("  SELECT 1 "), "SELECT 1;");
        assert_eq!(clean_sql("SELECT 1;"), "SELECT 1;");
    }

    #[test]
    fn test_clean_sql_strips_fences() {
        assert_eq!(clean_sql("```sql\nSELECT * FROM t\n```"), "SELECT * FROM t;");
        assert_eq!(clean_sql("```\nSELECT 2;\n```"), "SELECT 2;");
    }

    #[test]
    fn test_prompt_defaults() {
        let prompt = build_prompt("top customers", "", "");
        assert!(prompt.contains("Table Schema:\nNot provided"));
        assert!(prompt.contains("SQL Dialect: PostgreSQL"));
    }

    #[test]
    fn test_call() {
        let provider = ScriptedProvider::new(&["SELECT name FROM customers ORDER BY revenue DESC LIMIT 5"]);
        let tool = SqlGeneratorTool::new(provider.clone());

        let out = tool.call(&json!({
            "instruction": "Get top 5 customers by revenue",
            "table_schema": "customers(id, name, revenue)",
            "dialect": "SQLite"
        }));

        assert_eq!(out["sql"], "SELECT name FROM customers ORDER BY revenue DESC LIMIT 5;");
        assert!(provider.prompts()[0].contains("SQL Dialect: SQLite"));
        assert_eq!(provider.calls.lock().unwrap()[0].1.temperature, 0.2);
    }

    #[test]
    fn test_call_missing_instruction() {
        let provider = ScriptedProvider::new(&[]);
        let tool = SqlGeneratorTool::new(provider);
        assert_eq!(tool.call(&json!({}))["error"], "Missing 'instruction' input.");
    }
}
