//! # Translator
//!
//! Turns a natural-language question and a caller-described schema into a
//! [`GeneratedQuery`] with a single language-model call.

use crate::{
    constants::MAX_PROMPT_SAMPLE_ROWS,
    errors::QueryError,
    prompts::tasks::{QUERY_TRANSLATION_SYSTEM_PROMPT, QUERY_TRANSLATION_USER_PROMPT},
    providers::ai::AiProvider,
    types::{GeneratedQuery, SchemaCatalog, TableSchema},
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[ \t]*([A-Za-z]+)[ \t]*\r?\n([\s\S]*?)```").unwrap());

/// Builds schema-grounded prompts and parses the model's three-section reply.
#[derive(Debug, Clone)]
pub struct Translator {
    ai_provider: Box<dyn AiProvider>,
    system_prompt: String,
    user_prompt: String,
}

impl Translator {
    /// Creates a translator using the default prompt templates.
    pub fn new(ai_provider: Box<dyn AiProvider>) -> Self {
        Self {
            ai_provider,
            system_prompt: QUERY_TRANSLATION_SYSTEM_PROMPT.to_string(),
            user_prompt: QUERY_TRANSLATION_USER_PROMPT.to_string(),
        }
    }

    /// Replaces the prompt templates. The user template may use `{schema}` and
    /// `{question}` placeholders.
    pub fn with_prompts(mut self, system_prompt: String, user_prompt: String) -> Self {
        self.system_prompt = system_prompt;
        self.user_prompt = user_prompt;
        self
    }

    /// Asks the model for a query answering `question` against `schema`.
    ///
    /// Returns an error only for invalid input or a failed model call. A reply
    /// without a usable `sql` section is a normal result with an empty `sql`.
    pub async fn generate(
        &self,
        question: &str,
        schema: &SchemaCatalog,
    ) -> Result<GeneratedQuery, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::InvalidRequest(
                "`question` must not be empty".to_string(),
            ));
        }
        if schema.is_empty() {
            return Err(QueryError::EmptySchema);
        }

        info!(
            "[translate] received question over {} table(s): {:?}",
            schema.len(),
            question
        );

        let user_prompt = self
            .user_prompt
            .replace("{schema}", &format_schema(schema))
            .replace("{question}", question);

        debug!(system_prompt = %self.system_prompt, user_prompt = %user_prompt, "--> Sending prompts to AI Provider");

        let raw_response = self
            .ai_provider
            .generate(&self.system_prompt, &user_prompt)
            .await
            .inspect_err(|e| warn!("[translate] AI provider call failed: {e}"))?;

        debug!("<-- Reply from AI: {}", &raw_response);

        let generated = parse_response(&raw_response);
        if !generated.has_sql() {
            info!("[translate] model reply contained no sql section");
        }
        Ok(generated)
    }
}

/// Renders the catalog as the schema block of the prompt.
///
/// Each table becomes `Table: <name>` followed by its columns on one line;
/// tables are separated by a blank line.
pub fn format_schema(schema: &SchemaCatalog) -> String {
    schema
        .tables()
        .map(format_table)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_table(table: &TableSchema) -> String {
    let columns = table
        .columns
        .iter()
        .map(|column| {
            let mut rendered = format!("{} ({})", column.field, column.r#type);
            if column.is_primary_key {
                rendered.push_str(" (PRIMARY KEY)");
            }
            rendered
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut block = format!("Table: {}\nColumns: {}", table.name, columns);

    if !table.sample_rows.is_empty() {
        let samples = table
            .sample_rows
            .iter()
            .take(MAX_PROMPT_SAMPLE_ROWS)
            .filter_map(|row| serde_json::to_string(row).ok())
            .collect::<Vec<_>>()
            .join(", ");
        block.push_str("\nSample rows: ");
        block.push_str(&samples);
    }

    block
}

/// Extracts the `explanation`, `sql` and `tables` fenced sections from a reply.
///
/// Each section is optional. When a label appears more than once, the first
/// occurrence wins.
pub fn parse_response(raw: &str) -> GeneratedQuery {
    let mut explanation = None;
    let mut sql = None;
    let mut tables = None;

    for caps in SECTION_RE.captures_iter(raw) {
        let body = caps[2].trim().to_string();
        match caps[1].to_ascii_lowercase().as_str() {
            "explanation" if explanation.is_none() => explanation = Some(body),
            "sql" if sql.is_none() => sql = Some(body),
            "tables" if tables.is_none() => tables = Some(body),
            _ => {}
        }
    }

    let relevant_tables = tables
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    GeneratedQuery {
        sql: sql.unwrap_or_default(),
        explanation: explanation.unwrap_or_default(),
        relevant_tables,
    }
}
