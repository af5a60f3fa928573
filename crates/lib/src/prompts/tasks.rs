//! # Default Task Prompts
//!
//! This module contains the default, hardcoded prompt templates for the query
//! translation task. These are loaded programmatically and can be overridden by
//! `config.yml` or `prompt.yml`.

// --- Query Translation ---

/// Placeholders: none.
pub const QUERY_TRANSLATION_SYSTEM_PROMPT: &str = r#"You are an expert SQL analyst. You translate questions about a database into a single read-only SQL query that only uses the tables and columns you are given. You always answer in the exact three-section format you are asked for."#;

/// Placeholders: `{schema}`, `{question}`.
pub const QUERY_TRANSLATION_USER_PROMPT: &str = r#"Write a SQL query that answers the user's question using the database schema below.

# Rules
1. Use ONLY the tables and columns listed in the # Schema section. Never invent tables or columns.
2. Prefer semantic matches between the words in the question and the table and column names (e.g. "customers" may refer to a `clients` table, "cost" to a `price` column).
3. When combining tables, use LEFT JOINs.
4. Write a single SELECT statement. Never modify data.

# Schema
{schema}

# User question
{question}

# Output format
Return exactly three fenced sections, in this order and with these labels:

```explanation
A short explanation of how the query answers the question.
```

```sql
The SQL query.
```

```tables
A comma-separated list of the tables the query uses.
```"#;
