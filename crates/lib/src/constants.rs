//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the `askdb` workspace, so the server, the CLI and the tests agree on limits and
//! user-facing messages.

/// The wall-clock deadline for a single query, in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// The only statement verb a generated query may start with.
pub const ALLOWED_OPERATION: &str = "SELECT";

/// Keywords that reject a query when they appear anywhere as a whole word.
pub const BLOCKED_KEYWORDS: &[&str] = &[
    "DROP",
    "DELETE",
    "TRUNCATE",
    "UPDATE",
    "INSERT",
    "ALTER",
    "CREATE",
    "RENAME",
    "REPLACE",
    "PROCEDURE",
    "FUNCTION",
    "TRIGGER",
];

/// How many sample rows per table are rendered into the translation prompt.
pub const MAX_PROMPT_SAMPLE_ROWS: usize = 3;

/// Returned to the caller when the model produced no SQL section.
pub const NO_QUERY_MESSAGE: &str = "no query could be generated";
