//! # Read-Only Query Guard
//!
//! A purely textual safety check applied to every generated query before a
//! connection is opened. A query passes only if it starts with `SELECT` and
//! contains none of the blocked keywords as a whole word.
//!
//! The check does not parse SQL: it does not strip comments and it does not
//! detect several statements joined with `;`. A blocked keyword inside a comment
//! or a string literal still rejects the query.

use crate::{
    constants::{ALLOWED_OPERATION, BLOCKED_KEYWORDS},
    errors::UnsafeReason,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Word boundaries are ASCII: only `[A-Za-z0-9_]` counts as part of a word.
static BLOCKED_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?:^|[^A-Za-z0-9_])({})(?:[^A-Za-z0-9_]|$)",
        BLOCKED_KEYWORDS.join("|")
    );
    Regex::new(&pattern).unwrap()
});

/// Collapses whitespace runs into single spaces, trims, and uppercases the result.
///
/// The returned string is only used for matching; callers execute the original.
pub fn normalize(sql: &str) -> String {
    WHITESPACE_RE.replace_all(sql, " ").trim().to_uppercase()
}

/// Returns `Ok(())` if `sql` is allowed to run, or the reason it is refused.
pub fn validate(sql: &str) -> Result<(), UnsafeReason> {
    let normalized = normalize(sql);

    if !normalized.starts_with(ALLOWED_OPERATION) {
        warn!("Rejected query: does not start with {ALLOWED_OPERATION}");
        return Err(UnsafeReason::NotAllowedOperation);
    }

    if let Some(found) = BLOCKED_KEYWORD_RE
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
    {
        let keyword = found.as_str().to_string();
        warn!(keyword = %keyword, "Rejected query: contains a blocked keyword");
        return Err(UnsafeReason::BlockedKeyword(keyword));
    }

    Ok(())
}

/// Convenience wrapper over [`validate`].
pub fn is_safe(sql: &str) -> bool {
    validate(sql).is_ok()
}
