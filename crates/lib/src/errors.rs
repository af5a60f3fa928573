use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The failure taxonomy shared by the library, the server and the CLI.
///
/// These are kinds, not error types: several `QueryError` variants may map to
/// the same kind, and `NoQueryGenerated` is never raised as an error at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidRequest,
    EmptySchema,
    TranslationUnavailable,
    NoQueryGenerated,
    UnsafeQuery,
    ConnectionFailed,
    Timeout,
    ExecutionError,
}

impl FailureKind {
    /// Whether the caller may simply retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::TranslationUnavailable | FailureKind::Timeout)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::InvalidRequest => "InvalidRequest",
            FailureKind::EmptySchema => "EmptySchema",
            FailureKind::TranslationUnavailable => "TranslationUnavailable",
            FailureKind::NoQueryGenerated => "NoQueryGenerated",
            FailureKind::UnsafeQuery => "UnsafeQuery",
            FailureKind::ConnectionFailed => "ConnectionFailed",
            FailureKind::Timeout => "Timeout",
            FailureKind::ExecutionError => "ExecutionError",
        };
        f.write_str(name)
    }
}

/// Why the safety guard refused a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsafeReason {
    /// The query does not begin with `SELECT`.
    NotAllowedOperation,
    /// The query contains a mutating or DDL keyword as a whole word.
    BlockedKeyword(String),
}

impl fmt::Display for UnsafeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsafeReason::NotAllowedOperation => {
                write!(f, "Query does not start with an allowed operation")
            }
            UnsafeReason::BlockedKeyword(keyword) => {
                write!(f, "Query contains a blocked keyword: {keyword}")
            }
        }
    }
}

/// Custom error types for the library.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Schema must describe at least one table")]
    EmptySchema,
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
    #[error("{0}")]
    UnsafeQuery(UnsafeReason),
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),
    #[error("Query timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("Query execution failed: {0}")]
    ExecutionError(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl QueryError {
    /// Maps this error onto the shared failure taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            QueryError::InvalidRequest(_) | QueryError::JsonSerialization(_) => {
                FailureKind::InvalidRequest
            }
            QueryError::EmptySchema => FailureKind::EmptySchema,
            QueryError::ReqwestClientBuild(_)
            | QueryError::AiRequest(_)
            | QueryError::AiDeserialization(_)
            | QueryError::AiApi(_)
            | QueryError::MissingAiProvider(_) => FailureKind::TranslationUnavailable,
            QueryError::UnsafeQuery(_) => FailureKind::UnsafeQuery,
            QueryError::ConnectionFailed(_) => FailureKind::ConnectionFailed,
            QueryError::Timeout(_) => FailureKind::Timeout,
            QueryError::ExecutionError(_) => FailureKind::ExecutionError,
        }
    }
}
