//! # Natural Language to SQL
//!
//! This crate turns a free-text question into a read-only SQL query with a
//! configurable AI provider, checks that the query cannot modify the target
//! database, and runs it against a caller-supplied database under a timeout.
//!
//! The pipeline has two independent stages:
//!
//! 1. [`translator::Translator`] renders the caller's schema into a prompt and
//!    parses the model's reply into a [`GeneratedQuery`].
//! 2. [`executor::GuardedExecutor`] validates the query with [`guard`], opens a
//!    single connection, runs the query and always closes the connection.
//!
//! [`AskClient`] wires both stages together behind the request contract.

pub mod constants;
pub mod errors;
pub mod executor;
pub mod guard;
pub mod prompts;
pub mod providers;
pub mod translator;
pub mod types;

pub use errors::{FailureKind, QueryError, UnsafeReason};
pub use executor::GuardedExecutor;
pub use translator::Translator;
pub use types::{
    AskRequest, AskResponse, ColumnSchema, ExecutionOutcome, GeneratedQuery, Row, SchemaCatalog,
    TableSchema,
};

use providers::{
    ai::AiProvider,
    db::{Connector, DsnConnector},
};
use std::time::Duration;
use tracing::info;

/// Runs questions through translation and guarded execution.
///
/// The client is stateless between calls: the schema and connection string
/// arrive with every request and nothing is cached.
#[derive(Debug, Clone)]
pub struct AskClient {
    translator: Translator,
    executor: GuardedExecutor,
}

impl AskClient {
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn executor(&self) -> &GuardedExecutor {
        &self.executor
    }

    /// Answers one request.
    ///
    /// Returns `Err` for the failures that happen before a query exists:
    /// `InvalidRequest`, `EmptySchema` and `TranslationUnavailable`. Everything
    /// after translation, including "no query could be generated", is reported
    /// in the returned [`AskResponse`].
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, QueryError> {
        let schema = request.validate()?;

        let query = self.translator.generate(&request.question, schema).await?;
        if !query.has_sql() {
            return Ok(AskResponse::no_query(query));
        }

        info!(
            "[ask] generated query over tables {:?}",
            query.relevant_tables
        );

        let outcome = self
            .executor
            .run(&query.sql, &request.connection_string)
            .await;

        Ok(match outcome {
            ExecutionOutcome::Success { rows } => AskResponse::succeeded(query, rows),
            ExecutionOutcome::Failure { kind, message } => {
                AskResponse::failed(query, kind, message)
            }
        })
    }

    /// Convenience wrapper that accepts the request as JSON.
    pub async fn ask_from_value(&self, value: serde_json::Value) -> Result<AskResponse, QueryError> {
        let request: AskRequest = serde_json::from_value(value)?;
        self.ask(&request).await
    }
}

/// A builder for creating `AskClient` instances.
#[derive(Default)]
pub struct AskClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    connector: Option<Box<dyn Connector>>,
    prompts: Option<(String, String)>,
    query_timeout: Option<Duration>,
}

impl AskClientBuilder {
    /// Creates a new `AskClientBuilder`.
    ///
    /// # Examples
    ///
    /// ```
    /// use askdb::AskClientBuilder;
    ///
    /// let builder = AskClientBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the AI provider used for translation. Required.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the connector used to open database connections.
    /// Defaults to [`DsnConnector`], which picks a driver from the connection string.
    pub fn connector(mut self, connector: Box<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Overrides the translation prompt templates.
    pub fn prompts(mut self, system_prompt: String, user_prompt: String) -> Self {
        self.prompts = Some((system_prompt, user_prompt));
        self
    }

    /// Overrides the per-query deadline.
    pub fn query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = Some(query_timeout);
        self
    }

    /// Builds the `AskClient`, failing if no AI provider was configured.
    pub fn build(self) -> Result<AskClient, QueryError> {
        let ai_provider = self.ai_provider.ok_or_else(|| {
            QueryError::MissingAiProvider("an AI provider must be set on the builder".to_string())
        })?;

        let mut translator = Translator::new(ai_provider);
        if let Some((system_prompt, user_prompt)) = self.prompts {
            translator = translator.with_prompts(system_prompt, user_prompt);
        }

        let connector = self
            .connector
            .unwrap_or_else(|| Box::new(DsnConnector::new()));
        let mut executor = GuardedExecutor::new(connector);
        if let Some(query_timeout) = self.query_timeout {
            executor = executor.with_timeout(query_timeout);
        }

        Ok(AskClient {
            translator,
            executor,
        })
    }
}
