#![allow(dead_code)]
//! # Common Test Utilities
//!
//! This module provides shared utilities for testing, such as a mock AI provider
//! and a connector that counts opened and closed connections, to ensure tests are
//! isolated and repeatable.

use askdb::{
    providers::{
        ai::AiProvider,
        db::{Connector, DbConnection},
    },
    ColumnSchema, QueryError, Row, SchemaCatalog, TableSchema,
};
use async_trait::async_trait;
use dotenvy::dotenv;
use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Once, RwLock,
};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

// --- Mock AI Provider for Logic Testing ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<(String, String)>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }

    pub fn calls(&self) -> usize {
        self.call_history.read().unwrap().len()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, QueryError> {
        self.call_history
            .write()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        Ok(self.responses.write().unwrap().pop().unwrap_or_default())
    }
}

/// An AI provider whose every call fails, as if the network were down.
#[derive(Clone, Debug, Default)]
pub struct FailingAiProvider;

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, QueryError> {
        Err(QueryError::AiApi("503 Service Unavailable: quota exceeded".to_string()))
    }
}

/// Formats a reply in the three-section layout the translator expects.
pub fn model_reply(explanation: &str, sql: &str, tables: &str) -> String {
    format!(
        "```explanation\n{explanation}\n```\n\n```sql\n{sql}\n```\n\n```tables\n{tables}\n```"
    )
}

// --- Counting Connector for Executor Testing ---

/// What a mock connection does when asked to run a query.
#[derive(Clone, Debug)]
pub enum MockBehavior {
    Rows(Vec<Row>),
    Fail(String),
    Delay(Duration),
    RefuseConnection(String),
}

#[derive(Clone, Debug)]
pub struct CountingConnector {
    pub behavior: MockBehavior,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub executed: Arc<RwLock<Vec<String>>>,
}

impl CountingConnector {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            executed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for CountingConnector {
    fn name(&self) -> &str {
        "Counting"
    }

    async fn connect(&self, _connection_string: &str) -> Result<Box<dyn DbConnection>, QueryError> {
        if let MockBehavior::RefuseConnection(message) = &self.behavior {
            return Err(QueryError::ConnectionFailed(message.clone()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingConnection {
            behavior: self.behavior.clone(),
            closed: self.closed.clone(),
            executed: self.executed.clone(),
        }))
    }
}

struct CountingConnection {
    behavior: MockBehavior,
    closed: Arc<AtomicUsize>,
    executed: Arc<RwLock<Vec<String>>>,
}

#[async_trait]
impl DbConnection for CountingConnection {
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<Row>, QueryError> {
        self.executed.write().unwrap().push(sql.to_string());
        match &self.behavior {
            MockBehavior::Rows(rows) => Ok(rows.clone()),
            MockBehavior::Fail(message) => Err(QueryError::ExecutionError(message.clone())),
            MockBehavior::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Vec::new())
            }
            MockBehavior::RefuseConnection(_) => unreachable!("connection was refused"),
        }
    }

    async fn close(self: Box<Self>) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

// --- Fixtures ---

pub fn products_schema() -> SchemaCatalog {
    SchemaCatalog::new().with_table(TableSchema::new(
        "Products",
        vec![
            ColumnSchema::new("id", "INTEGER").primary_key(),
            ColumnSchema::new("name", "TEXT"),
            ColumnSchema::new("price", "REAL"),
        ],
    ))
}

pub fn product_row(id: i64, name: &str, price: f64) -> Row {
    match json!({ "id": id, "name": name, "price": price }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}
