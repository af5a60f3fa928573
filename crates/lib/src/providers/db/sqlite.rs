use super::connection::{Connector, DbConnection};
use crate::{errors::QueryError, types::Row};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{self, Debug};
use std::path::Path;
use tracing::debug;
use turso::{Connection, Database, Value as TursoValue};

const MEMORY_PATH: &str = ":memory:";

/// Opens connections to existing SQLite database files using Turso.
///
/// Accepted forms: `sqlite::memory:`, `:memory:`, `sqlite://<path>`, `sqlite:<path>`
/// and `file:<path>`. Query-string options (`?mode=ro`) are ignored.
#[derive(Clone, Debug, Default)]
pub struct SqliteConnector;

impl SqliteConnector {
    /// Extracts the database path from a SQLite connection string.
    pub fn database_path(connection_string: &str) -> Result<String, QueryError> {
        let dsn = connection_string.trim();
        let rest = dsn
            .strip_prefix("sqlite://")
            .or_else(|| dsn.strip_prefix("sqlite:"))
            .or_else(|| dsn.strip_prefix("file://"))
            .or_else(|| dsn.strip_prefix("file:"))
            .unwrap_or(dsn);
        let path = rest.split('?').next().unwrap_or_default().trim();
        if path.is_empty() {
            return Err(QueryError::ConnectionFailed(
                "SQLite connection string has no database path".to_string(),
            ));
        }
        Ok(path.to_string())
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn connect(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, QueryError> {
        let path = Self::database_path(connection_string)?;
        // Opening a missing file would create it.
        if path != MEMORY_PATH && !Path::new(&path).exists() {
            return Err(QueryError::ConnectionFailed(
                "database file not found".to_string(),
            ));
        }
        debug!(path = %path, "--> Opening SQLite connection");
        let db = turso::Builder::new_local(&path)
            .build()
            .await
            .map_err(|e| QueryError::ConnectionFailed(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| QueryError::ConnectionFailed(e.to_string()))?;
        Ok(Box::new(SqliteConnection { _db: db, conn }))
    }
}

/// A single SQLite connection. The `Database` is kept alive alongside it and
/// dropped together with it on close.
struct SqliteConnection {
    _db: Database,
    conn: Connection,
}

impl Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection").finish_non_exhaustive()
    }
}

/// Converts a Turso value to a serde_json::Value.
fn turso_value_to_json(v: TursoValue) -> Value {
    match v {
        TursoValue::Null => Value::Null,
        TursoValue::Integer(i) => Value::Number(i.into()),
        TursoValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        TursoValue::Text(s) => Value::String(s),
        TursoValue::Blob(_) => Value::String("<blob>".to_string()),
    }
}

#[async_trait]
impl DbConnection for SqliteConnection {
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<Row>, QueryError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .await
            .map_err(|e| QueryError::ExecutionError(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let mut rows = stmt
            .query(())
            .await
            .map_err(|e| QueryError::ExecutionError(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| QueryError::ExecutionError(e.to_string()))?
        {
            let mut row_map = Row::new();
            for (i, name) in column_names.iter().enumerate() {
                let value = row
                    .get_value(i)
                    .map_err(|e| QueryError::ExecutionError(e.to_string()))?;
                row_map.insert(name.clone(), turso_value_to_json(value));
            }
            results.push(row_map);
        }
        Ok(results)
    }

    async fn close(self: Box<Self>) {
        debug!("<-- Closing SQLite connection");
        drop(self);
    }
}
