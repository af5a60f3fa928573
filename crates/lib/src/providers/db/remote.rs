use super::connection::{Connector, DbConnection};
use crate::{errors::QueryError, types::Row};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    any::AnyRow,
    AnyConnection, Column, Connection, Row as _,
};
use std::sync::Once;
use tracing::{debug, warn};

static INSTALL_DRIVERS: Once = Once::new();

/// Opens connections to PostgreSQL and MySQL servers through sqlx's `Any` driver.
#[derive(Clone, Debug, Default)]
pub struct SqlxConnector;

#[async_trait]
impl Connector for SqlxConnector {
    fn name(&self) -> &str {
        "sqlx"
    }

    async fn connect(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, QueryError> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
        let dsn = connection_string.trim();
        // The MySQL driver serves MariaDB but only registers the `mysql` scheme.
        let dsn = match dsn.get(..8) {
            Some(prefix) if prefix.eq_ignore_ascii_case("mariadb:") => {
                format!("mysql:{}", &dsn[8..])
            }
            _ => dsn.to_string(),
        };
        let conn = AnyConnection::connect(&dsn)
            .await
            .map_err(|e| QueryError::ConnectionFailed(e.to_string()))?;
        debug!(backend = conn.backend_name(), "--> Opened database connection");
        Ok(Box::new(SqlxConnection { conn }))
    }
}

struct SqlxConnection {
    conn: AnyConnection,
}

/// Decodes one column of an `AnyRow` into JSON, trying the types the `Any`
/// driver knows about from the most to the least specific.
fn any_value_to_json(row: &AnyRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v
            .map(|_| Value::String("<blob>".to_string()))
            .unwrap_or(Value::Null);
    }
    Value::Null
}

#[async_trait]
impl DbConnection for SqlxConnection {
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<Row>, QueryError> {
        let rows: Vec<AnyRow> = sqlx::query(sql)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| QueryError::ExecutionError(e.to_string()))?;

        let results = rows
            .iter()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| {
                        (
                            column.name().to_string(),
                            any_value_to_json(row, column.ordinal()),
                        )
                    })
                    .collect::<Row>()
            })
            .collect();
        Ok(results)
    }

    async fn close(self: Box<Self>) {
        debug!("<-- Closing database connection");
        if let Err(e) = self.conn.close().await {
            warn!("Database connection did not close cleanly: {e}");
        }
    }
}
