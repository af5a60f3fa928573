use super::{
    connection::{Connector, DbConnection},
    remote::SqlxConnector,
    sqlite::SqliteConnector,
};
use crate::errors::QueryError;
use async_trait::async_trait;
use std::fmt;

/// The database family a connection string points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
    Postgres,
    MySql,
}

impl DatabaseKind {
    /// Detects the driver from the scheme of a DSN-style connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let dsn = connection_string.trim();
        if dsn == ":memory:" {
            return Some(DatabaseKind::Sqlite);
        }
        let (scheme, _) = dsn.split_once(':')?;
        match scheme.to_ascii_lowercase().as_str() {
            "sqlite" | "file" => Some(DatabaseKind::Sqlite),
            "postgres" | "postgresql" => Some(DatabaseKind::Postgres),
            "mysql" | "mariadb" => Some(DatabaseKind::MySql),
            _ => None,
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseKind::Sqlite => f.write_str("SQLite"),
            DatabaseKind::Postgres => f.write_str("PostgreSQL"),
            DatabaseKind::MySql => f.write_str("MySQL"),
        }
    }
}

/// The default connector: picks the driver from the connection string's scheme.
#[derive(Clone, Debug, Default)]
pub struct DsnConnector {
    sqlite: SqliteConnector,
    remote: SqlxConnector,
}

impl DsnConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Connector for DsnConnector {
    fn name(&self) -> &str {
        "DSN"
    }

    async fn connect(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, QueryError> {
        match DatabaseKind::from_connection_string(connection_string) {
            Some(DatabaseKind::Sqlite) => self.sqlite.connect(connection_string).await,
            Some(DatabaseKind::Postgres | DatabaseKind::MySql) => {
                self.remote.connect(connection_string).await
            }
            None => Err(QueryError::ConnectionFailed(
                "unsupported connection string scheme".to_string(),
            )),
        }
    }
}
