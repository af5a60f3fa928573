//! # Guarded Executor
//!
//! Runs a generated query against the caller's database: validate, connect,
//! execute under a deadline, close. Every failure is returned as an
//! [`ExecutionOutcome::Failure`] rather than raised.

use crate::{
    constants::DEFAULT_QUERY_TIMEOUT_SECS,
    errors::QueryError,
    guard,
    providers::db::{Connector, DatabaseKind, DbConnection, DsnConnector},
    types::{ExecutionOutcome, Row},
};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Upper bound on how long releasing a connection may take after the query.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct GuardedExecutor {
    connector: Box<dyn Connector>,
    query_timeout: Duration,
}

impl Default for GuardedExecutor {
    fn default() -> Self {
        Self::new(Box::new(DsnConnector::new()))
    }
}

impl GuardedExecutor {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Validates `sql` and, if it is read-only, runs it over a fresh connection.
    pub async fn run(&self, sql: &str, connection_string: &str) -> ExecutionOutcome {
        match self.try_run(sql, connection_string).await {
            Ok(rows) => {
                info!("[execute] query returned {} row(s)", rows.len());
                ExecutionOutcome::Success { rows }
            }
            Err(e) => {
                warn!(kind = %e.kind(), "[execute] query failed: {e}");
                e.into()
            }
        }
    }

    async fn try_run(&self, sql: &str, connection_string: &str) -> Result<Vec<Row>, QueryError> {
        guard::validate(sql).map_err(QueryError::UnsafeQuery)?;

        let driver = DatabaseKind::from_connection_string(connection_string)
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        debug!(
            connector = self.connector.name(),
            driver = %driver,
            sql = %sql,
            "--> Opening connection for validated query"
        );

        let conn = match timeout(self.query_timeout, self.connector.connect(connection_string)).await
        {
            Ok(conn) => conn?,
            Err(_) => {
                return Err(QueryError::ConnectionFailed(format!(
                    "timed out after {}s while connecting",
                    self.query_timeout.as_secs_f64()
                )))
            }
        };

        self.execute_and_close(conn, sql).await
    }

    /// Races the query against the deadline, then releases the connection
    /// whichever way the race ended.
    async fn execute_and_close(
        &self,
        mut conn: Box<dyn DbConnection>,
        sql: &str,
    ) -> Result<Vec<Row>, QueryError> {
        let result = timeout(self.query_timeout, conn.fetch_rows(sql)).await;

        if timeout(CLOSE_GRACE, conn.close()).await.is_err() {
            warn!("[execute] connection close did not finish within {CLOSE_GRACE:?}");
        }

        match result {
            Ok(rows) => rows,
            Err(_) => Err(QueryError::Timeout(self.query_timeout)),
        }
    }
}
