use crate::{errors::QueryError, types::Row};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Opens short-lived connections to caller-supplied databases.
///
/// A connector holds no connection of its own: every call to [`Connector::connect`]
/// produces a fresh, single-use handle that the caller must [`DbConnection::close`].
#[async_trait]
pub trait Connector: Send + Sync + DynClone + Debug {
    /// Returns the name of the database driver (e.g., "SQLite", "PostgreSQL").
    fn name(&self) -> &str;

    /// Opens one connection described by `connection_string`.
    async fn connect(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, QueryError>;
}

dyn_clone::clone_trait_object!(Connector);

/// A live, owned connection used for exactly one query.
#[async_trait]
pub trait DbConnection: Send {
    /// Runs `sql` and collects every returned row.
    async fn fetch_rows(&mut self, sql: &str) -> Result<Vec<Row>, QueryError>;

    /// Releases the connection. Consumes the handle, so it can run at most once.
    async fn close(self: Box<Self>);
}
