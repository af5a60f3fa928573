pub mod connection;
pub mod dsn;
pub mod remote;
pub mod sqlite;

pub use connection::{Connector, DbConnection};
pub use dsn::{DatabaseKind, DsnConnector};
pub use remote::SqlxConnector;
pub use sqlite::SqliteConnector;
