use anyhow::{anyhow, Result};
use askdb::{ColumnSchema, SchemaCatalog, TableSchema};
use std::path::PathBuf;
use tempfile::TempDir;

// --- Test Database ---

const PRODUCTS_SEED: &[&str] = &[
    "CREATE TABLE Products (id INTEGER PRIMARY KEY, name TEXT NOT NULL, price REAL)",
    "INSERT INTO Products (id, name, price) VALUES (1, 'Widget', 9.5)",
    "INSERT INTO Products (id, name, price) VALUES (2, 'Gadget', 12.0)",
    "INSERT INTO Products (id, name, price) VALUES (3, 'Gizmo', 4.25)",
];

/// A SQLite file in a temporary directory, seeded with a `Products` table.
///
/// The directory is removed when the value is dropped.
pub struct TestDatabase {
    pub path: PathBuf,
    _dir: TempDir,
}

impl TestDatabase {
    /// Creates the database and inserts three products.
    pub async fn products() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("shop.db");
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("temporary path is not valid UTF-8"))?;

        let db = turso::Builder::new_local(path_str).build().await?;
        let conn = db.connect()?;
        for statement in PRODUCTS_SEED {
            conn.execute(statement, ()).await?;
        }

        Ok(Self { path, _dir: dir })
    }

    /// The connection string a client would send for this database.
    pub fn connection_string(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    /// The schema description matching the seeded table.
    pub fn schema() -> SchemaCatalog {
        SchemaCatalog::new().with_table(TableSchema::new(
            "Products",
            vec![
                ColumnSchema::new("id", "INTEGER").primary_key(),
                ColumnSchema::new("name", "TEXT"),
                ColumnSchema::new("price", "REAL"),
            ],
        ))
    }
}

/// Formats a reply in the three-section layout the translator expects.
pub fn model_reply(explanation: &str, sql: &str, tables: &str) -> String {
    format!("```explanation\n{explanation}\n```\n```sql\n{sql}\n```\n```tables\n{tables}\n```")
}
