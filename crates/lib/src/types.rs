use crate::{
    constants::NO_QUERY_MESSAGE,
    errors::{FailureKind, QueryError},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single result row: column name to JSON value, in column order.
pub type Row = Map<String, Value>;

/// One column of a caller-described table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub field: String,
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(default)]
    pub is_primary_key: bool,
}

impl ColumnSchema {
    pub fn new(field: impl Into<String>, r#type: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            r#type: r#type.into(),
            is_primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }
}

/// A caller-described table, used only to ground the translation prompt.
///
/// The `name` is not part of the wire form; it is filled in from the key the
/// table is stored under in the [`SchemaCatalog`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
    #[serde(rename = "sampleData", default, skip_serializing_if = "Vec::is_empty")]
    pub sample_rows: Vec<Row>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.into(),
            columns,
            sample_rows: Vec::new(),
        }
    }

    pub fn with_sample_rows(mut self, rows: Vec<Row>) -> Self {
        self.sample_rows = rows;
        self
    }
}

/// The table catalog supplied with a request, keyed by table name.
///
/// Tables are kept sorted by name so that the rendered prompt is stable for a
/// given catalog regardless of the order the caller listed them in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, TableSchema>", into = "BTreeMap<String, TableSchema>")]
pub struct SchemaCatalog {
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any previous table with the same name.
    pub fn insert(&mut self, table: TableSchema) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.insert(table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl From<BTreeMap<String, TableSchema>> for SchemaCatalog {
    fn from(map: BTreeMap<String, TableSchema>) -> Self {
        let tables = map
            .into_iter()
            .map(|(name, mut table)| {
                table.name = name.clone();
                (name, table)
            })
            .collect();
        Self { tables }
    }
}

impl From<SchemaCatalog> for BTreeMap<String, TableSchema> {
    fn from(catalog: SchemaCatalog) -> Self {
        catalog.tables
    }
}

/// The parsed reply of the translation model.
///
/// Every field is independently optional: an empty `sql` means the model could
/// not answer, which is a normal result rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuery {
    pub sql: String,
    pub explanation: String,
    pub relevant_tables: Vec<String>,
}

impl GeneratedQuery {
    pub fn has_sql(&self) -> bool {
        !self.sql.trim().is_empty()
    }
}

/// The result of running one query through the guarded executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionOutcome {
    Success { rows: Vec<Row> },
    Failure { kind: FailureKind, message: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<QueryError> for ExecutionOutcome {
    fn from(err: QueryError) -> Self {
        ExecutionOutcome::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// The request contract: one question against one caller-supplied database.
///
/// All fields default to empty so that a missing field is reported as an
/// `InvalidRequest` by [`AskRequest::validate`] instead of a deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub connection_string: String,
    #[serde(default)]
    pub schema: Option<SchemaCatalog>,
}

impl AskRequest {
    /// Checks the request before any model or database call is made.
    pub fn validate(&self) -> Result<&SchemaCatalog, QueryError> {
        if self.question.trim().is_empty() {
            return Err(QueryError::InvalidRequest(
                "`question` is required".to_string(),
            ));
        }
        if self.connection_string.trim().is_empty() {
            return Err(QueryError::InvalidRequest(
                "`connectionString` is required".to_string(),
            ));
        }
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| QueryError::InvalidRequest("`schema` is required".to_string()))?;
        if schema.is_empty() {
            return Err(QueryError::EmptySchema);
        }
        Ok(schema)
    }
}

/// The response contract returned for every request that got past validation
/// and translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_tables: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl AskResponse {
    pub fn succeeded(query: GeneratedQuery, rows: Vec<Row>) -> Self {
        Self {
            success: true,
            results: Some(rows),
            sql: Some(query.sql),
            explanation: query.explanation,
            relevant_tables: Some(query.relevant_tables),
            message: None,
            kind: None,
        }
    }

    pub fn no_query(query: GeneratedQuery) -> Self {
        Self {
            success: false,
            results: None,
            sql: None,
            explanation: query.explanation,
            relevant_tables: None,
            message: Some(NO_QUERY_MESSAGE.to_string()),
            kind: Some(FailureKind::NoQueryGenerated),
        }
    }

    pub fn failed(query: GeneratedQuery, kind: FailureKind, message: String) -> Self {
        Self {
            success: false,
            results: None,
            sql: Some(query.sql),
            explanation: query.explanation,
            relevant_tables: None,
            message: Some(message),
            kind: Some(kind),
        }
    }
}
