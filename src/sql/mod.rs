//! PostgreSQL schema editor rendering partition DDL.

use sqlparser::ast::{Ident, Value};

use crate::partitioning::{
    Category, CreatePartition, DatabaseError, MutationOutcome, PartitionBound,
    PartitionPredicate, SchemaEditor,
};


/// SQLSTATE raised when creating a table that already exists
pub const DUPLICATE_TABLE: &str = "42P07";
/// SQLSTATE raised when dropping a table that does not exist
pub const UNDEFINED_TABLE: &str = "42P01";

/// Error returned by a [`SqlConnection`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SqlError {
    /// SQLSTATE code, when the driver reports one
    pub code: Option<String>,
    pub message: String,
}

impl SqlError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    fn is(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Executes a single SQL statement.
pub trait SqlConnection {
    fn execute(&mut self, sql: &str) -> Result<(), SqlError>;
}

fn ident(name: &str) -> String {
    Ident::with_quote('"', name).to_string()
}

fn literal(value: &str) -> String {
    Value::SingleQuotedString(value.to_string()).to_string()
}

fn render_bound(bound: &PartitionBound) -> String {
    match bound {
        PartitionBound::Timestamp(dt) => literal(&dt.format("%Y-%m-%d %H:%M:%S+00:00").to_string()),
        PartitionBound::Category(Category::Int(value)) => value.to_string(),
        PartitionBound::Category(Category::Text(value)) => literal(value),
    }
}

fn join(bounds: &[PartitionBound]) -> String {
    bounds
        .iter()
        .map(render_bound)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_predicate(predicate: &PartitionPredicate) -> String {
    match predicate {
        PartitionPredicate::Range { from, to } => {
            format!("FROM ({}) TO ({})", join(from), join(to))
        }
        PartitionPredicate::List { values } => {
            let values: Vec<PartitionBound> = values
                .iter()
                .cloned()
                .map(PartitionBound::Category)
                .collect();
            format!("IN ({})", join(&values))
        }
    }
}

/// Statements attaching a new partition, the comment included.
///
/// The partition table is named `<table>_<name>`.
pub fn render_create_partition(request: &CreatePartition<'_>) -> Vec<String> {
    let partition_table = format!("{}_{}", request.table, request.name);

    let mut create = format!(
        "CREATE TABLE {} PARTITION OF {} FOR VALUES {}",
        ident(&partition_table),
        ident(request.table),
        render_predicate(request.predicate)
    );
    if let Some(key) = request.partition_by {
        let columns: Vec<String> = key.columns.iter().map(|c| ident(c)).collect();
        create.push_str(&format!(" PARTITION BY {} ({})", key.method.as_sql(), columns.join(", ")));
    }

    let mut statements = vec![create];
    if let Some(comment) = request.comment {
        statements.push(format!(
            "COMMENT ON TABLE {} IS {}",
            ident(&partition_table),
            literal(comment)
        ));
    }
    statements
}

pub fn render_delete_partition(table: &str, name: &str) -> String {
    format!("DROP TABLE {}", ident(&format!("{}_{}", table, name)))
}

fn database_error(e: SqlError) -> DatabaseError {
    match e.code {
        Some(code) => DatabaseError::new(format!("{} (SQLSTATE {})", e.message, code)),
        None => DatabaseError::new(e.message),
    }
}

/// [`SchemaEditor`] issuing PostgreSQL DDL over a connection.
pub struct SqlSchemaEditor<C> {
    connection: C,
}

impl<C: SqlConnection> SqlSchemaEditor<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn into_inner(self) -> C {
        self.connection
    }
}

impl<C: SqlConnection> SchemaEditor for SqlSchemaEditor<C> {
    fn create_partition(
        &mut self,
        request: &CreatePartition<'_>,
    ) -> Result<MutationOutcome, DatabaseError> {
        for (i, statement) in render_create_partition(request).iter().enumerate() {
            log::debug!("Executing: {}", statement);
            match self.connection.execute(statement) {
                Ok(()) => {}
                Err(e) if i == 0 && e.is(DUPLICATE_TABLE) => {
                    return Ok(MutationOutcome::AlreadyExists);
                }
                Err(e) => return Err(database_error(e)),
            }
        }
        Ok(MutationOutcome::Applied)
    }

    fn delete_partition(
        &mut self,
        table: &str,
        name: &str,
    ) -> Result<MutationOutcome, DatabaseError> {
        let statement = render_delete_partition(table, name);
        log::debug!("Executing: {}", statement);
        match self.connection.execute(&statement) {
            Ok(()) => Ok(MutationOutcome::Applied),
            Err(e) if e.is(UNDEFINED_TABLE) => Ok(MutationOutcome::NotFound),
            Err(e) => Err(database_error(e)),
        }
    }
}
