//! Boundary to the database: introspection and schema mutation.

use super::partition::PartitionPredicate;
use super::table::PartitionKey;
use super::DatabaseError;

/// A partition as currently reported by the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntrospectedPartition {
    pub name: String,
    pub lower_bound: Option<String>,
    pub upper_bound: Option<String>,
    pub comment: Option<String>,
}

impl IntrospectedPartition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower_bound: None,
            upper_bound: None,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Lists the partitions that currently exist.
///
/// Results are treated as ground truth and are only cached for the duration
/// of a single planning run.
pub trait CatalogIntrospector {
    /// Partitions attached to `table`, in catalog order. A table that does
    /// not exist has no partitions.
    fn list_partitions(&self, table: &str) -> Result<Vec<IntrospectedPartition>, DatabaseError>;
}

/// Request to attach a new partition to `table`.
#[derive(Clone, Copy, Debug)]
pub struct CreatePartition<'a> {
    pub table: &'a str,
    pub name: &'a str,
    pub predicate: &'a PartitionPredicate,
    /// Set when the new partition is itself partitioned.
    pub partition_by: Option<&'a PartitionKey>,
    pub comment: Option<&'a str>,
}

/// Result of a schema mutation that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    AlreadyExists,
    NotFound,
}

/// Executes partition DDL. Callers own the surrounding transaction.
pub trait SchemaEditor {
    /// Returns [`MutationOutcome::AlreadyExists`] if a partition named
    /// `request.name` is already attached.
    fn create_partition(
        &mut self,
        request: &CreatePartition<'_>,
    ) -> Result<MutationOutcome, DatabaseError>;

    /// Returns [`MutationOutcome::NotFound`] if there is no such partition.
    fn delete_partition(&mut self, table: &str, name: &str)
    -> Result<MutationOutcome, DatabaseError>;
}
