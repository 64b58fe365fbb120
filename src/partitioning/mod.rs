//! Partition planning engine

mod buckets;
mod catalog;
mod clock;
mod config;
mod manager;
mod memory;
mod naming;
mod partition;
mod plan;
mod size;
mod strategy;
mod table;

#[cfg(test)]
mod tests;

pub use buckets::{BackwardBuckets, ForwardBuckets, TimeBucket};
pub use catalog::{
    CatalogIntrospector, CreatePartition, IntrospectedPartition, MutationOutcome, SchemaEditor,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    PartitioningConfig, partition_by_category_and_current_time, partition_by_current_time,
    partition_by_current_time_and_categories,
};
pub use manager::PartitioningManager;
pub use memory::InMemoryCatalog;
pub use naming::{DEFAULT_CATEGORY_NAME_FORMAT, DEFAULT_LIST_NAME_FORMAT, default_name_format};
pub use partition::{
    Category, ListPartition, PartitionBound, PartitionPredicate, PartitionSpec,
    TimeCategoryPartition, TimePartition, TimeSubPartition,
};
pub use plan::{ApplyReport, ExecutionConflict, ModelPlan, Operation, Plan, Verb};
pub use size::{CalendarDelta, PartitionSize, PartitionUnit, SizeUnits};
pub use strategy::{
    CategoryCurrentTimeStrategy, CurrentTimeAndCategoryStrategy, CurrentTimeStrategy, Enumeration,
    PartitioningStrategy, RetentionAnchor, SpecIter,
};
pub use table::{PartitionKey, PartitionedTable, PartitioningMethod};

/// Comment attached to every partition created by [`Plan::apply`].
///
/// Only partitions carrying it are ever scheduled for deletion.
pub const AUTO_PARTITIONED_COMMENT: &str = "tsplan_auto_partitioned";

/// Common error type for partitioning operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid partitioning configuration: {0}")]
    Configuration(String),
    #[error("Cannot name partition: {0}")]
    Naming(String),
    #[error("Date out of range: {0}")]
    OutOfRange(String),
    #[error("Failed to introspect table {table}: {source}")]
    Introspection {
        table: String,
        #[source]
        source: DatabaseError,
    },
    #[error("Failed to {verb} partition {name} on {table} after {applied} applied operations: {source}")]
    Transaction {
        verb: Verb,
        table: String,
        name: String,
        applied: usize,
        #[source]
        source: DatabaseError,
    },
}

/// Failure reported by a database collaborator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DatabaseError {
    pub message: String,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
