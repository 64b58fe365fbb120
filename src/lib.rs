//! Partition planning for time and category partitioned tables.
//!
//! Strategies describe which partitions should exist relative to "now"; the
//! [`PartitioningManager`](partitioning::PartitioningManager) diffs that intent
//! against the live catalog and produces a [`Plan`](partitioning::Plan) of
//! create and delete operations.

pub mod partitioning;

#[cfg(feature = "sql")]
pub mod sql;

pub use partitioning::{
    Error, PartitioningConfig, PartitioningManager, PartitioningStrategy, Plan,
};
