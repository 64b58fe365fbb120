//! In-memory partition catalog.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use super::catalog::{
    CatalogIntrospector, CreatePartition, IntrospectedPartition, MutationOutcome, SchemaEditor,
};
use super::partition::{PartitionBound, PartitionPredicate};
use super::DatabaseError;

#[derive(Clone, Debug, Default)]
struct CatalogState {
    /// Partitioned tables and their partitions in creation order
    tables: BTreeMap<String, Vec<IntrospectedPartition>>,
    /// Partition name -> error returned when it is created or deleted
    failures: HashMap<String, String>,
}

impl CatalogState {
    fn drop_table(&mut self, table: &str) {
        if let Some(partitions) = self.tables.remove(table) {
            for partition in partitions {
                self.drop_table(&format!("{}_{}", table, partition.name));
            }
        }
    }
}

/// Catalog and schema editor backed by memory.
///
/// A partition created with `partition_by` becomes a partitioned table
/// itself, named `<table>_<partition>`, and is dropped with its parent.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a partitioned root table.
    pub fn create_table(&self, table: &str) {
        self.state
            .lock()
            .tables
            .entry(table.to_string())
            .or_default();
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.state.lock().tables.contains_key(table)
    }

    pub fn partitions(&self, table: &str) -> Vec<IntrospectedPartition> {
        self.state
            .lock()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn partition_names(&self, table: &str) -> Vec<String> {
        self.partitions(table)
            .into_iter()
            .map(|partition| partition.name)
            .collect()
    }

    /// Attaches a partition directly, bypassing planning.
    pub fn insert_partition(&self, table: &str, partition: IntrospectedPartition) {
        self.state
            .lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(partition);
    }

    /// Makes every create or delete of `name` fail with `message`.
    pub fn fail_on(&self, name: &str, message: &str) {
        self.state
            .lock()
            .failures
            .insert(name.to_string(), message.to_string());
    }

    /// Runs `f` and restores the previous tables if it fails.
    pub fn atomic<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let snapshot = self.state.lock().tables.clone();
        let result = f(self);
        if result.is_err() {
            log::debug!("Rolling back in-memory catalog");
            self.state.lock().tables = snapshot;
        }
        result
    }
}

fn render_bounds(bounds: &[PartitionBound]) -> String {
    bounds
        .iter()
        .map(|bound| bound.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CatalogIntrospector for InMemoryCatalog {
    fn list_partitions(&self, table: &str) -> Result<Vec<IntrospectedPartition>, DatabaseError> {
        Ok(self.partitions(table))
    }
}

impl SchemaEditor for InMemoryCatalog {
    fn create_partition(
        &mut self,
        request: &CreatePartition<'_>,
    ) -> Result<MutationOutcome, DatabaseError> {
        let mut state = self.state.lock();
        if let Some(message) = state.failures.get(request.name) {
            return Err(DatabaseError::new(message.clone()));
        }

        let Some(partitions) = state.tables.get_mut(request.table) else {
            return Err(DatabaseError::new(format!(
                "relation \"{}\" does not exist",
                request.table
            )));
        };
        if partitions.iter().any(|p| p.name == request.name) {
            return Ok(MutationOutcome::AlreadyExists);
        }

        let (lower_bound, upper_bound) = match request.predicate {
            PartitionPredicate::Range { from, to } => {
                (Some(render_bounds(from)), Some(render_bounds(to)))
            }
            PartitionPredicate::List { .. } => (None, None),
        };
        partitions.push(IntrospectedPartition {
            name: request.name.to_string(),
            lower_bound,
            upper_bound,
            comment: request.comment.map(str::to_string),
        });

        if request.partition_by.is_some() {
            state
                .tables
                .insert(format!("{}_{}", request.table, request.name), Vec::new());
        }

        Ok(MutationOutcome::Applied)
    }

    fn delete_partition(
        &mut self,
        table: &str,
        name: &str,
    ) -> Result<MutationOutcome, DatabaseError> {
        let mut state = self.state.lock();
        if let Some(message) = state.failures.get(name) {
            return Err(DatabaseError::new(message.clone()));
        }

        let Some(partitions) = state.tables.get_mut(table) else {
            return Ok(MutationOutcome::NotFound);
        };
        let Some(index) = partitions.iter().position(|p| p.name == name) else {
            return Ok(MutationOutcome::NotFound);
        };
        partitions.remove(index);

        state.drop_table(&format!("{}_{}", table, name));
        Ok(MutationOutcome::Applied)
    }
}
