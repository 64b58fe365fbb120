use std::fmt;

use super::catalog::{MutationOutcome, SchemaEditor};
use super::partition::PartitionSpec;
use super::table::PartitionedTable;
use super::{AUTO_PARTITIONED_COMMENT, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Delete,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Create => f.write_str("create"),
            Verb::Delete => f.write_str("delete"),
        }
    }
}

/// A single planned partition change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    pub verb: Verb,
    /// Table the partition is attached to.
    pub table: String,
    pub name: String,
    pub spec: PartitionSpec,
}

/// Create or delete that found the catalog already in the desired state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionConflict {
    pub verb: Verb,
    pub table: String,
    pub name: String,
}

impl fmt::Display for ExecutionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verb {
            Verb::Create => write!(f, "partition {} already exists on {}", self.name, self.table),
            Verb::Delete => write!(f, "partition {} already absent from {}", self.name, self.table),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub created: usize,
    pub deleted: usize,
    pub conflicts: Vec<ExecutionConflict>,
}

impl ApplyReport {
    /// Operations executed so far, conflicts included.
    pub fn applied(&self) -> usize {
        self.created + self.deleted + self.conflicts.len()
    }

    fn merge(&mut self, other: ApplyReport) {
        self.created += other.created;
        self.deleted += other.deleted;
        self.conflicts.extend(other.conflicts);
    }
}

/// Changes planned for one partitioned table, creations first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPlan {
    table: PartitionedTable,
    operations: Vec<Operation>,
}

impl ModelPlan {
    pub(crate) fn new(table: PartitionedTable, operations: Vec<Operation>) -> Self {
        Self { table, operations }
    }

    pub fn table(&self) -> &PartitionedTable {
        &self.table
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn creations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.verb == Verb::Create)
    }

    pub fn deletions(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().filter(|op| op.verb == Verb::Delete)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Executes every operation in order.
    ///
    /// Duplicate creates and deletes of missing partitions are recorded as
    /// conflicts. Any other failure stops execution and is returned with the
    /// number of operations already applied; rolling those back is up to the
    /// caller's transaction.
    pub fn apply(&self, editor: &mut dyn SchemaEditor) -> Result<ApplyReport, Error> {
        let mut report = ApplyReport::default();

        for op in &self.operations {
            let outcome = match op.verb {
                Verb::Create => op
                    .spec
                    .create(&self.table, editor, Some(AUTO_PARTITIONED_COMMENT)),
                Verb::Delete => op.spec.delete(&self.table, editor),
            };

            let outcome = outcome.map_err(|e| match e {
                Error::Transaction {
                    verb,
                    table,
                    name,
                    source,
                    ..
                } => Error::Transaction {
                    verb,
                    table,
                    name,
                    applied: report.applied(),
                    source,
                },
                other => other,
            })?;

            match (op.verb, outcome) {
                (Verb::Create, MutationOutcome::Applied) => report.created += 1,
                (Verb::Delete, MutationOutcome::Applied) => report.deleted += 1,
                (verb, _) => {
                    let conflict = ExecutionConflict {
                        verb,
                        table: op.table.clone(),
                        name: op.name.clone(),
                    };
                    log::warn!("Ignoring conflict: {}", conflict);
                    report.conflicts.push(conflict);
                }
            }
        }

        Ok(report)
    }
}

/// Ordered changes across all configured tables.
#[derive(Debug, Default)]
pub struct Plan {
    model_plans: Vec<ModelPlan>,
    failures: Vec<(String, Error)>,
}

impl Plan {
    pub(crate) fn push(&mut self, model_plan: ModelPlan) {
        self.model_plans.push(model_plan);
    }

    pub(crate) fn push_failure(&mut self, table: String, error: Error) {
        self.failures.push((table, error));
    }

    pub fn model_plans(&self) -> &[ModelPlan] {
        &self.model_plans
    }

    /// Tables that could not be planned, with the reason.
    pub fn failures(&self) -> &[(String, Error)] {
        &self.failures
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.model_plans.iter().flat_map(|plan| plan.operations.iter())
    }

    pub fn creations(&self) -> impl Iterator<Item = &Operation> {
        self.model_plans.iter().flat_map(ModelPlan::creations)
    }

    pub fn deletions(&self) -> impl Iterator<Item = &Operation> {
        self.model_plans.iter().flat_map(ModelPlan::deletions)
    }

    pub fn is_empty(&self) -> bool {
        self.model_plans.iter().all(ModelPlan::is_empty)
    }

    /// Applies all model plans in order. Should be called inside a
    /// transaction owned by the caller.
    pub fn apply(&self, editor: &mut dyn SchemaEditor) -> Result<ApplyReport, Error> {
        let mut report = ApplyReport::default();

        for model_plan in &self.model_plans {
            let applied_before = report.applied();
            let model_report = model_plan.apply(editor).map_err(|e| {
                log::error!(
                    "Failed applying partition plan for {}: {}",
                    model_plan.table.name(),
                    e
                );
                match e {
                    Error::Transaction {
                        verb,
                        table,
                        name,
                        applied,
                        source,
                    } => Error::Transaction {
                        verb,
                        table,
                        name,
                        applied: applied_before + applied,
                        source,
                    },
                    other => other,
                }
            })?;
            report.merge(model_report);
        }

        log::info!(
            "Applied partition plan: {} created, {} deleted, {} conflicts",
            report.created,
            report.deleted,
            report.conflicts.len()
        );

        Ok(report)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for model_plan in self.model_plans.iter().filter(|plan| !plan.is_empty()) {
            writeln!(f, "{}:", model_plan.table.name())?;
            for op in model_plan.creations() {
                writeln!(f, "  + {}", op.name)?;
            }
            for op in model_plan.deletions() {
                writeln!(f, "  - {}", op.name)?;
            }
            writeln!(f)?;
        }

        for (table, error) in &self.failures {
            writeln!(f, "{}: {}", table, error)?;
        }

        writeln!(f, "{} partitions will be created", self.creations().count())?;
        write!(f, "{} partitions will be deleted", self.deletions().count())
    }
}
