use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::catalog::{CatalogIntrospector, IntrospectedPartition};
use super::clock::{Clock, SystemClock};
use super::config::PartitioningConfig;
use super::plan::{ModelPlan, Operation, Plan, Verb};
use super::strategy::Enumeration;
use super::{AUTO_PARTITIONED_COMMENT, Error};

/// Plans partition changes for a set of configured tables.
pub struct PartitioningManager {
    configs: Vec<PartitioningConfig>,
    clock: Arc<dyn Clock>,
}

impl PartitioningManager {
    pub fn new(configs: Vec<PartitioningConfig>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for config in &configs {
            if !seen.insert(config.table().name()) {
                return Err(Error::Configuration(format!(
                    "Only one partitioning config per table is allowed, {} has multiple",
                    config.table().name()
                )));
            }
        }

        Ok(Self {
            configs,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn configs(&self) -> &[PartitioningConfig] {
        &self.configs
    }

    pub fn find_config(&self, table: &str) -> Option<&PartitioningConfig> {
        self.configs
            .iter()
            .find(|config| config.table().name() == table)
    }

    /// Diffs every configuration against the catalog.
    ///
    /// A configuration that cannot be planned is recorded in
    /// [`Plan::failures`] and does not prevent the others from being planned.
    pub fn plan(
        &self,
        catalog: &dyn CatalogIntrospector,
        skip_create: bool,
        skip_delete: bool,
    ) -> Plan {
        let now = self.clock.now();
        let mut plan = Plan::default();

        for config in &self.configs {
            let table = config.table().name();
            match plan_config(config, catalog, now, skip_create, skip_delete) {
                Ok(model_plan) => {
                    log::info!(
                        "Planned {} creations and {} deletions for {}",
                        model_plan.creations().count(),
                        model_plan.deletions().count(),
                        table
                    );
                    plan.push(model_plan);
                }
                Err(e) => {
                    log::error!("Failed to plan partitions for {}: {}", table, e);
                    plan.push_failure(table.to_string(), e);
                }
            }
        }

        plan
    }
}

/// Catalog listings fetched at most once per table during a planning run.
struct CatalogSnapshot<'a> {
    catalog: &'a dyn CatalogIntrospector,
    tables: HashMap<String, HashMap<String, IntrospectedPartition>>,
}

impl<'a> CatalogSnapshot<'a> {
    fn new(catalog: &'a dyn CatalogIntrospector) -> Self {
        Self {
            catalog,
            tables: HashMap::new(),
        }
    }

    fn lookup(&mut self, table: &str, name: &str) -> Result<Option<&IntrospectedPartition>, Error> {
        if !self.tables.contains_key(table) {
            let listed = self
                .catalog
                .list_partitions(table)
                .map_err(|source| Error::Introspection {
                    table: table.to_string(),
                    source,
                })?;
            self.tables.insert(
                table.to_string(),
                listed
                    .into_iter()
                    .map(|partition| (partition.name.clone(), partition))
                    .collect(),
            );
        }

        Ok(self.tables.get(table).and_then(|partitions| partitions.get(name)))
    }
}

fn plan_config(
    config: &PartitioningConfig,
    catalog: &dyn CatalogIntrospector,
    now: DateTime<Utc>,
    skip_create: bool,
    skip_delete: bool,
) -> Result<ModelPlan, Error> {
    let base = config.table().name();
    let Enumeration {
        to_create,
        to_delete,
    } = config.strategy().enumerate(now)?;

    let mut snapshot = CatalogSnapshot::new(catalog);
    let mut desired: HashSet<(String, String)> = HashSet::new();
    let mut operations = Vec::new();

    for spec in to_create {
        let name = spec.name()?;
        let table = spec.target_table(base)?;

        if !desired.insert((table.clone(), name.clone())) {
            return Err(Error::Naming(format!(
                "partition name {} on {} is rendered for more than one bucket",
                name, table
            )));
        }
        if skip_create || snapshot.lookup(&table, &name)?.is_some() {
            continue;
        }

        operations.push(Operation {
            verb: Verb::Create,
            table,
            name,
            spec,
        });
    }

    if skip_delete {
        return Ok(ModelPlan::new(config.table().clone(), operations));
    }

    // The delete sequence is unbounded. Stop at the first cursor position
    // where none of the enumerated partitions exist. A name already seen at
    // an earlier position does not count as existing again.
    let mut visited: HashSet<(String, String)> = HashSet::new();
    let mut position: Option<DateTime<Utc>> = None;
    let mut position_found = true;

    for spec in to_delete {
        let start = spec.start_datetime();
        if start != position {
            if !position_found {
                break;
            }
            position = start;
            position_found = false;
        }

        let name = spec.name()?;
        let table = spec.target_table(base)?;
        let key = (table, name);

        if !visited.insert(key.clone()) {
            continue;
        }
        if desired.contains(&key) {
            position_found = true;
            continue;
        }

        let Some(existing) = snapshot.lookup(&key.0, &key.1)? else {
            continue;
        };
        position_found = true;

        if existing.comment.as_deref() != Some(AUTO_PARTITIONED_COMMENT) {
            log::debug!("Keeping {} on {}, it was not created automatically", key.1, key.0);
            continue;
        }

        let (table, name) = key;
        operations.push(Operation {
            verb: Verb::Delete,
            table,
            name,
            spec,
        });
    }

    Ok(ModelPlan::new(config.table().clone(), operations))
}
