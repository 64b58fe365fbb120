pub mod naming;
pub mod strategy;

use super::*;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;

pub fn at(date: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn at_time(datetime: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
}

pub fn years(n: u32) -> SizeUnits {
    SizeUnits { years: Some(n), ..Default::default() }
}

pub fn months(n: u32) -> SizeUnits {
    SizeUnits { months: Some(n), ..Default::default() }
}

pub fn days(n: u32) -> SizeUnits {
    SizeUnits { days: Some(n), ..Default::default() }
}

pub fn range_table(name: &str) -> PartitionedTable {
    PartitionedTable::new(name, PartitioningMethod::Range, ["timestamp"]).unwrap()
}

pub fn time_category_table(name: &str) -> PartitionedTable {
    PartitionedTable::new(name, PartitioningMethod::Range, ["timestamp", "category_id"]).unwrap()
}

pub fn hierarchy_table(name: &str) -> PartitionedTable {
    PartitionedTable::new(name, PartitioningMethod::List, ["category_id"])
        .unwrap()
        .sub_partitioned_by(PartitioningMethod::Range, ["date"])
        .unwrap()
}

pub fn names<'a>(specs: impl Iterator<Item = PartitionSpec> + 'a) -> Vec<String> {
    specs.map(|spec| spec.name().unwrap()).collect()
}

pub fn frozen_manager(
    configs: Vec<PartitioningConfig>,
    now: DateTime<Utc>,
) -> (PartitioningManager, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now));
    let manager = PartitioningManager::new(configs)
        .unwrap()
        .with_clock(clock.clone());
    (manager, clock)
}

pub fn plan_and_apply(
    manager: &PartitioningManager,
    catalog: &mut InMemoryCatalog,
    skip_create: bool,
) -> ApplyReport {
    let plan = manager.plan(&*catalog, skip_create, false);
    assert!(plan.failures().is_empty(), "unexpected failures: {:?}", plan.failures());
    plan.apply(catalog).unwrap()
}

pub fn catalog_with(tables: &[&str]) -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    for table in tables {
        catalog.create_table(table);
    }
    catalog
}
