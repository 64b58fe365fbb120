use super::naming::DEFAULT_CATEGORY_NAME_FORMAT;
use super::partition::Category;
use super::size::{CalendarDelta, PartitionSize, SizeUnits};
use super::strategy::{
    CategoryCurrentTimeStrategy, CurrentTimeAndCategoryStrategy, CurrentTimeStrategy,
    PartitioningStrategy,
};
use super::table::PartitionedTable;
use super::Error;

/// A table together with the strategy that partitions it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitioningConfig {
    table: PartitionedTable,
    strategy: PartitioningStrategy,
}

impl PartitioningConfig {
    pub fn new(
        table: PartitionedTable,
        strategy: impl Into<PartitioningStrategy>,
    ) -> Result<Self, Error> {
        let strategy = strategy.into();
        strategy.check_table(&table)?;
        Ok(Self { table, strategy })
    }

    pub fn table(&self) -> &PartitionedTable {
        &self.table
    }

    pub fn strategy(&self) -> &PartitioningStrategy {
        &self.strategy
    }
}

/// Partitions `table` into consecutive time buckets of the one unit set in
/// `size`, keeping `count` buckets ahead of now.
pub fn partition_by_current_time(
    table: PartitionedTable,
    size: SizeUnits,
    count: usize,
    max_age: Option<CalendarDelta>,
    name_format: Option<String>,
) -> Result<PartitioningConfig, Error> {
    let size = PartitionSize::from_units(size)?;
    PartitioningConfig::new(
        table,
        CurrentTimeStrategy::new(size, count, max_age, name_format)?,
    )
}

/// Like [`partition_by_current_time`] with one partition per category per
/// bucket. Categories must be integers.
pub fn partition_by_current_time_and_categories(
    table: PartitionedTable,
    size: SizeUnits,
    count: usize,
    categories: Vec<Category>,
    max_age: Option<CalendarDelta>,
    name_format: Option<String>,
) -> Result<PartitioningConfig, Error> {
    let size = PartitionSize::from_units(size)?;
    PartitioningConfig::new(
        table,
        CurrentTimeAndCategoryStrategy::new(size, count, categories, max_age, name_format)?,
    )
}

/// Creates one list partition per category, each holding its own time
/// buckets. List partitions are named `categories_<category>` unless the
/// first element of `name_format` overrides it.
pub fn partition_by_category_and_current_time(
    table: PartitionedTable,
    categories: Vec<Category>,
    size: SizeUnits,
    count: usize,
    max_age: Option<CalendarDelta>,
    name_format: (Option<String>, Option<String>),
) -> Result<PartitioningConfig, Error> {
    let size = PartitionSize::from_units(size)?;
    let (outer, inner) = name_format;
    let outer = outer.or_else(|| Some(DEFAULT_CATEGORY_NAME_FORMAT.to_string()));

    PartitioningConfig::new(
        table,
        CategoryCurrentTimeStrategy::new(categories, size, count, max_age, (outer, inner))?,
    )
}
