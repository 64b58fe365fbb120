use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::buckets::TimeBucket;
use super::catalog::{CreatePartition, MutationOutcome, SchemaEditor};
use super::naming::{
    CATEGORY_PLACEHOLDER, DEFAULT_LIST_NAME_FORMAT, default_name_format, format_datetime,
    format_list_name,
};
use super::plan::Verb;
use super::size::PartitionSize;
use super::table::PartitionedTable;
use super::Error;

/// Opaque category value a partition is keyed on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Int(i64),
    Text(String),
}

impl Category {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Category::Int(value) => Some(*value),
            Category::Text(_) => None,
        }
    }

    /// Next ordinal, used as the exclusive upper bound of a category range.
    pub fn successor(&self) -> Option<Category> {
        self.as_int()
            .and_then(|value| value.checked_add(1))
            .map(Category::Int)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Int(value) => write!(f, "{}", value),
            Category::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Category {
    fn from(value: i64) -> Self {
        Category::Int(value)
    }
}

impl From<i32> for Category {
    fn from(value: i32) -> Self {
        Category::Int(i64::from(value))
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::Text(value.to_string())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::Text(value)
    }
}

/// One value of a range bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartitionBound {
    Timestamp(DateTime<Utc>),
    Category(Category),
}

impl fmt::Display for PartitionBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionBound::Timestamp(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            PartitionBound::Category(category) => write!(f, "{}", category),
        }
    }
}

/// Values a partition accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartitionPredicate {
    /// `FOR VALUES FROM (from) TO (to)`, upper bound exclusive
    Range {
        from: Vec<PartitionBound>,
        to: Vec<PartitionBound>,
    },
    /// `FOR VALUES IN (values)`
    List { values: Vec<Category> },
}

fn join_bounds(bounds: &[PartitionBound]) -> String {
    bounds
        .iter()
        .map(|bound| bound.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for PartitionPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionPredicate::Range { from, to } => {
                write!(f, "FROM ({}) TO ({})", join_bounds(from), join_bounds(to))
            }
            PartitionPredicate::List { values } => write!(
                f,
                "IN ({})",
                values
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// Range partition covering one time bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimePartition {
    size: PartitionSize,
    bucket: TimeBucket,
    name_format: Option<String>,
}

impl TimePartition {
    pub fn new(
        size: PartitionSize,
        start_datetime: DateTime<Utc>,
        name_format: Option<String>,
    ) -> Result<Self, Error> {
        Ok(Self::from_bucket(
            size,
            TimeBucket::new(size, start_datetime)?,
            name_format,
        ))
    }

    pub(crate) fn from_bucket(
        size: PartitionSize,
        bucket: TimeBucket,
        name_format: Option<String>,
    ) -> Self {
        Self {
            size,
            bucket,
            name_format,
        }
    }

    pub fn size(&self) -> PartitionSize {
        self.size
    }

    pub fn start_datetime(&self) -> DateTime<Utc> {
        self.bucket.start
    }

    pub fn end_datetime(&self) -> DateTime<Utc> {
        self.bucket.end
    }

    pub fn name(&self) -> Result<String, Error> {
        let format = self
            .name_format
            .as_deref()
            .unwrap_or_else(|| default_name_format(self.size.unit()));
        format_datetime(self.bucket.start, format)
    }

    pub fn predicate(&self) -> PartitionPredicate {
        PartitionPredicate::Range {
            from: vec![PartitionBound::Timestamp(self.bucket.start)],
            to: vec![PartitionBound::Timestamp(self.bucket.end)],
        }
    }
}

/// List partition holding a fixed set of category values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListPartition {
    values: Vec<Category>,
    name_format: String,
}

impl ListPartition {
    pub fn new(values: Vec<Category>, name_format: Option<String>) -> Self {
        Self {
            values,
            name_format: name_format.unwrap_or_else(|| DEFAULT_LIST_NAME_FORMAT.to_string()),
        }
    }

    pub fn values(&self) -> &[Category] {
        &self.values
    }

    pub fn name(&self) -> Result<String, Error> {
        format_list_name(&self.name_format, &self.values)
    }

    pub fn predicate(&self) -> PartitionPredicate {
        PartitionPredicate::List {
            values: self.values.clone(),
        }
    }
}

/// Range partition over `(time, category)` covering one bucket of one
/// integer category, i.e. `[(start, c), (end, c + 1))`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeCategoryPartition {
    size: PartitionSize,
    bucket: TimeBucket,
    category: i64,
    name_format: Option<String>,
}

impl TimeCategoryPartition {
    pub fn new(
        size: PartitionSize,
        start_datetime: DateTime<Utc>,
        category: &Category,
        name_format: Option<String>,
    ) -> Result<Self, Error> {
        let category = range_category(category)?;
        Ok(Self::from_bucket(
            size,
            TimeBucket::new(size, start_datetime)?,
            category,
            name_format,
        ))
    }

    pub(crate) fn from_bucket(
        size: PartitionSize,
        bucket: TimeBucket,
        category: i64,
        name_format: Option<String>,
    ) -> Self {
        Self {
            size,
            bucket,
            category,
            name_format,
        }
    }

    pub fn start_datetime(&self) -> DateTime<Utc> {
        self.bucket.start
    }

    pub fn end_datetime(&self) -> DateTime<Utc> {
        self.bucket.end
    }

    pub fn category(&self) -> i64 {
        self.category
    }

    pub fn name(&self) -> Result<String, Error> {
        let name = match &self.name_format {
            Some(format) => format_datetime(self.bucket.start, format)?,
            None => {
                let format = format!(
                    "{}_{}",
                    default_name_format(self.size.unit()),
                    CATEGORY_PLACEHOLDER
                );
                format_datetime(self.bucket.start, &format)?
            }
        };

        Ok(name.replace(CATEGORY_PLACEHOLDER, &self.category.to_string()))
    }

    pub fn predicate(&self) -> PartitionPredicate {
        // upper bound validated when the category was accepted
        let upper = self.category.saturating_add(1);
        PartitionPredicate::Range {
            from: vec![
                PartitionBound::Timestamp(self.bucket.start),
                PartitionBound::Category(Category::Int(self.category)),
            ],
            to: vec![
                PartitionBound::Timestamp(self.bucket.end),
                PartitionBound::Category(Category::Int(upper)),
            ],
        }
    }
}

/// Checks a category can key a half-open range and returns its ordinal.
pub(crate) fn range_category(category: &Category) -> Result<i64, Error> {
    match (category.as_int(), category.successor()) {
        (Some(value), Some(_)) => Ok(value),
        (Some(value), None) => Err(Error::Configuration(format!(
            "category {} has no successor",
            value
        ))),
        (None, _) => Err(Error::Configuration(format!(
            "category {:?} must be an integer to be range partitioned",
            category.to_string()
        ))),
    }
}

/// Time partition nested inside a list partition.
///
/// It lives in the sub-table `<base>_<parent name>` rather than in the base
/// table, and its name is prefixed with the parent's name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSubPartition {
    parent: Arc<ListPartition>,
    partition: TimePartition,
}

impl TimeSubPartition {
    pub fn new(
        parent: Arc<ListPartition>,
        size: PartitionSize,
        start_datetime: DateTime<Utc>,
        name_format: Option<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            parent,
            partition: TimePartition::new(size, start_datetime, name_format)?,
        })
    }

    pub(crate) fn from_partition(parent: Arc<ListPartition>, partition: TimePartition) -> Self {
        Self { parent, partition }
    }

    pub fn parent(&self) -> &ListPartition {
        &self.parent
    }

    pub fn start_datetime(&self) -> DateTime<Utc> {
        self.partition.start_datetime()
    }

    pub fn end_datetime(&self) -> DateTime<Utc> {
        self.partition.end_datetime()
    }

    pub fn name(&self) -> Result<String, Error> {
        Ok(format!("{}_{}", self.parent.name()?, self.partition.name()?))
    }

    pub fn predicate(&self) -> PartitionPredicate {
        self.partition.predicate()
    }
}

/// A partition the strategies want to exist, or no longer exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartitionSpec {
    Time(TimePartition),
    List(ListPartition),
    TimeCategory(TimeCategoryPartition),
    TimeSub(TimeSubPartition),
}

impl PartitionSpec {
    pub fn name(&self) -> Result<String, Error> {
        match self {
            PartitionSpec::Time(p) => p.name(),
            PartitionSpec::List(p) => p.name(),
            PartitionSpec::TimeCategory(p) => p.name(),
            PartitionSpec::TimeSub(p) => p.name(),
        }
    }

    pub fn predicate(&self) -> PartitionPredicate {
        match self {
            PartitionSpec::Time(p) => p.predicate(),
            PartitionSpec::List(p) => p.predicate(),
            PartitionSpec::TimeCategory(p) => p.predicate(),
            PartitionSpec::TimeSub(p) => p.predicate(),
        }
    }

    /// Time range covered, `None` for list partitions.
    pub fn bucket(&self) -> Option<TimeBucket> {
        match self {
            PartitionSpec::Time(p) => Some(p.bucket),
            PartitionSpec::List(_) => None,
            PartitionSpec::TimeCategory(p) => Some(p.bucket),
            PartitionSpec::TimeSub(p) => Some(p.partition.bucket),
        }
    }

    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        self.bucket().map(|bucket| bucket.start)
    }

    /// Table this partition is attached to, given the configured base table.
    pub fn target_table(&self, base_table: &str) -> Result<String, Error> {
        match self {
            PartitionSpec::TimeSub(p) => Ok(format!("{}_{}", base_table, p.parent.name()?)),
            _ => Ok(base_table.to_string()),
        }
    }

    pub fn create(
        &self,
        table: &PartitionedTable,
        editor: &mut dyn SchemaEditor,
        comment: Option<&str>,
    ) -> Result<MutationOutcome, Error> {
        let target = self.target_table(table.name())?;
        let name = self.name()?;
        let predicate = self.predicate();
        let partition_by = match self {
            PartitionSpec::List(_) => table.sub_partitioning(),
            _ => None,
        };

        log::debug!("Creating partition {} on {} for values {}", name, target, predicate);

        let request = CreatePartition {
            table: &target,
            name: &name,
            predicate: &predicate,
            partition_by,
            comment,
        };

        editor
            .create_partition(&request)
            .map_err(|source| Error::Transaction {
                verb: Verb::Create,
                table: target.clone(),
                name: name.clone(),
                applied: 0,
                source,
            })
    }

    pub fn delete(
        &self,
        table: &PartitionedTable,
        editor: &mut dyn SchemaEditor,
    ) -> Result<MutationOutcome, Error> {
        let target = self.target_table(table.name())?;
        let name = self.name()?;

        log::debug!("Deleting partition {} from {}", name, target);

        editor
            .delete_partition(&target, &name)
            .map_err(|source| Error::Transaction {
                verb: Verb::Delete,
                table: target.clone(),
                name: name.clone(),
                applied: 0,
                source,
            })
    }
}
