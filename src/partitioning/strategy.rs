//! Strategies deciding which partitions should exist at a given time.
//!
//! Every strategy produces two lazy sequences from a single "now":
//! the partitions that should exist (`to_create`) and the partitions that
//! have aged out (`to_delete`). Neither sequence looks at the catalog.
//!
//! `to_delete` walks backward from the retention cutoff and does not stop on
//! its own. Pulling from it without a bound never terminates; the
//! [`PartitioningManager`](super::PartitioningManager) stops once the catalog
//! reports a whole cursor position as absent.

use std::iter;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::buckets::{BackwardBuckets, ForwardBuckets, TimeBucket};
use super::naming::{CATEGORY_PLACEHOLDER, check_time_format};
use super::partition::{
    Category, ListPartition, PartitionSpec, TimeCategoryPartition, TimePartition,
    TimeSubPartition, range_category,
};
use super::size::{CalendarDelta, PartitionSize};
use super::table::{PartitionedTable, PartitioningMethod};
use super::Error;

pub type SpecIter<'a> = Box<dyn Iterator<Item = PartitionSpec> + 'a>;

/// Both sequences of a strategy, computed from the same "now".
pub struct Enumeration<'a> {
    pub to_create: SpecIter<'a>,
    pub to_delete: SpecIter<'a>,
}

/// Which edge of a bucket the retention window is measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RetentionAnchor {
    /// A bucket ages out once its start is at or before the start of the
    /// bucket containing `now - max_age`.
    #[default]
    BucketStart,
    /// A bucket ages out once its end is at or before `now - max_age`.
    BucketEnd,
}

fn empty<'a>() -> SpecIter<'a> {
    Box::new(iter::empty())
}

fn delete_cursor(
    size: PartitionSize,
    max_age: Option<CalendarDelta>,
    anchor: RetentionAnchor,
    now: DateTime<Utc>,
) -> Result<Option<BackwardBuckets>, Error> {
    let Some(max_age) = max_age.filter(|age| !age.is_zero()) else {
        return Ok(None);
    };

    let start = size.start(max_age.sub_from(now)?)?;
    let start = match anchor {
        RetentionAnchor::BucketStart => start,
        RetentionAnchor::BucketEnd => size.as_delta().sub_from(start)?,
    };

    Ok(Some(BackwardBuckets::new(size, start)))
}

/// One range partition per time bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentTimeStrategy {
    size: PartitionSize,
    count: usize,
    max_age: Option<CalendarDelta>,
    name_format: Option<String>,
    anchor: RetentionAnchor,
}

impl CurrentTimeStrategy {
    pub fn new(
        size: PartitionSize,
        count: usize,
        max_age: Option<CalendarDelta>,
        name_format: Option<String>,
    ) -> Result<Self, Error> {
        if let Some(format) = &name_format {
            check_time_format(format)?;
        }

        Ok(Self {
            size,
            count,
            max_age,
            name_format,
            anchor: RetentionAnchor::default(),
        })
    }

    pub fn with_retention_anchor(mut self, anchor: RetentionAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn to_create(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        let size = self.size;
        let start = size.start(now)?;

        Ok(Box::new(ForwardBuckets::new(size, start, self.count)?.map(
            move |bucket| {
                PartitionSpec::Time(TimePartition::from_bucket(
                    size,
                    bucket,
                    self.name_format.clone(),
                ))
            },
        )))
    }

    pub fn to_delete(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        let size = self.size;
        let Some(cursor) = delete_cursor(size, self.max_age, self.anchor, now)? else {
            return Ok(empty());
        };

        Ok(Box::new(cursor.map(move |bucket| {
            PartitionSpec::Time(TimePartition::from_bucket(
                size,
                bucket,
                self.name_format.clone(),
            ))
        })))
    }
}

/// One range partition per integer category per time bucket, all attached
/// directly to the base table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentTimeAndCategoryStrategy {
    size: PartitionSize,
    count: usize,
    max_age: Option<CalendarDelta>,
    categories: Vec<i64>,
    name_format: Option<String>,
    anchor: RetentionAnchor,
}

impl CurrentTimeAndCategoryStrategy {
    pub fn new(
        size: PartitionSize,
        count: usize,
        categories: Vec<Category>,
        max_age: Option<CalendarDelta>,
        name_format: Option<String>,
    ) -> Result<Self, Error> {
        let categories = categories
            .iter()
            .map(range_category)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(format) = &name_format {
            if !format.contains(CATEGORY_PLACEHOLDER) {
                return Err(Error::Configuration(format!(
                    "name format {:?} must contain {}",
                    format, CATEGORY_PLACEHOLDER
                )));
            }
            check_time_format(format)?;
        }

        Ok(Self {
            size,
            count,
            max_age,
            categories,
            name_format,
            anchor: RetentionAnchor::default(),
        })
    }

    pub fn with_retention_anchor(mut self, anchor: RetentionAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn categories(&self) -> &[i64] {
        &self.categories
    }

    fn spec(&self, bucket: TimeBucket, category: i64) -> PartitionSpec {
        PartitionSpec::TimeCategory(TimeCategoryPartition::from_bucket(
            self.size,
            bucket,
            category,
            self.name_format.clone(),
        ))
    }

    pub fn to_create(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        let buckets = ForwardBuckets::new(self.size, self.size.start(now)?, self.count)?;

        Ok(Box::new(self.categories.iter().flat_map(move |&category| {
            buckets
                .clone()
                .map(move |bucket| self.spec(bucket, category))
        })))
    }

    pub fn to_delete(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        if self.categories.is_empty() {
            return Ok(empty());
        }
        let Some(cursor) = delete_cursor(self.size, self.max_age, self.anchor, now)? else {
            return Ok(empty());
        };

        Ok(Box::new(cursor.flat_map(move |bucket| {
            self.categories
                .iter()
                .map(move |&category| self.spec(bucket, category))
        })))
    }
}

/// List partition per category, each sub-partitioned into time buckets.
///
/// The list partitions are permanent; only the time buckets inside them
/// age out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryCurrentTimeStrategy {
    categories: Vec<Category>,
    size: PartitionSize,
    count: usize,
    max_age: Option<CalendarDelta>,
    name_format: (Option<String>, Option<String>),
    anchor: RetentionAnchor,
}

impl CategoryCurrentTimeStrategy {
    /// `name_format` holds the list partition format (`%s` is replaced by
    /// the category) and the strftime format of the time partitions.
    pub fn new(
        categories: Vec<Category>,
        size: PartitionSize,
        count: usize,
        max_age: Option<CalendarDelta>,
        name_format: (Option<String>, Option<String>),
    ) -> Result<Self, Error> {
        if let Some(format) = &name_format.1 {
            check_time_format(format)?;
        }

        Ok(Self {
            categories,
            size,
            count,
            max_age,
            name_format,
            anchor: RetentionAnchor::default(),
        })
    }

    pub fn with_retention_anchor(mut self, anchor: RetentionAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn outer(&self, category: &Category) -> Arc<ListPartition> {
        Arc::new(ListPartition::new(
            vec![category.clone()],
            self.name_format.0.clone(),
        ))
    }

    fn inner(&self, outer: &Arc<ListPartition>, bucket: TimeBucket) -> PartitionSpec {
        PartitionSpec::TimeSub(TimeSubPartition::from_partition(
            Arc::clone(outer),
            TimePartition::from_bucket(self.size, bucket, self.name_format.1.clone()),
        ))
    }

    pub fn to_create(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        let buckets = ForwardBuckets::new(self.size, self.size.start(now)?, self.count)?;

        Ok(Box::new(self.categories.iter().flat_map(move |category| {
            let outer = self.outer(category);
            let list = PartitionSpec::List(outer.as_ref().clone());
            iter::once(list).chain(
                buckets
                    .clone()
                    .map(move |bucket| self.inner(&outer, bucket)),
            )
        })))
    }

    pub fn to_delete(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        if self.categories.is_empty() {
            return Ok(empty());
        }
        let Some(cursor) = delete_cursor(self.size, self.max_age, self.anchor, now)? else {
            return Ok(empty());
        };

        Ok(Box::new(cursor.flat_map(move |bucket| {
            self.categories
                .iter()
                .map(move |category| self.inner(&self.outer(category), bucket))
        })))
    }
}

/// Closed set of supported strategies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartitioningStrategy {
    CurrentTime(CurrentTimeStrategy),
    CurrentTimeAndCategory(CurrentTimeAndCategoryStrategy),
    CategoryCurrentTime(CategoryCurrentTimeStrategy),
}

impl PartitioningStrategy {
    pub fn size(&self) -> PartitionSize {
        match self {
            PartitioningStrategy::CurrentTime(s) => s.size,
            PartitioningStrategy::CurrentTimeAndCategory(s) => s.size,
            PartitioningStrategy::CategoryCurrentTime(s) => s.size,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            PartitioningStrategy::CurrentTime(s) => s.count,
            PartitioningStrategy::CurrentTimeAndCategory(s) => s.count,
            PartitioningStrategy::CategoryCurrentTime(s) => s.count,
        }
    }

    pub fn max_age(&self) -> Option<CalendarDelta> {
        match self {
            PartitioningStrategy::CurrentTime(s) => s.max_age,
            PartitioningStrategy::CurrentTimeAndCategory(s) => s.max_age,
            PartitioningStrategy::CategoryCurrentTime(s) => s.max_age,
        }
    }

    pub fn to_create(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        match self {
            PartitioningStrategy::CurrentTime(s) => s.to_create(now),
            PartitioningStrategy::CurrentTimeAndCategory(s) => s.to_create(now),
            PartitioningStrategy::CategoryCurrentTime(s) => s.to_create(now),
        }
    }

    pub fn to_delete(&self, now: DateTime<Utc>) -> Result<SpecIter<'_>, Error> {
        match self {
            PartitioningStrategy::CurrentTime(s) => s.to_delete(now),
            PartitioningStrategy::CurrentTimeAndCategory(s) => s.to_delete(now),
            PartitioningStrategy::CategoryCurrentTime(s) => s.to_delete(now),
        }
    }

    pub fn enumerate(&self, now: DateTime<Utc>) -> Result<Enumeration<'_>, Error> {
        Ok(Enumeration {
            to_create: self.to_create(now)?,
            to_delete: self.to_delete(now)?,
        })
    }

    /// Checks the table is partitioned the way this strategy needs.
    pub(crate) fn check_table(&self, table: &PartitionedTable) -> Result<(), Error> {
        let problem = match self {
            PartitioningStrategy::CurrentTime(_) if table.method() != PartitioningMethod::Range => {
                Some("time partitioning requires a RANGE partitioned table")
            }
            PartitioningStrategy::CurrentTimeAndCategory(_)
                if table.method() != PartitioningMethod::Range || table.key().len() < 2 =>
            {
                Some("time and category partitioning requires a RANGE partitioned table keyed on (time, category)")
            }
            PartitioningStrategy::CategoryCurrentTime(_)
                if table.method() != PartitioningMethod::List
                    || table.sub_partitioning().map(|key| key.method)
                        != Some(PartitioningMethod::Range) =>
            {
                Some("category and time partitioning requires a LIST partitioned table sub-partitioned by RANGE")
            }
            _ => None,
        };

        match problem {
            Some(msg) => Err(Error::Configuration(format!("table {}: {}", table.name(), msg))),
            None => Ok(()),
        }
    }
}

impl From<CurrentTimeStrategy> for PartitioningStrategy {
    fn from(strategy: CurrentTimeStrategy) -> Self {
        PartitioningStrategy::CurrentTime(strategy)
    }
}

impl From<CurrentTimeAndCategoryStrategy> for PartitioningStrategy {
    fn from(strategy: CurrentTimeAndCategoryStrategy) -> Self {
        PartitioningStrategy::CurrentTimeAndCategory(strategy)
    }
}

impl From<CategoryCurrentTimeStrategy> for PartitioningStrategy {
    fn from(strategy: CategoryCurrentTimeStrategy) -> Self {
        PartitioningStrategy::CategoryCurrentTime(strategy)
    }
}
