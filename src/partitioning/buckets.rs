//! Cursors over consecutive time buckets.

use chrono::{DateTime, Utc};

use super::Error;
use super::size::PartitionSize;

/// Half-open time range `[start, end)` covered by one partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeBucket {
    pub fn new(size: PartitionSize, start: DateTime<Utc>) -> Result<Self, Error> {
        let end = size.as_delta().add_to(start)?;
        Ok(Self { start, end })
    }
}

/// Yields `count` consecutive buckets, each starting where the previous ended.
#[derive(Clone, Debug)]
pub struct ForwardBuckets {
    size: PartitionSize,
    next: Option<DateTime<Utc>>,
    remaining: usize,
}

impl ForwardBuckets {
    /// Fails with [`Error::OutOfRange`] when the last bucket would end past
    /// the representable range. `start` is expected to be a bucket start.
    pub fn new(size: PartitionSize, start: DateTime<Utc>, count: usize) -> Result<Self, Error> {
        let horizon = size.as_delta().checked_mul(count).ok_or_else(|| {
            Error::OutOfRange(format!("{} buckets of {} from {}", count, size, start))
        })?;
        horizon.add_to(start)?;

        Ok(Self {
            size,
            next: Some(start),
            remaining: count,
        })
    }
}

impl Iterator for ForwardBuckets {
    type Item = TimeBucket;

    fn next(&mut self) -> Option<TimeBucket> {
        if self.remaining == 0 {
            return None;
        }
        let start = self.next.take()?;
        // horizon already checked in new()
        let bucket = TimeBucket::new(self.size, start).ok()?;

        self.remaining -= 1;
        self.next = Some(bucket.end);
        Some(bucket)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Walks backward from a starting bucket, one bucket width per step.
///
/// The walk has no lower bound: it only ends once calendar arithmetic
/// leaves the representable range. Consumers must stop pulling on their own,
/// the manager does so as soon as the catalog reports a cursor position as
/// absent.
#[derive(Clone, Debug)]
pub struct BackwardBuckets {
    size: PartitionSize,
    cursor: Option<DateTime<Utc>>,
}

impl BackwardBuckets {
    pub fn new(size: PartitionSize, start: DateTime<Utc>) -> Self {
        Self {
            size,
            cursor: Some(start),
        }
    }
}

impl Iterator for BackwardBuckets {
    type Item = TimeBucket;

    fn next(&mut self) -> Option<TimeBucket> {
        let start = self.cursor.take()?;
        let bucket = match TimeBucket::new(self.size, start) {
            Ok(bucket) => bucket,
            Err(e) => {
                log::warn!("Stopping backward bucket enumeration: {}", e);
                return None;
            }
        };

        self.cursor = self.size.as_delta().sub_from(start).ok();
        Some(bucket)
    }
}
