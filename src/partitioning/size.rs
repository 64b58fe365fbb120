use std::fmt;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeDelta, Timelike, Utc};

use super::Error;

/// Calendar unit a partition is sized in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartitionUnit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
}

impl PartitionUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionUnit::Years => "years",
            PartitionUnit::Months => "months",
            PartitionUnit::Weeks => "weeks",
            PartitionUnit::Days => "days",
            PartitionUnit::Hours => "hours",
        }
    }
}

impl fmt::Display for PartitionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-unit sizes, of which exactly one must be set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizeUnits {
    pub years: Option<u32>,
    pub months: Option<u32>,
    pub weeks: Option<u32>,
    pub days: Option<u32>,
    pub hours: Option<u32>,
}

/// Width of a single time partition.
///
/// Buckets always begin at the start of their unit: yearly buckets on
/// January 1st, monthly buckets on the 1st, weekly buckets on Monday and
/// daily/hourly buckets at the top of the day/hour. All arithmetic is UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PartitionSize {
    unit: PartitionUnit,
    value: u32,
}

impl PartitionSize {
    pub fn new(unit: PartitionUnit, value: u32) -> Result<Self, Error> {
        if value == 0 {
            return Err(Error::Configuration(
                "Partition cannot be 0 in size".to_string(),
            ));
        }
        Ok(Self { unit, value })
    }

    pub fn years(value: u32) -> Result<Self, Error> {
        Self::new(PartitionUnit::Years, value)
    }

    pub fn months(value: u32) -> Result<Self, Error> {
        Self::new(PartitionUnit::Months, value)
    }

    pub fn weeks(value: u32) -> Result<Self, Error> {
        Self::new(PartitionUnit::Weeks, value)
    }

    pub fn days(value: u32) -> Result<Self, Error> {
        Self::new(PartitionUnit::Days, value)
    }

    pub fn hours(value: u32) -> Result<Self, Error> {
        Self::new(PartitionUnit::Hours, value)
    }

    /// Builds a size from optional per-unit arguments. Zero counts as unset.
    pub fn from_units(units: SizeUnits) -> Result<Self, Error> {
        let set: Vec<(PartitionUnit, u32)> = [
            (PartitionUnit::Years, units.years),
            (PartitionUnit::Months, units.months),
            (PartitionUnit::Weeks, units.weeks),
            (PartitionUnit::Days, units.days),
            (PartitionUnit::Hours, units.hours),
        ]
        .into_iter()
        .filter_map(|(unit, value)| value.filter(|v| *v > 0).map(|v| (unit, v)))
        .collect();

        match set.as_slice() {
            [] => Err(Error::Configuration(
                "Partition cannot be 0 in size".to_string(),
            )),
            [(unit, value)] => Self::new(*unit, *value),
            _ => Err(Error::Configuration(format!(
                "Partition can only have one size unit, got {}",
                set.iter()
                    .map(|(unit, _)| unit.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    pub fn unit(&self) -> PartitionUnit {
        self.unit
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn as_delta(&self) -> CalendarDelta {
        match self.unit {
            PartitionUnit::Years => CalendarDelta::years(self.value),
            PartitionUnit::Months => CalendarDelta::months(self.value),
            PartitionUnit::Weeks => CalendarDelta::weeks(self.value),
            PartitionUnit::Days => CalendarDelta::days(self.value),
            PartitionUnit::Hours => CalendarDelta::hours(self.value),
        }
    }

    /// Truncates `dt` down to the start of the bucket containing it.
    pub fn start(&self, dt: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
        let date = dt.date_naive();
        let (date, hour) = match self.unit {
            PartitionUnit::Years => (NaiveDate::from_ymd_opt(date.year(), 1, 1), 0),
            PartitionUnit::Months => (NaiveDate::from_ymd_opt(date.year(), date.month(), 1), 0),
            PartitionUnit::Weeks => (
                date.checked_sub_days(Days::new(u64::from(
                    date.weekday().num_days_from_monday(),
                ))),
                0,
            ),
            PartitionUnit::Days => (Some(date), 0),
            PartitionUnit::Hours => (Some(date), dt.hour()),
        };

        date.and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| Error::OutOfRange(format!("start of {} bucket containing {}", self, dt)))
    }
}

impl fmt::Display for PartitionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Calendar-relative offset.
///
/// The month component is applied first using calendar arithmetic (clamping
/// to the last day of shorter months), then the fixed duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CalendarDelta {
    months: u32,
    duration: TimeDelta,
}

impl CalendarDelta {
    pub fn new(months: u32, duration: TimeDelta) -> Self {
        Self { months, duration }
    }

    pub fn years(years: u32) -> Self {
        Self::months(years.saturating_mul(12))
    }

    pub fn months(months: u32) -> Self {
        Self::new(months, TimeDelta::zero())
    }

    pub fn weeks(weeks: u32) -> Self {
        Self::new(0, TimeDelta::weeks(i64::from(weeks)))
    }

    pub fn days(days: u32) -> Self {
        Self::new(0, TimeDelta::days(i64::from(days)))
    }

    pub fn hours(hours: u32) -> Self {
        Self::new(0, TimeDelta::hours(i64::from(hours)))
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.duration.is_zero()
    }

    /// This delta applied `n` times, `None` when that overflows.
    pub fn checked_mul(&self, n: usize) -> Option<CalendarDelta> {
        let months = u32::try_from(n).ok().and_then(|n| self.months.checked_mul(n))?;
        let duration = i32::try_from(n).ok().and_then(|n| self.duration.checked_mul(n))?;
        Some(Self::new(months, duration))
    }

    pub fn add_to(&self, dt: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
        let shifted = if self.months > 0 {
            dt.checked_add_months(Months::new(self.months))
        } else {
            Some(dt)
        };

        shifted
            .and_then(|d| d.checked_add_signed(self.duration))
            .ok_or_else(|| Error::OutOfRange(format!("{} + {}", dt, self)))
    }

    pub fn sub_from(&self, dt: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
        let shifted = if self.months > 0 {
            dt.checked_sub_months(Months::new(self.months))
        } else {
            Some(dt)
        };

        shifted
            .and_then(|d| d.checked_sub_signed(self.duration))
            .ok_or_else(|| Error::OutOfRange(format!("{} - {}", dt, self)))
    }
}

impl fmt::Display for CalendarDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} months {}s", self.months, self.duration.num_seconds())
    }
}
