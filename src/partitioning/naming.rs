//! Deterministic partition names

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use super::Error;
use super::partition::Category;
use super::size::PartitionUnit;

/// Format of a list partition name, `%s` is replaced by its joined values.
pub const DEFAULT_LIST_NAME_FORMAT: &str = "%s";

/// Outer format used by [`partition_by_category_and_current_time`](super::partition_by_category_and_current_time).
pub const DEFAULT_CATEGORY_NAME_FORMAT: &str = "categories_%s";

pub(crate) const CATEGORY_PLACEHOLDER: &str = "{category}";

/// strftime pattern used for a time bucket when no override is configured.
pub fn default_name_format(unit: PartitionUnit) -> &'static str {
    match unit {
        PartitionUnit::Years => "%Y",
        PartitionUnit::Months => "%Y_%b",
        PartitionUnit::Weeks => "%Y_week_%W",
        PartitionUnit::Days => "%Y_%b_%d",
        PartitionUnit::Hours => "%Y_%b_%d_%H:00:00",
    }
}

/// Renders `dt` with a strftime pattern, lower-cased.
pub(crate) fn format_datetime(dt: DateTime<Utc>, format: &str) -> Result<String, Error> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(Error::Naming(format!("invalid datetime format {:?}", format)));
    }

    let mut name = String::new();
    write!(name, "{}", dt.format_with_items(items.iter()))
        .map_err(|_| Error::Naming(format!("cannot render {} with {:?}", dt, format)))?;

    Ok(name.to_lowercase())
}

/// Rejects time formats without a single date or time field, since every
/// bucket would render to the same name.
pub(crate) fn check_time_format(format: &str) -> Result<(), Error> {
    let has_field = StrftimeItems::new(format)
        .any(|item| matches!(item, Item::Numeric(..) | Item::Fixed(_)));
    if !has_field {
        return Err(Error::Configuration(format!(
            "name format {:?} has no date or time field",
            format
        )));
    }
    Ok(())
}

pub(crate) fn format_list_name(format: &str, values: &[Category]) -> Result<String, Error> {
    if format.matches("%s").count() != 1 {
        return Err(Error::Naming(format!(
            "list name format {:?} must contain exactly one %s",
            format
        )));
    }

    let joined = values
        .iter()
        .map(|value| value.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .join("_");

    Ok(format.replacen("%s", &joined, 1))
}
