use std::fmt;

use super::Error;

/// How a partitioned table splits its rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartitioningMethod {
    Range,
    List,
    Hash,
}

impl PartitioningMethod {
    pub fn as_sql(&self) -> &'static str {
        match self {
            PartitioningMethod::Range => "RANGE",
            PartitioningMethod::List => "LIST",
            PartitioningMethod::Hash => "HASH",
        }
    }
}

impl fmt::Display for PartitioningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Partitioning method together with the columns it applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartitionKey {
    pub method: PartitioningMethod,
    pub columns: Vec<String>,
}

impl PartitionKey {
    pub fn new<I, S>(method: PartitioningMethod, columns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() || columns.iter().any(|c| c.is_empty()) {
            return Err(Error::Configuration(format!(
                "{} partitioning requires at least one key column",
                method
            )));
        }
        Ok(Self { method, columns })
    }
}

/// Descriptor of a partitioned table, optionally partitioned on two levels.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PartitionedTable {
    name: String,
    key: PartitionKey,
    sub_partitioning: Option<PartitionKey>,
}

impl PartitionedTable {
    pub fn new<I, S>(
        name: impl Into<String>,
        method: PartitioningMethod,
        key: I,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Configuration("table name cannot be empty".to_string()));
        }

        let key = PartitionKey::new(method, key).map_err(|e| match e {
            Error::Configuration(msg) => Error::Configuration(format!("table {}: {}", name, msg)),
            other => other,
        })?;

        Ok(Self {
            name,
            key,
            sub_partitioning: None,
        })
    }

    /// Partitions every first-level partition again by `method` over `key`.
    pub fn sub_partitioned_by<I, S>(mut self, method: PartitioningMethod, key: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sub_key = PartitionKey::new(method, key).map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("table {} sub-partitioning: {}", self.name, msg))
            }
            other => other,
        })?;
        self.sub_partitioning = Some(sub_key);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> PartitioningMethod {
        self.key.method
    }

    pub fn key(&self) -> &[String] {
        &self.key.columns
    }

    pub fn sub_partitioning(&self) -> Option<&PartitionKey> {
        self.sub_partitioning.as_ref()
    }
}
