// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Datastore configuration.
//!
//! The datastore is driven by a flat string property map that names the
//! physical tables and columns playing each logical role. The map is loaded
//! once and is read-only afterwards.
//!
//! ## Properties
//!
//! | Property | Description |
//! |----------|-------------|
//! | `Name` | Datastore name, used as the `~name` identifier suffix |
//! | `DatabaseEngine` | Engine family used for precision corrections |
//! | `MetadataTable` | Table holding one row per time series |
//! | `MetadataTable.IdColumn` | Numeric id joined to the data table |
//! | `MetadataTable.LocationTypeColumn` | Location type role |
//! | `MetadataTable.LocationIdColumn` | Location id role |
//! | `MetadataTable.DataSourceColumn` | Data source role |
//! | `MetadataTable.DataTypeColumn` | Data type role |
//! | `MetadataTable.DataIntervalColumn` | Interval role |
//! | `MetadataTable.ScenarioColumn` | Scenario role |
//! | `MetadataTable.DescriptionColumn` | Series description |
//! | `MetadataTable.UnitsColumn` | Data units |
//! | `DataTable` | Data table, may contain `${TS:...}` or `%X` tokens |
//! | `DataTable.MetadataIdColumn` | Column referencing the metadata id |
//! | `DataTable.DateTimeColumn` | Date/time column |
//! | `DataTable.ValueColumn` | Value column |
//! | `DataTable.FlagColumn` | Optional data flag column |
//! | `MetadataFilter.N` | `Label,Column,Kind,Editable,Description` |
//!
//! Any `DataTable.*` column property may use the per-table form
//! `Table1:Value1,Table2:Value2`, resolved with
//! [`DatastoreConfig::property_for_table`].

use crate::error::{DatastoreErrorHelper, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub const PROP_NAME: &str = "Name";
pub const PROP_DESCRIPTION: &str = "Description";
pub const PROP_DATABASE_ENGINE: &str = "DatabaseEngine";
pub const PROP_LOGGING_LEVEL: &str = "Logging.Level";
pub const PROP_LOGGING_FILE: &str = "Logging.File";

pub const PROP_METADATA_TABLE: &str = "MetadataTable";
pub const PROP_META_ID_COLUMN: &str = "MetadataTable.IdColumn";
pub const PROP_META_LOCATION_TYPE_COLUMN: &str = "MetadataTable.LocationTypeColumn";
pub const PROP_META_LOCATION_ID_COLUMN: &str = "MetadataTable.LocationIdColumn";
pub const PROP_META_DATA_SOURCE_COLUMN: &str = "MetadataTable.DataSourceColumn";
pub const PROP_META_DATA_TYPE_COLUMN: &str = "MetadataTable.DataTypeColumn";
pub const PROP_META_INTERVAL_COLUMN: &str = "MetadataTable.DataIntervalColumn";
pub const PROP_META_SCENARIO_COLUMN: &str = "MetadataTable.ScenarioColumn";
pub const PROP_META_DESCRIPTION_COLUMN: &str = "MetadataTable.DescriptionColumn";
pub const PROP_META_UNITS_COLUMN: &str = "MetadataTable.UnitsColumn";

pub const PROP_DATA_TABLE: &str = "DataTable";
pub const PROP_DATA_META_ID_COLUMN: &str = "DataTable.MetadataIdColumn";
pub const PROP_DATA_DATETIME_COLUMN: &str = "DataTable.DateTimeColumn";
pub const PROP_DATA_VALUE_COLUMN: &str = "DataTable.ValueColumn";
pub const PROP_DATA_FLAG_COLUMN: &str = "DataTable.FlagColumn";

/// Prefix of the numbered metadata filter properties.
pub const PROP_METADATA_FILTER_PREFIX: &str = "MetadataFilter.";

/// A property value of the form `Table1:Value1,Table2:Value2`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PerTableValue {
    entries: Vec<(String, String)>,
}

impl PerTableValue {
    /// Parse a raw value, or `None` when it has no `:` and so applies to every table.
    fn parse(raw: &str) -> Option<Self> {
        if !raw.contains(':') {
            return None;
        }
        let entries = raw
            .split(',')
            .filter_map(|segment| segment.split_once(':'))
            .map(|(table, value)| (table.trim().to_string(), value.trim().to_string()))
            .collect();
        Some(Self { entries })
    }

    fn lookup(&self, table: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(table))
            .map(|(_, v)| v.as_str())
    }
}

/// Value kind of a metadata filter column, as shown by a filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    String,
    Integer,
    Double,
    Boolean,
}

impl FilterKind {
    fn parse(kind: &str) -> Self {
        match kind.trim().to_uppercase().as_str() {
            "" | "STRING" | "TEXT" => FilterKind::String,
            "INT" | "INTEGER" | "LONG" => FilterKind::Integer,
            "DOUBLE" | "FLOAT" | "NUMBER" => FilterKind::Double,
            "BOOLEAN" | "BOOL" => FilterKind::Boolean,
            other => {
                warn!("Unknown metadata filter kind '{}', using String", other);
                FilterKind::String
            }
        }
    }
}

/// One `MetadataFilter.N` entry exposing an extra metadata column to filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFilterSpec {
    pub label: String,
    pub column: String,
    pub kind: FilterKind,
    pub editable: bool,
    pub description: String,
}

impl MetadataFilterSpec {
    /// Parse `Label,Column,Kind,Editable,Description`; label and column are required.
    fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.splitn(5, ',').map(str::trim).collect();
        if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
            return None;
        }
        Some(Self {
            label: parts[0].to_string(),
            column: parts[1].to_string(),
            kind: parts.get(2).map_or(FilterKind::String, |k| FilterKind::parse(k)),
            editable: parts
                .get(3)
                .is_some_and(|e| e.eq_ignore_ascii_case("true")),
            description: parts.get(4).map_or_else(String::new, |d| d.to_string()),
        })
    }
}

/// Read-only datastore configuration.
#[derive(Debug, Clone, Default)]
pub struct DatastoreConfig {
    properties: HashMap<String, String>,
    per_table: HashMap<String, PerTableValue>,
    metadata_filters: Vec<MetadataFilterSpec>,
}

impl DatastoreConfig {
    /// Build a configuration from `(name, value)` pairs.
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let properties: HashMap<String, String> = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let per_table = properties
            .iter()
            .filter_map(|(k, v)| PerTableValue::parse(v).map(|parsed| (k.clone(), parsed)))
            .collect();

        let mut config = Self {
            properties,
            per_table,
            metadata_filters: Vec::new(),
        };
        config.metadata_filters = config.parse_metadata_filters();
        debug!(
            "Loaded datastore configuration: {} properties, {} metadata filters",
            config.properties.len(),
            config.metadata_filters.len()
        );
        config
    }

    /// Parse `.properties` style text: `Name = Value` lines, `#`/`!` comments.
    ///
    /// Values wrapped in double quotes are unquoted.
    pub fn parse(text: &str) -> Result<Self> {
        let mut properties = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                DatastoreErrorHelper::configuration().message(format!(
                    "Line {}: expected 'Name = Value', got '{}'",
                    line_no + 1,
                    line
                ))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(DatastoreErrorHelper::configuration()
                    .message(format!("Line {}: empty property name", line_no + 1)));
            }
            properties.push((key.to_string(), unquote(value.trim()).to_string()));
        }
        Ok(Self::from_properties(properties))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DatastoreErrorHelper::configuration()
                .message(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// Raw property value. Exact name match first, then case-insensitive.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.lookup_key(name)
            .and_then(|key| self.properties.get(key))
            .map(String::as_str)
    }

    /// Property value, treating an empty or blank value as not configured.
    pub fn configured(&self, name: &str) -> Option<&str> {
        self.property(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Property value resolved for a specific table.
    ///
    /// A value without `:` applies to every table and is returned unchanged.
    /// Otherwise the value is a `Table:Value` list; the entry whose table
    /// matches (case-insensitive) wins, and no match yields `None`.
    pub fn property_for_table(&self, name: &str, table: &str) -> Option<&str> {
        let key = self.lookup_key(name)?;
        match self.per_table.get(key) {
            Some(parsed) => parsed.lookup(table),
            None => self.properties.get(key).map(String::as_str),
        }
    }

    /// Numbered `MetadataFilter.N` entries in ascending order.
    pub fn metadata_filters(&self) -> &[MetadataFilterSpec] {
        &self.metadata_filters
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    fn lookup_key(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.properties.get_key_value(name) {
            return Some(key.as_str());
        }
        self.properties
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    fn parse_metadata_filters(&self) -> Vec<MetadataFilterSpec> {
        let mut filters = Vec::new();
        for n in 1.. {
            let name = format!("{}{}", PROP_METADATA_FILTER_PREFIX, n);
            let Some(raw) = self.property(&name) else {
                break;
            };
            match MetadataFilterSpec::parse(raw) {
                Some(spec) => filters.push(spec),
                None => warn!("Ignoring malformed {} = '{}'", name, raw),
            }
        }
        filters
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
