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

//! Relational backends the datastore reads from.
//!
//! This module provides:
//! - [`Backend`] trait: the abstract relational execution contract
//! - [`AdbcBackend`]: implementation over any ADBC connection
//!
//! Connection management (pooling, retry, reconnection) belongs to the
//! backend; the datastore assumes a live connection on every call.

pub mod adbc;

use crate::error::Result;
use crate::metadata::type_mapping::{parse_decimal_params, sql_type_name_to_code, sql_types};
use arrow_array::RecordBatchReader;
use std::fmt;

pub use adbc::AdbcBackend;

/// Forward-only cursor over a query result.
///
/// Dropping the reader releases the underlying cursor, so every exit path
/// (including `?` and early returns) closes it.
pub type ResultReader = Box<dyn RecordBatchReader + Send>;

/// Relational engine family.
///
/// Only used to pick the precision corrections applied to floating-point
/// columns; see [`crate::metadata::type_mapping::corrector_for`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineFamily {
    /// Engine family "A": under-reports decimal digits as zero.
    SqlServer,
    /// Engine family "B": reports scale -127 for unconstrained numerics.
    Oracle,
    /// Any other engine; no corrections.
    Other(String),
    #[default]
    Unknown,
}

impl EngineFamily {
    /// Parse an engine name as written in the `DatabaseEngine` property.
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "" => EngineFamily::Unknown,
            "a" | "sqlserver" | "mssql" | "microsoftsqlserver" => EngineFamily::SqlServer,
            "b" | "oracle" => EngineFamily::Oracle,
            _ => EngineFamily::Other(name.trim().to_string()),
        }
    }
}

impl fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineFamily::SqlServer => write!(f, "SqlServer"),
            EngineFamily::Oracle => write!(f, "Oracle"),
            EngineFamily::Other(name) => write!(f, "{}", name),
            EngineFamily::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Column description reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// The name of the column.
    pub column_name: String,
    /// The JDBC/XDBC type code (see [`sql_types`]).
    pub type_code: i32,
    /// The database-specific type name.
    pub type_name: String,
    /// Column width (precision for numerics, max length for strings).
    pub column_size: Option<i32>,
    /// Number of decimal digits (scale).
    pub decimal_digits: Option<i32>,
}

impl ColumnInfo {
    /// Describe a column from its SQL type name, e.g. `NUMERIC(10,2)` or `varchar`.
    pub fn from_type_name(column_name: impl Into<String>, type_name: &str) -> Self {
        let type_code = sql_type_name_to_code(type_name);
        let (column_size, decimal_digits) = match type_code {
            sql_types::DECIMAL | sql_types::NUMERIC => {
                let (precision, scale) = parse_decimal_params(type_name);
                (Some(precision), Some(scale))
            }
            _ => (parse_length_param(type_name), None),
        };
        Self {
            column_name: column_name.into(),
            type_code,
            type_name: type_name.to_string(),
            column_size,
            decimal_digits,
        }
    }
}

/// Parse the length from `VARCHAR(255)` style type names.
fn parse_length_param(type_name: &str) -> Option<i32> {
    let start = type_name.find('(')?;
    let end = type_name.find(')')?;
    type_name.get(start + 1..end)?.trim().parse().ok()
}

/// Abstract relational execution used by the datastore.
pub trait Backend: Send + Sync {
    /// Describe a column, or `None` if the table or column does not exist.
    fn column_info(&self, table: &str, column: &str) -> Result<Option<ColumnInfo>>;

    /// Type code of a column, or `None` if it does not exist.
    fn column_type(&self, table: &str, column: &str) -> Result<Option<i32>> {
        Ok(self.column_info(table, column)?.map(|info| info.type_code))
    }

    /// Execute a query and return a forward-only reader over its result.
    fn execute(&self, sql: &str) -> Result<ResultReader>;

    /// The relational engine family.
    fn engine_family(&self) -> EngineFamily;
}
