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

//! Generic Relational Time-Series Datastore
//!
//! This crate exposes time series stored in an arbitrary relational schema.
//! A flat property configuration names the metadata table, the column
//! holding each identifier part, and the data table; the datastore builds
//! the queries, runs them through a [`Backend`] and reconstructs the rows
//! into [`TimeSeries`].
//!
//! ## Overview
//!
//! - [`GenericDatabaseDatastore`] - list, lookup and read operations
//! - [`DatastoreConfig`] - property configuration
//! - [`Backend`] - relational execution; [`AdbcBackend`] runs over any ADBC connection
//!
//! ## Example
//!
//! ```ignore
//! use generic_datastore::{AdbcBackend, DatastoreConfig, EngineFamily, GenericDatabaseDatastore};
//! use std::sync::Arc;
//!
//! let config = DatastoreConfig::load("hydro.cfg")?;
//! let backend = Arc::new(AdbcBackend::new(connection, EngineFamily::SqlServer));
//! let datastore = GenericDatabaseDatastore::new(config, backend);
//! if datastore.has_time_series_capability() {
//!     let series = datastore.read_time_series("08236000.USGS.Streamflow.Day", None, None, true)?;
//! }
//! ```
//!
//! ## Configuration Options
//!
//! | Property | Description |
//! |----------|-------------|
//! | `Name` | Datastore name, used as the `~name` suffix of identifiers |
//! | `Description` | Datastore description |
//! | `DatabaseEngine` | Engine family (`SqlServer`, `Oracle`, ...) for precision corrections |
//! | `MetadataTable` | Metadata table |
//! | `MetadataTable.IdColumn` | Numeric id joined to the data table |
//! | `MetadataTable.LocationTypeColumn` | Location type |
//! | `MetadataTable.LocationIdColumn` | Location ID |
//! | `MetadataTable.DataSourceColumn` | Data source |
//! | `MetadataTable.DataTypeColumn` | Data type |
//! | `MetadataTable.DataIntervalColumn` | Data interval |
//! | `MetadataTable.ScenarioColumn` | Scenario |
//! | `MetadataTable.DescriptionColumn` | Description |
//! | `MetadataTable.UnitsColumn` | Data units |
//! | `DataTable` | Data table; may contain `${TS:...}` or `%L`-style tokens |
//! | `DataTable.MetadataIdColumn` | Metadata id in the data table |
//! | `DataTable.DateTimeColumn` | Date/time (integer year, date or timestamp) |
//! | `DataTable.ValueColumn` | Value |
//! | `DataTable.FlagColumn` | Optional data flag |
//! | `MetadataFilter.N` | `Label,Column,Kind,Editable,Description` extra filter column |
//! | `Logging.Level` | Log level |
//! | `Logging.File` | Log file, stderr if unset |
//!
//! Any column property may be scoped per table as `Table1:Column1,Table2:Column2`.

pub mod backend;
pub mod config;
pub mod datastore;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod reader;
pub mod types;

// Re-export main types
pub use backend::{AdbcBackend, Backend, ColumnInfo, EngineFamily, ResultReader};
pub use config::{DatastoreConfig, FilterKind, MetadataFilterSpec};
pub use datastore::{DistinctListQuery, GenericDatabaseDatastore, MetadataRole, SeriesFilter};
pub use error::{DatastoreErrorHelper, Error, ErrorKind, Result};

// Re-export domain types
pub use metadata::filter::{FilterClauseSource, FilterOperator, InputFilter, InputFilterSet};
pub use types::{DataPoint, TimeInterval, TimeSeries, TimeSeriesMeta, TsDateTime, TsIdent};
