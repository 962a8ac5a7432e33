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

//! Configuration-driven time-series datastore over a relational backend.
//!
//! The datastore knows nothing about the schema beyond what the
//! configuration names: one metadata table with a column per identifier
//! part, and one data table (possibly named per series) holding
//! `metadata id, date/time, value[, flag]` rows.
//!
//! ## Example
//!
//! ```ignore
//! use generic_datastore::{DatastoreConfig, GenericDatabaseDatastore, SeriesFilter};
//!
//! let config = DatastoreConfig::load("hydro.cfg")?;
//! let datastore = GenericDatabaseDatastore::new(config, backend);
//! let types = datastore.list_data_types(&SeriesFilter::default());
//! let series = datastore.read_time_series("08236000.USGS.Streamflow.Day", None, None, true)?;
//! ```

use crate::backend::{Backend, EngineFamily, ResultReader};
use crate::config::{self, DatastoreConfig, MetadataFilterSpec};
use crate::error::{DatastoreErrorHelper, Result};
use crate::logging::{init_logging, LogConfig};
use crate::metadata::cache::DistinctValueCache;
use crate::metadata::filter::{assemble_scoped_clause, FilterClauseSource};
use crate::metadata::parse::{collect_string_column, int_value, string_value};
use crate::metadata::sql::{SelectQuery, SqlValue};
use crate::metadata::type_mapping::{
    corrector_for, describe_column, ColumnField, PrecisionCorrector,
};
use crate::reader::{populate_series, read_points, DateTimeEncoding};
use crate::types::datetime::{DatePrecision, TsDateTime};
use crate::types::ident::TsIdent;
use crate::types::interval::TimeInterval;
use crate::types::meta::TimeSeriesMeta;
use crate::types::series::TimeSeries;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_NAME: &str = "GenericDatabaseDatastore";

/// Identifier parts stored as metadata table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataRole {
    LocationType,
    LocationId,
    DataSource,
    DataType,
    Interval,
    Scenario,
}

impl MetadataRole {
    pub const ALL: [MetadataRole; 6] = [
        MetadataRole::LocationType,
        MetadataRole::LocationId,
        MetadataRole::DataSource,
        MetadataRole::DataType,
        MetadataRole::Interval,
        MetadataRole::Scenario,
    ];

    /// Property naming the column for this role.
    pub fn property(self) -> &'static str {
        match self {
            MetadataRole::LocationType => config::PROP_META_LOCATION_TYPE_COLUMN,
            MetadataRole::LocationId => config::PROP_META_LOCATION_ID_COLUMN,
            MetadataRole::DataSource => config::PROP_META_DATA_SOURCE_COLUMN,
            MetadataRole::DataType => config::PROP_META_DATA_TYPE_COLUMN,
            MetadataRole::Interval => config::PROP_META_INTERVAL_COLUMN,
            MetadataRole::Scenario => config::PROP_META_SCENARIO_COLUMN,
        }
    }
}

impl fmt::Display for MetadataRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetadataRole::LocationType => "location type",
            MetadataRole::LocationId => "location ID",
            MetadataRole::DataSource => "data source",
            MetadataRole::DataType => "data type",
            MetadataRole::Interval => "interval",
            MetadataRole::Scenario => "scenario",
        };
        f.write_str(name)
    }
}

/// Filter arguments for list and lookup operations.
///
/// `None`, an empty string and `*` all mean "not filtered".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesFilter<'a> {
    pub location_type: Option<&'a str>,
    pub location_id: Option<&'a str>,
    pub data_source: Option<&'a str>,
    pub data_type: Option<&'a str>,
    pub interval: Option<&'a str>,
    pub scenario: Option<&'a str>,
}

impl<'a> SeriesFilter<'a> {
    /// Filter matching every part of an identifier.
    pub fn from_ident(ident: &'a TsIdent) -> Self {
        Self {
            location_type: Some(&ident.location_type),
            location_id: Some(&ident.location_id),
            data_source: Some(&ident.data_source),
            data_type: Some(&ident.data_type),
            interval: Some(&ident.interval),
            scenario: Some(&ident.scenario),
        }
    }

    pub fn location_type(mut self, value: &'a str) -> Self {
        self.location_type = Some(value);
        self
    }

    pub fn location_id(mut self, value: &'a str) -> Self {
        self.location_id = Some(value);
        self
    }

    pub fn data_source(mut self, value: &'a str) -> Self {
        self.data_source = Some(value);
        self
    }

    pub fn data_type(mut self, value: &'a str) -> Self {
        self.data_type = Some(value);
        self
    }

    pub fn interval(mut self, value: &'a str) -> Self {
        self.interval = Some(value);
        self
    }

    pub fn scenario(mut self, value: &'a str) -> Self {
        self.scenario = Some(value);
        self
    }

    pub fn get(&self, role: MetadataRole) -> Option<&'a str> {
        match role {
            MetadataRole::LocationType => self.location_type,
            MetadataRole::LocationId => self.location_id,
            MetadataRole::DataSource => self.data_source,
            MetadataRole::DataType => self.data_type,
            MetadataRole::Interval => self.interval,
            MetadataRole::Scenario => self.scenario,
        }
    }
}

/// Distinct values of one metadata column, filtered on the other columns.
///
/// Shared by the five `list_*` operations.
#[derive(Debug, Clone, Copy)]
pub struct DistinctListQuery<'a> {
    target: MetadataRole,
    filter: SeriesFilter<'a>,
}

impl<'a> DistinctListQuery<'a> {
    pub fn new(target: MetadataRole, filter: SeriesFilter<'a>) -> Self {
        Self { target, filter }
    }

    pub fn target(&self) -> MetadataRole {
        self.target
    }

    fn filter_roles(&self) -> impl Iterator<Item = MetadataRole> + '_ {
        MetadataRole::ALL
            .into_iter()
            .filter(move |role| *role != self.target)
    }

    /// `true` if every filter argument other than the target is unset.
    pub fn is_unfiltered(&self) -> bool {
        self.filter_roles().all(|role| self.filter.get(role).is_none())
    }

    /// The filter arguments joined by `.`, unset ones as `null`.
    pub fn cache_key(&self) -> String {
        self.filter_roles()
            .map(|role| self.filter.get(role).unwrap_or("null"))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn build_select(&self, layout: &MetadataLayout) -> Option<SelectQuery> {
        let Some(target_column) = layout.column(self.target) else {
            warn!(
                "No {} column configured ({}), cannot list values",
                self.target,
                self.target.property()
            );
            return None;
        };
        let mut query = SelectQuery::new(&layout.table)
            .distinct()
            .column(target_column);
        for role in self.filter_roles() {
            if let Some(column) = layout.column(role) {
                query = query.filter_equals(column, self.filter.get(role));
            }
        }
        Some(query.order_by(target_column))
    }
}

/// Column selected into a metadata query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaField {
    Id,
    Role(MetadataRole),
    Description,
    Units,
}

/// Metadata table and its qualified column names, resolved from configuration.
#[derive(Debug, Clone)]
struct MetadataLayout {
    table: String,
    fields: Vec<(MetaField, String)>,
}

impl MetadataLayout {
    fn from_config(config: &DatastoreConfig) -> Option<Self> {
        let table = config.configured(config::PROP_METADATA_TABLE)?.to_string();
        let mut fields = Vec::new();
        let mut add = |field: MetaField, property: &str| {
            if let Some(column) = config
                .property_for_table(property, &table)
                .map(str::trim)
                .filter(|c| !c.is_empty())
            {
                fields.push((field, qualify(&table, column)));
            }
        };
        add(MetaField::Id, config::PROP_META_ID_COLUMN);
        for role in MetadataRole::ALL {
            add(MetaField::Role(role), role.property());
        }
        add(MetaField::Description, config::PROP_META_DESCRIPTION_COLUMN);
        add(MetaField::Units, config::PROP_META_UNITS_COLUMN);
        Some(Self { table, fields })
    }

    fn field(&self, field: MetaField) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, column)| column.as_str())
    }

    fn column(&self, role: MetadataRole) -> Option<&str> {
        self.field(MetaField::Role(role))
    }

    /// Every configured column, in `fields` order.
    fn select(&self) -> SelectQuery {
        SelectQuery::new(&self.table).columns(self.fields.iter().map(|(_, c)| c.clone()))
    }
}

fn qualify(table: &str, column: &str) -> String {
    if column.contains('.') {
        column.to_string()
    } else {
        format!("{}.{}", table, column)
    }
}

fn unqualified(column: &str) -> &str {
    column.rsplit_once('.').map_or(column, |(_, c)| c)
}

/// Read-only time-series datastore over a [`Backend`].
pub struct GenericDatabaseDatastore {
    config: DatastoreConfig,
    backend: Arc<dyn Backend>,
    corrector: Box<dyn PrecisionCorrector>,
    cache: DistinctValueCache,
    layout: Option<MetadataLayout>,
    name: String,
}

impl fmt::Debug for GenericDatabaseDatastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericDatabaseDatastore")
            .field("name", &self.name)
            .field("corrector", &self.corrector)
            .field("cached_lists", &self.cache.len())
            .finish()
    }
}

impl GenericDatabaseDatastore {
    /// Create a datastore.
    ///
    /// Initializes logging from the `Logging.*` properties and selects the
    /// precision corrector from `DatabaseEngine`, falling back to the
    /// backend's own engine family.
    pub fn new(config: DatastoreConfig, backend: Arc<dyn Backend>) -> Self {
        init_logging(&LogConfig::from_config(&config));

        let engine = config
            .configured(config::PROP_DATABASE_ENGINE)
            .map(EngineFamily::from_name)
            .unwrap_or_else(|| backend.engine_family());
        let corrector = corrector_for(&engine);
        let layout = MetadataLayout::from_config(&config);
        if layout.is_none() {
            warn!("No {} configured", config::PROP_METADATA_TABLE);
        }
        let name = config
            .configured(config::PROP_NAME)
            .unwrap_or(DEFAULT_NAME)
            .to_string();
        info!("Created datastore '{}' for engine {}", name, engine);

        Self {
            config,
            backend,
            corrector,
            cache: DistinctValueCache::new(),
            layout,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Description` property, or the name.
    pub fn description(&self) -> &str {
        self.config
            .configured(config::PROP_DESCRIPTION)
            .unwrap_or(&self.name)
    }

    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    /// Extra filterable metadata columns (`MetadataFilter.N`).
    pub fn metadata_filter_specs(&self) -> &[MetadataFilterSpec] {
        self.config.metadata_filters()
    }

    /// Whether time series can be read: the required tables and columns
    /// are configured and exist in the backend.
    ///
    /// For a data table named per series only the configuration is checked.
    pub fn has_time_series_capability(&self) -> bool {
        const REQUIRED: [&str; 10] = [
            config::PROP_METADATA_TABLE,
            config::PROP_META_ID_COLUMN,
            config::PROP_META_LOCATION_ID_COLUMN,
            config::PROP_META_DATA_SOURCE_COLUMN,
            config::PROP_META_DATA_TYPE_COLUMN,
            config::PROP_META_INTERVAL_COLUMN,
            config::PROP_DATA_TABLE,
            config::PROP_DATA_META_ID_COLUMN,
            config::PROP_DATA_DATETIME_COLUMN,
            config::PROP_DATA_VALUE_COLUMN,
        ];
        let missing: Vec<&str> = REQUIRED
            .into_iter()
            .filter(|p| self.config.configured(p).is_none())
            .collect();
        if !missing.is_empty() {
            warn!(
                "Time series reading disabled, missing properties: {}",
                missing.join(", ")
            );
            return false;
        }
        let Some(ref layout) = self.layout else {
            return false;
        };

        for (_, column) in &layout.fields {
            if !self.column_exists(&layout.table, unqualified(column)) {
                return false;
            }
        }

        let Some(data_table) = self.config.configured(config::PROP_DATA_TABLE) else {
            return false;
        };
        if is_templated(data_table) {
            debug!("Data table '{}' is named per series", data_table);
            return true;
        }
        [
            config::PROP_DATA_META_ID_COLUMN,
            config::PROP_DATA_DATETIME_COLUMN,
            config::PROP_DATA_VALUE_COLUMN,
            config::PROP_DATA_FLAG_COLUMN,
        ]
        .into_iter()
        .filter_map(|p| self.data_column(p, data_table))
        .all(|column| self.column_exists(data_table, &column))
    }

    fn column_exists(&self, table: &str, column: &str) -> bool {
        match self.backend.column_info(table, column) {
            Ok(Some(_)) => true,
            Ok(None) => {
                warn!("Column {}.{} not found", table, column);
                false
            }
            Err(e) => {
                warn!("Error checking column {}.{}: {}", table, column, e);
                false
            }
        }
    }

    pub fn list_data_types(&self, filter: &SeriesFilter<'_>) -> Vec<String> {
        self.list_distinct(MetadataRole::DataType, filter)
    }

    pub fn list_data_sources(&self, filter: &SeriesFilter<'_>) -> Vec<String> {
        self.list_distinct(MetadataRole::DataSource, filter)
    }

    pub fn list_intervals(&self, filter: &SeriesFilter<'_>) -> Vec<String> {
        self.list_distinct(MetadataRole::Interval, filter)
    }

    pub fn list_location_ids(&self, filter: &SeriesFilter<'_>) -> Vec<String> {
        self.list_distinct(MetadataRole::LocationId, filter)
    }

    pub fn list_location_types(&self, filter: &SeriesFilter<'_>) -> Vec<String> {
        self.list_distinct(MetadataRole::LocationType, filter)
    }

    /// Distinct values of `target`, sorted by the backend.
    ///
    /// Only the unfiltered data type list is cached.
    fn list_distinct(&self, target: MetadataRole, filter: &SeriesFilter<'_>) -> Vec<String> {
        let query = DistinctListQuery::new(target, *filter);
        if target == MetadataRole::DataType && query.is_unfiltered() {
            return self
                .cache
                .get_or_compute(&query.cache_key(), || self.run_distinct(&query));
        }
        self.run_distinct(&query).unwrap_or_default()
    }

    fn run_distinct(&self, query: &DistinctListQuery<'_>) -> Option<Vec<String>> {
        let layout = self.layout.as_ref()?;
        let sql = query.build_select(layout)?.build();
        let reader = self.execute_logged(&sql)?;
        match collect_string_column(reader) {
            Ok(values) => {
                debug!("Found {} distinct {} values", values.len(), query.target());
                Some(values)
            }
            Err(e) => {
                warn!("Error reading {} list: {} (query: {})", query.target(), e, sql);
                None
            }
        }
    }

    /// The one metadata record matching `filter`.
    ///
    /// Zero or several matches are logged and give `None`.
    pub fn read_time_series_meta(&self, filter: &SeriesFilter<'_>) -> Option<TimeSeriesMeta> {
        let layout = self.layout.as_ref()?;
        let mut query = layout.select();
        for role in MetadataRole::ALL {
            if let Some(column) = layout.column(role) {
                query = query.filter_equals(column, filter.get(role));
            }
        }
        let sql = query.build();
        let metas = self.run_meta_query(layout, &sql)?;
        match single_meta(metas, &sql) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Metadata records of one data type and interval, narrowed by a filter panel.
    ///
    /// Panel clauses are scoped to the location type, location ID, data
    /// source and scenario columns plus every `MetadataFilter.N` column.
    pub fn read_time_series_meta_list<F>(
        &self,
        data_type: Option<&str>,
        interval: Option<&str>,
        filters: &F,
    ) -> Vec<TimeSeriesMeta>
    where
        F: FilterClauseSource + ?Sized,
    {
        let Some(layout) = self.layout.as_ref() else {
            return Vec::new();
        };
        let mut query = layout.select();
        if let Some(column) = layout.column(MetadataRole::DataType) {
            query = query.filter_equals(column, data_type);
        }
        if let Some(column) = layout.column(MetadataRole::Interval) {
            query = query.filter_equals(column, interval);
        }
        for role in [
            MetadataRole::LocationType,
            MetadataRole::LocationId,
            MetadataRole::DataSource,
            MetadataRole::Scenario,
        ] {
            if let Some(column) = layout.column(role) {
                query = query.where_clause(assemble_scoped_clause(filters, column));
            }
        }
        for spec in self.config.metadata_filters() {
            let column = qualify(&layout.table, &spec.column);
            query = query.where_clause(assemble_scoped_clause(filters, &column));
        }

        let sql = query.build();
        let metas = self.run_meta_query(layout, &sql).unwrap_or_default();
        debug!("Found {} time series metadata records", metas.len());
        metas
    }

    fn run_meta_query(&self, layout: &MetadataLayout, sql: &str) -> Option<Vec<TimeSeriesMeta>> {
        let reader = self.execute_logged(sql)?;
        match read_meta_rows(reader, layout) {
            Ok(metas) => Some(metas),
            Err(e) => {
                warn!("Error reading time series metadata: {} (query: {})", e, sql);
                None
            }
        }
    }

    /// Read a series by identifier.
    ///
    /// Returns `Ok(None)` when the metadata does not resolve to one record
    /// or the data can not be queried. Fails for a malformed identifier and
    /// for a date/time column whose type is neither an integer year nor a
    /// date/timestamp.
    pub fn read_time_series(
        &self,
        identifier: &str,
        start: Option<TsDateTime>,
        end: Option<TsDateTime>,
        read_data: bool,
    ) -> Result<Option<TimeSeries>> {
        let ident = TsIdent::parse(identifier)?;
        let Some(meta) = self.read_time_series_meta(&SeriesFilter::from_ident(&ident)) else {
            return Ok(None);
        };
        self.read_time_series_for_meta(&meta, start, end, read_data)
    }

    /// Read a series for an already resolved metadata record.
    pub fn read_time_series_for_meta(
        &self,
        meta: &TimeSeriesMeta,
        start: Option<TsDateTime>,
        end: Option<TsDateTime>,
        read_data: bool,
    ) -> Result<Option<TimeSeries>> {
        let mut series = TimeSeries::new(meta.identifier(Some(&self.name)))
            .with_description(meta.description())
            .with_units(meta.units());
        if !read_data {
            return Ok(Some(series));
        }

        let Some(template) = self.config.configured(config::PROP_DATA_TABLE) else {
            warn!("No {} configured, cannot read data", config::PROP_DATA_TABLE);
            return Ok(None);
        };
        let table = expand_data_table(template, meta);
        let columns = (
            self.data_column(config::PROP_DATA_META_ID_COLUMN, &table),
            self.data_column(config::PROP_DATA_DATETIME_COLUMN, &table),
            self.data_column(config::PROP_DATA_VALUE_COLUMN, &table),
        );
        let (Some(id_column), Some(date_column), Some(value_column)) = columns else {
            warn!("Data table {} columns are not fully configured", table);
            return Ok(None);
        };
        let flag_column = self.data_column(config::PROP_DATA_FLAG_COLUMN, &table);

        let type_code = match self.backend.column_type(&table, &date_column) {
            Ok(Some(code)) => code,
            Ok(None) => {
                warn!("Date/time column {}.{} not found", table, date_column);
                return Ok(None);
            }
            Err(e) => {
                warn!("Error describing {}.{}: {}", table, date_column, e);
                return Ok(None);
            }
        };
        let encoding = DateTimeEncoding::classify(type_code)?;
        let precision = match encoding {
            DateTimeEncoding::BareYear => DatePrecision::Year,
            DateTimeEncoding::FullTimestamp => match TimeInterval::parse(meta.interval()) {
                Ok(interval) => interval.date_precision(),
                Err(e) => {
                    warn!("{}; reading date/times to the second", e);
                    DatePrecision::Second
                }
            },
        };

        let mut query = SelectQuery::new(&table)
            .column(date_column.as_str())
            .column(value_column.as_str());
        if let Some(ref flag) = flag_column {
            query = query.column(flag.as_str());
        }
        query = query.where_equals(&id_column, SqlValue::Integer(meta.id()));
        if let Some(start) = start {
            query = query.at_least(&date_column, bound_value(start, encoding));
        }
        if let Some(end) = end {
            query = query.at_most(&date_column, bound_value(end, encoding));
        }
        let sql = query.order_by(date_column.as_str()).build();

        let Some(reader) = self.execute_logged(&sql) else {
            return Ok(None);
        };
        let points = read_points(reader, encoding, precision, flag_column.is_some());
        populate_series(&mut series, points, start, end, precision);
        Ok(Some(series))
    }

    /// Describe a backend column in internal terms.
    pub fn describe_column(&self, table: &str, column: &str) -> Result<Option<ColumnField>> {
        Ok(self
            .backend
            .column_info(table, column)?
            .map(|info| describe_column(&info, self.corrector.as_ref())))
    }

    /// Data table column name, resolved for `table`.
    fn data_column(&self, property: &str, table: &str) -> Option<String> {
        self.config
            .property_for_table(property, table)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }

    fn execute_logged(&self, sql: &str) -> Option<ResultReader> {
        debug!("Executing query: {}", sql);
        match self.backend.execute(sql) {
            Ok(reader) => Some(reader),
            Err(e) => {
                warn!("Error executing query: {} (query: {})", e, sql);
                None
            }
        }
    }
}

fn bound_value(value: TsDateTime, encoding: DateTimeEncoding) -> SqlValue {
    match encoding {
        DateTimeEncoding::BareYear => SqlValue::Integer(i64::from(value.year())),
        DateTimeEncoding::FullTimestamp => SqlValue::Timestamp(value),
    }
}

/// The only record of `metas`; zero or several records are ambiguous.
fn single_meta(mut metas: Vec<TimeSeriesMeta>, sql: &str) -> Result<TimeSeriesMeta> {
    if metas.len() == 1 {
        if let Some(meta) = metas.pop() {
            return Ok(meta);
        }
    }
    Err(DatastoreErrorHelper::ambiguous_metadata().message(format!(
        "Expected 1 time series metadata record, found {} (query: {})",
        metas.len(),
        sql
    )))
}

/// Build metadata records from a metadata query, reading columns in
/// `layout.fields` order. Unreadable cells are logged and left empty.
fn read_meta_rows(reader: ResultReader, layout: &MetadataLayout) -> Result<Vec<TimeSeriesMeta>> {
    let mut metas = Vec::new();
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            let mut meta = TimeSeriesMeta::new(-1);
            for (index, (field, column)) in layout.fields.iter().enumerate() {
                if index >= batch.num_columns() {
                    break;
                }
                let array = batch.column(index).as_ref();
                if *field == MetaField::Id {
                    match int_value(array, row) {
                        Ok(Some(id)) => meta = TimeSeriesMeta::new(id),
                        Ok(None) => warn!("NULL metadata id in {}", column),
                        Err(e) => warn!("Unreadable metadata id in {}: {}", column, e),
                    }
                    continue;
                }
                let text = match string_value(array, row) {
                    Ok(v) => v.unwrap_or_default(),
                    Err(e) => {
                        warn!("Unreadable metadata value in {}: {}", column, e);
                        String::new()
                    }
                };
                meta = match field {
                    MetaField::Role(MetadataRole::LocationType) => meta.with_location_type(text),
                    MetaField::Role(MetadataRole::LocationId) => meta.with_location_id(text),
                    MetaField::Role(MetadataRole::DataSource) => meta.with_data_source(text),
                    MetaField::Role(MetadataRole::DataType) => meta.with_data_type(text),
                    MetaField::Role(MetadataRole::Interval) => meta.with_interval(text),
                    MetaField::Role(MetadataRole::Scenario) => meta.with_scenario(text),
                    MetaField::Description => meta.with_description(text),
                    MetaField::Units => meta.with_units(text),
                    MetaField::Id => meta,
                };
            }
            metas.push(meta);
        }
    }
    Ok(metas)
}

fn is_templated(table: &str) -> bool {
    table.contains("${") || table.contains('%')
}

/// Expand identifier tokens in a data table name.
///
/// `${TS:LocationType}`, `${TS:LocationID}`, `${TS:DataSource}`,
/// `${TS:DataType}`, `${TS:Interval}` and `${TS:Scenario}` (names are
/// case-insensitive), and the short forms `%L` (location ID), `%T` (data
/// type), `%S` (data source), `%I` (interval) and `%Z` (scenario).
/// Unknown tokens are left as written.
pub fn expand_data_table(template: &str, meta: &TimeSeriesMeta) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['$', '%']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some(body) = rest.strip_prefix("${") {
            if let Some(close) = body.find('}') {
                let token = &body[..close];
                let value = token
                    .split_once(':')
                    .filter(|(ns, _)| ns.eq_ignore_ascii_case("TS"))
                    .and_then(|(_, name)| property_value(name, meta));
                match value {
                    Some(v) => out.push_str(v),
                    None => {
                        warn!("Unknown data table token ${{{}}}", token);
                        out.push_str(&rest[..close + 3]);
                    }
                }
                rest = &rest[close + 3..];
                continue;
            }
        } else if rest.starts_with('%') {
            let value = match rest.as_bytes().get(1) {
                Some(b'L') => Some(meta.location_id()),
                Some(b'T') => Some(meta.data_type()),
                Some(b'S') => Some(meta.data_source()),
                Some(b'I') => Some(meta.interval()),
                Some(b'Z') => Some(meta.scenario()),
                _ => None,
            };
            if let Some(v) = value {
                out.push_str(v);
                rest = &rest[2..];
                continue;
            }
        }
        out.push_str(&rest[..1]);
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

fn property_value<'m>(name: &str, meta: &'m TimeSeriesMeta) -> Option<&'m str> {
    match name.trim().to_lowercase().as_str() {
        "locationtype" => Some(meta.location_type()),
        "locationid" => Some(meta.location_id()),
        "datasource" => Some(meta.data_source()),
        "datatype" => Some(meta.data_type()),
        "interval" => Some(meta.interval()),
        "scenario" => Some(meta.scenario()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn meta() -> TimeSeriesMeta {
        TimeSeriesMeta::new(3)
            .with_location_type("Well")
            .with_location_id("W1")
            .with_data_source("USGS")
            .with_data_type("Level")
            .with_interval("Day")
    }

    #[test]
    fn test_single_meta() {
        let found = single_meta(vec![meta()], "q").unwrap();
        assert_eq!(found.id(), 3);

        let err = single_meta(Vec::new(), "q").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousMetadata);
        assert!(err.to_string().contains("found 0"));

        let err = single_meta(vec![meta(), meta()], "q").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousMetadata);
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_expand_data_table_properties() {
        assert_eq!(
            expand_data_table("ts_${TS:DataType}_${ts:interval}", &meta()),
            "ts_Level_Day"
        );
        assert_eq!(expand_data_table("data_%L_%S", &meta()), "data_W1_USGS");
        assert_eq!(expand_data_table("plain_table", &meta()), "plain_table");
    }

    #[test]
    fn test_expand_data_table_leaves_unknown_tokens() {
        assert_eq!(expand_data_table("t_${TS:Bogus}_x", &meta()), "t_${TS:Bogus}_x");
        assert_eq!(expand_data_table("t_%Q_$", &meta()), "t_%Q_$");
        assert_eq!(expand_data_table("t_${open", &meta()), "t_${open");
    }

    #[test]
    fn test_distinct_list_query_cache_key() {
        let unfiltered = DistinctListQuery::new(MetadataRole::DataType, SeriesFilter::default());
        assert!(unfiltered.is_unfiltered());
        assert_eq!(unfiltered.cache_key(), "null.null.null.null.null");

        // The target's own argument does not count as a filter.
        let own = DistinctListQuery::new(
            MetadataRole::DataType,
            SeriesFilter::default().data_type("Flow"),
        );
        assert!(own.is_unfiltered());

        let filtered = DistinctListQuery::new(
            MetadataRole::DataType,
            SeriesFilter::default().location_id("L1"),
        );
        assert!(!filtered.is_unfiltered());
        assert_eq!(filtered.cache_key(), "null.L1.null.null.null");
    }

    #[test]
    fn test_distinct_list_query_sql() {
        let layout = MetadataLayout {
            table: "meta".to_string(),
            fields: vec![
                (MetaField::Role(MetadataRole::LocationId), "meta.loc".to_string()),
                (MetaField::Role(MetadataRole::DataType), "meta.dtype".to_string()),
            ],
        };
        let query = DistinctListQuery::new(
            MetadataRole::DataType,
            SeriesFilter::default().location_id("L1").scenario("X"),
        );
        assert_eq!(
            query.build_select(&layout).unwrap().build(),
            "SELECT DISTINCT meta.dtype FROM meta WHERE meta.loc = 'L1' ORDER BY meta.dtype"
        );

        let missing = DistinctListQuery::new(MetadataRole::Scenario, SeriesFilter::default());
        assert!(missing.build_select(&layout).is_none());
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify("meta", "loc"), "meta.loc");
        assert_eq!(qualify("meta", "m.loc"), "m.loc");
        assert_eq!(unqualified("meta.loc"), "loc");
    }
}
