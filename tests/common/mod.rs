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

//! Scripted backend and fixtures shared by the integration tests.

#![allow(dead_code)]

use arrow_array::{
    Float64Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray,
    TimestampSecondArray,
};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use chrono::NaiveDate;
use generic_datastore::{
    Backend, ColumnInfo, DatastoreConfig, DatastoreErrorHelper, EngineFamily, ResultReader,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canned result for queries containing a pattern.
#[derive(Debug, Clone)]
enum Response {
    Batches(Arc<Schema>, Vec<RecordBatch>),
    Fail(String),
}

/// Mock backend answering queries from a script.
///
/// The first rule whose pattern occurs in the SQL text answers; rules are
/// reusable. Every executed query is recorded.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    rules: Vec<(String, Response)>,
    columns: HashMap<(String, String), ColumnInfo>,
    engine: EngineFamily,
    executed: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: EngineFamily) -> Self {
        self.engine = engine;
        self
    }

    /// Register a column by SQL type name, e.g. `TIMESTAMP` or `VARCHAR(20)`.
    pub fn with_column(self, table: &str, column: &str, type_name: &str) -> Self {
        self.with_column_info(table, ColumnInfo::from_type_name(column, type_name))
    }

    pub fn with_column_info(mut self, table: &str, info: ColumnInfo) -> Self {
        self.columns.insert(
            (table.to_lowercase(), info.column_name.to_lowercase()),
            info,
        );
        self
    }

    pub fn on_query(mut self, pattern: &str, batch: RecordBatch) -> Self {
        self.rules.push((
            pattern.to_string(),
            Response::Batches(batch.schema(), vec![batch]),
        ));
        self
    }

    pub fn on_query_fail(mut self, pattern: &str, message: &str) -> Self {
        self.rules
            .push((pattern.to_string(), Response::Fail(message.to_string())));
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn execute_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<String> {
        self.executed.lock().unwrap().last().cloned()
    }
}

impl Backend for ScriptedBackend {
    fn column_info(
        &self,
        table: &str,
        column: &str,
    ) -> generic_datastore::Result<Option<ColumnInfo>> {
        Ok(self
            .columns
            .get(&(table.to_lowercase(), column.to_lowercase()))
            .cloned())
    }

    fn execute(&self, sql: &str) -> generic_datastore::Result<ResultReader> {
        self.executed.lock().unwrap().push(sql.to_string());
        let response = self
            .rules
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, response)| response.clone());
        match response {
            Some(Response::Batches(schema, batches)) => Ok(Box::new(RecordBatchIterator::new(
                batches.into_iter().map(Ok),
                schema,
            ))),
            Some(Response::Fail(message)) => {
                Err(DatastoreErrorHelper::query_execution().message(message))
            }
            None => Err(DatastoreErrorHelper::query_execution()
                .message(format!("No scripted response for: {}", sql))),
        }
    }

    fn engine_family(&self) -> EngineFamily {
        self.engine.clone()
    }
}

/// Configuration for the `ts_meta` / `ts_data` schema used by the tests.
pub fn hydro_properties() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Name", "HydroDB"),
        ("Logging.Level", "off"),
        ("MetadataTable", "ts_meta"),
        ("MetadataTable.IdColumn", "meta_id"),
        ("MetadataTable.LocationTypeColumn", "loc_type"),
        ("MetadataTable.LocationIdColumn", "loc_id"),
        ("MetadataTable.DataSourceColumn", "source"),
        ("MetadataTable.DataTypeColumn", "data_type"),
        ("MetadataTable.DataIntervalColumn", "interval"),
        ("MetadataTable.ScenarioColumn", "scenario"),
        ("MetadataTable.DescriptionColumn", "description"),
        ("MetadataTable.UnitsColumn", "units"),
        ("DataTable", "ts_data"),
        ("DataTable.MetadataIdColumn", "meta_id"),
        ("DataTable.DateTimeColumn", "date_time"),
        ("DataTable.ValueColumn", "val"),
        ("DataTable.FlagColumn", "flag"),
    ]
}

pub fn hydro_config() -> DatastoreConfig {
    DatastoreConfig::from_properties(hydro_properties())
}

/// Config with some properties replaced or added.
pub fn hydro_config_with(overrides: &[(&'static str, &'static str)]) -> DatastoreConfig {
    let mut properties = hydro_properties();
    for (name, value) in overrides {
        properties.retain(|(n, _)| n != name);
        properties.push((*name, *value));
    }
    DatastoreConfig::from_properties(properties)
}

/// Backend with every configured `ts_meta` / `ts_data` column registered.
pub fn hydro_backend(date_time_type: &str) -> ScriptedBackend {
    let mut backend = ScriptedBackend::new().with_column("ts_meta", "meta_id", "BIGINT");
    for column in [
        "loc_type",
        "loc_id",
        "source",
        "data_type",
        "interval",
        "scenario",
        "description",
        "units",
    ] {
        backend = backend.with_column("ts_meta", column, "VARCHAR(64)");
    }
    backend
        .with_column("ts_data", "meta_id", "BIGINT")
        .with_column("ts_data", "date_time", date_time_type)
        .with_column("ts_data", "val", "DOUBLE")
        .with_column("ts_data", "flag", "VARCHAR(4)")
}

pub fn string_batch(name: &str, values: &[Option<&str>]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Utf8, true)]));
    RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values.to_vec()))]).unwrap()
}

/// One metadata row: id, then location type, location id, source, data
/// type, interval, scenario, description, units.
pub type MetaRow<'a> = (i64, [&'a str; 8]);

pub fn meta_batch(rows: &[MetaRow<'_>]) -> RecordBatch {
    let names = [
        "loc_type",
        "loc_id",
        "source",
        "data_type",
        "interval",
        "scenario",
        "description",
        "units",
    ];
    let mut fields = vec![Field::new("meta_id", DataType::Int64, false)];
    fields.extend(names.iter().map(|n| Field::new(*n, DataType::Utf8, true)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<arrow_array::ArrayRef> = vec![Arc::new(Int64Array::from(
        rows.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
    ))];
    for i in 0..names.len() {
        columns.push(Arc::new(StringArray::from(
            rows.iter().map(|(_, parts)| parts[i]).collect::<Vec<_>>(),
        )));
    }
    RecordBatch::try_new(schema, columns).unwrap()
}

pub fn flow_meta_row(id: i64) -> MetaRow<'static> {
    (
        id,
        [
            "Gage",
            "08236000",
            "USGS",
            "Streamflow",
            "Day",
            "",
            "Alamosa River",
            "CFS",
        ],
    )
}

/// Data rows with a timestamp date/time column: `(YYYY-MM-DD, value, flag)`.
pub fn timestamp_data_batch(rows: &[(&str, Option<f64>, Option<&str>)]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("date_time", DataType::Timestamp(TimeUnit::Second, None), false),
        Field::new("val", DataType::Float64, true),
        Field::new("flag", DataType::Utf8, true),
    ]));
    let seconds: Vec<i64> = rows
        .iter()
        .map(|(date, _, _)| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
                .timestamp()
        })
        .collect();
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(TimestampSecondArray::from(seconds)),
            Arc::new(Float64Array::from(
                rows.iter().map(|(_, v, _)| *v).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|(_, _, f)| *f).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap()
}

/// Data rows with an integer year column: `(year, value, flag)`.
pub fn year_data_batch(rows: &[(i64, Option<f64>, Option<&str>)]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("date_time", DataType::Int64, false),
        Field::new("val", DataType::Float64, true),
        Field::new("flag", DataType::Utf8, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(
                rows.iter().map(|(y, _, _)| *y).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|(_, v, _)| *v).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|(_, _, f)| *f).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap()
}
