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

//! [`Backend`] implementation over an ADBC connection.

use crate::backend::{Backend, ColumnInfo, EngineFamily, ResultReader};
use crate::error::Result;
use crate::metadata::type_mapping::arrow_type_to_column_info;
use adbc_core::error::Status;
use adbc_core::{Connection, Statement};
use arrow_array::{RecordBatch, RecordBatchIterator, RecordBatchReader};
use arrow_schema::ArrowError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Backend over any ADBC connection.
///
/// ADBC connections are `&mut` for statement creation, so the connection is
/// held behind a mutex and queries on one backend run one at a time.
pub struct AdbcBackend<C> {
    connection: Mutex<C>,
    engine: EngineFamily,
}

impl<C> AdbcBackend<C>
where
    C: Connection + Send,
{
    /// Wrap an open ADBC connection.
    pub fn new(connection: C, engine: EngineFamily) -> Self {
        Self {
            connection: Mutex::new(connection),
            engine,
        }
    }

    /// Give the connection back, e.g. to close it.
    pub fn into_inner(self) -> C {
        self.connection
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, C> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Split `schema.table` into its parts.
fn split_qualified(table: &str) -> (Option<&str>, &str) {
    match table.rsplit_once('.') {
        Some((schema, name)) => (Some(schema), name),
        None => (None, table),
    }
}

impl<C> Backend for AdbcBackend<C>
where
    C: Connection + Send,
{
    fn column_info(&self, table: &str, column: &str) -> Result<Option<ColumnInfo>> {
        let (db_schema, table_name) = split_qualified(table);
        let connection = self.lock();
        let schema = match connection.get_table_schema(None, db_schema, table_name) {
            Ok(schema) => schema,
            Err(e) if e.status == Status::NotFound => {
                debug!("Table {} not found: {}", table, e.message);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let info = schema
            .fields()
            .iter()
            .find(|field| field.name().eq_ignore_ascii_case(column))
            .map(|field| {
                let (type_code, column_size, decimal_digits) =
                    arrow_type_to_column_info(field.data_type());
                ColumnInfo {
                    column_name: field.name().clone(),
                    type_code,
                    type_name: field.data_type().to_string(),
                    column_size,
                    decimal_digits,
                }
            });
        Ok(info)
    }

    fn execute(&self, sql: &str) -> Result<ResultReader> {
        let mut connection = self.lock();
        let mut statement = connection.new_statement()?;
        statement.set_sql_query(sql)?;
        let reader = statement.execute()?;
        let schema = reader.schema();
        // The reader borrows the statement; buffer batches (and any
        // mid-stream error) so the cursor can outlive this call.
        let batches: Vec<std::result::Result<RecordBatch, ArrowError>> = reader.collect();
        debug!("ADBC query returned {} batches", batches.len());
        Ok(Box::new(RecordBatchIterator::new(batches, schema)))
    }

    fn engine_family(&self) -> EngineFamily {
        self.engine.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::metadata::type_mapping::sql_types;
    use adbc_core::error::{Error as AdbcError, Result as AdbcResult};
    use adbc_core::options::{
        InfoCode, ObjectDepth, OptionConnection, OptionStatement, OptionValue,
    };
    use adbc_core::{Optionable, PartitionedResult};
    use arrow_array::{Float64Array, Int64Array};
    use arrow_schema::{DataType, Field, Schema, SchemaRef};
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    type BatchIter =
        RecordBatchIterator<std::vec::IntoIter<std::result::Result<RecordBatch, ArrowError>>>;

    fn unsupported(what: &str) -> AdbcError {
        AdbcError::with_message_and_status(what, Status::NotImplemented)
    }

    /// Query results a stub statement replays.
    #[derive(Clone)]
    struct Script {
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
        fail_after_batches: bool,
    }

    impl Script {
        fn reader(&self) -> BatchIter {
            let mut items: Vec<std::result::Result<RecordBatch, ArrowError>> =
                self.batches.iter().cloned().map(Ok).collect();
            if self.fail_after_batches {
                items.push(Err(ArrowError::IpcError("stream reset".to_string())));
            }
            RecordBatchIterator::new(items.into_iter(), self.schema.clone())
        }
    }

    struct StubConnection {
        tables: HashMap<String, Schema>,
        script: Script,
        queries: Arc<Mutex<Vec<String>>>,
    }

    struct StubStatement {
        script: Script,
        queries: Arc<Mutex<Vec<String>>>,
        sql: Option<String>,
    }

    impl Optionable for StubConnection {
        type Option = OptionConnection;

        fn set_option(&mut self, _key: Self::Option, _value: OptionValue) -> AdbcResult<()> {
            Err(unsupported("set_option"))
        }

        fn get_option_string(&self, _key: Self::Option) -> AdbcResult<String> {
            Err(unsupported("get_option_string"))
        }

        fn get_option_bytes(&self, _key: Self::Option) -> AdbcResult<Vec<u8>> {
            Err(unsupported("get_option_bytes"))
        }

        fn get_option_int(&self, _key: Self::Option) -> AdbcResult<i64> {
            Err(unsupported("get_option_int"))
        }

        fn get_option_double(&self, _key: Self::Option) -> AdbcResult<f64> {
            Err(unsupported("get_option_double"))
        }
    }

    impl Connection for StubConnection {
        type StatementType = StubStatement;

        fn new_statement(&mut self) -> AdbcResult<Self::StatementType> {
            Ok(StubStatement {
                script: self.script.clone(),
                queries: self.queries.clone(),
                sql: None,
            })
        }

        fn cancel(&mut self) -> AdbcResult<()> {
            Ok(())
        }

        fn get_info(
            &self,
            _codes: Option<HashSet<InfoCode>>,
        ) -> AdbcResult<impl RecordBatchReader + Send> {
            Err::<BatchIter, _>(unsupported("get_info"))
        }

        fn get_objects(
            &self,
            _depth: ObjectDepth,
            _catalog: Option<&str>,
            _db_schema: Option<&str>,
            _table_name: Option<&str>,
            _table_type: Option<Vec<&str>>,
            _column_name: Option<&str>,
        ) -> AdbcResult<impl RecordBatchReader + Send> {
            Err::<BatchIter, _>(unsupported("get_objects"))
        }

        fn get_table_schema(
            &self,
            _catalog: Option<&str>,
            _db_schema: Option<&str>,
            table_name: &str,
        ) -> AdbcResult<Schema> {
            if table_name == "locked_table" {
                return Err(AdbcError::with_message_and_status(
                    "Permission denied",
                    Status::Unauthorized,
                ));
            }
            self.tables.get(table_name).cloned().ok_or_else(|| {
                AdbcError::with_message_and_status(
                    format!("Table not found: {}", table_name),
                    Status::NotFound,
                )
            })
        }

        fn get_table_types(&self) -> AdbcResult<impl RecordBatchReader + Send> {
            Err::<BatchIter, _>(unsupported("get_table_types"))
        }

        fn read_partition(
            &self,
            _partition: impl AsRef<[u8]>,
        ) -> AdbcResult<impl RecordBatchReader + Send> {
            Err::<BatchIter, _>(unsupported("read_partition"))
        }

        fn commit(&mut self) -> AdbcResult<()> {
            Ok(())
        }

        fn rollback(&mut self) -> AdbcResult<()> {
            Err(unsupported("rollback"))
        }

        fn get_statistic_names(&self) -> AdbcResult<impl RecordBatchReader + Send> {
            Err::<BatchIter, _>(unsupported("get_statistic_names"))
        }

        fn get_statistics(
            &self,
            _catalog: Option<&str>,
            _db_schema: Option<&str>,
            _table_name: Option<&str>,
            _approximate: bool,
        ) -> AdbcResult<impl RecordBatchReader + Send> {
            Err::<BatchIter, _>(unsupported("get_statistics"))
        }
    }

    impl Optionable for StubStatement {
        type Option = OptionStatement;

        fn set_option(&mut self, _key: Self::Option, _value: OptionValue) -> AdbcResult<()> {
            Err(unsupported("set_option"))
        }

        fn get_option_string(&self, _key: Self::Option) -> AdbcResult<String> {
            Err(unsupported("get_option_string"))
        }

        fn get_option_bytes(&self, _key: Self::Option) -> AdbcResult<Vec<u8>> {
            Err(unsupported("get_option_bytes"))
        }

        fn get_option_int(&self, _key: Self::Option) -> AdbcResult<i64> {
            Err(unsupported("get_option_int"))
        }

        fn get_option_double(&self, _key: Self::Option) -> AdbcResult<f64> {
            Err(unsupported("get_option_double"))
        }
    }

    impl Statement for StubStatement {
        fn set_sql_query(&mut self, query: impl AsRef<str>) -> AdbcResult<()> {
            self.sql = Some(query.as_ref().to_string());
            Ok(())
        }

        fn set_substrait_plan(&mut self, _plan: impl AsRef<[u8]>) -> AdbcResult<()> {
            Err(unsupported("set_substrait_plan"))
        }

        fn prepare(&mut self) -> AdbcResult<()> {
            Err(unsupported("prepare"))
        }

        fn get_parameter_schema(&self) -> AdbcResult<Schema> {
            Err(unsupported("get_parameter_schema"))
        }

        fn bind(&mut self, _batch: RecordBatch) -> AdbcResult<()> {
            Err(unsupported("bind"))
        }

        fn bind_stream(
            &mut self,
            _stream: Box<dyn RecordBatchReader + Send>,
        ) -> AdbcResult<()> {
            Err(unsupported("bind_stream"))
        }

        fn execute(&mut self) -> AdbcResult<impl RecordBatchReader + Send> {
            let sql = self.sql.clone().ok_or_else(|| {
                AdbcError::with_message_and_status("No query set", Status::InvalidState)
            })?;
            self.queries.lock().unwrap().push(sql);
            Ok(self.script.reader())
        }

        fn execute_update(&mut self) -> AdbcResult<Option<i64>> {
            Err(unsupported("execute_update"))
        }

        fn execute_schema(&mut self) -> AdbcResult<Schema> {
            Ok((*self.script.schema).clone())
        }

        fn execute_partitions(&mut self) -> AdbcResult<PartitionedResult> {
            Err(unsupported("execute_partitions"))
        }

        fn cancel(&mut self) -> AdbcResult<()> {
            Ok(())
        }
    }

    fn data_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int64, false),
            Field::new("val", DataType::Float64, true),
        ]))
    }

    fn data_batch(years: Vec<i64>, values: Vec<f64>) -> RecordBatch {
        RecordBatch::try_new(
            data_schema(),
            vec![
                Arc::new(Int64Array::from(years)),
                Arc::new(Float64Array::from(values)),
            ],
        )
        .unwrap()
    }

    fn backend(script: Script) -> (AdbcBackend<StubConnection>, Arc<Mutex<Vec<String>>>) {
        let queries = Arc::new(Mutex::new(Vec::new()));
        let mut tables = HashMap::new();
        tables.insert("ts_data".to_string(), (*data_schema()).clone());
        let connection = StubConnection {
            tables,
            script,
            queries: queries.clone(),
        };
        (AdbcBackend::new(connection, EngineFamily::SqlServer), queries)
    }

    fn empty_script() -> Script {
        Script {
            schema: data_schema(),
            batches: Vec::new(),
            fail_after_batches: false,
        }
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(split_qualified("dbo.ts_meta"), (Some("dbo"), "ts_meta"));
        assert_eq!(split_qualified("ts_meta"), (None, "ts_meta"));
        assert_eq!(split_qualified("db.dbo.t"), (Some("db.dbo"), "t"));
    }

    #[test]
    fn test_column_info() {
        let (backend, _) = backend(empty_script());

        let info = backend.column_info("dbo.ts_data", "VAL").unwrap().unwrap();
        assert_eq!(info.column_name, "val");
        assert_eq!(info.type_code, sql_types::DOUBLE);
        assert_eq!(info.column_size, Some(15));

        assert_eq!(
            backend.column_type("ts_data", "year").unwrap(),
            Some(sql_types::BIGINT)
        );
        assert!(backend.column_info("ts_data", "flag").unwrap().is_none());
        assert!(backend.column_info("missing_table", "val").unwrap().is_none());
    }

    #[test]
    fn test_execute_buffers_batches() {
        let (backend, queries) = backend(Script {
            schema: data_schema(),
            batches: vec![
                data_batch(vec![2000, 2001], vec![1.0, 2.0]),
                data_batch(vec![2002], vec![3.0]),
            ],
            fail_after_batches: false,
        });

        let reader = backend.execute("SELECT year, val FROM ts_data").unwrap();
        assert_eq!(reader.schema(), data_schema());
        let rows: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
        assert_eq!(rows, 3);
        assert_eq!(
            *queries.lock().unwrap(),
            vec!["SELECT year, val FROM ts_data".to_string()]
        );
        assert_eq!(backend.engine_family(), EngineFamily::SqlServer);
    }

    #[test]
    fn test_execute_keeps_mid_stream_error() {
        let (backend, _) = backend(Script {
            schema: data_schema(),
            batches: vec![data_batch(vec![2000], vec![1.0])],
            fail_after_batches: true,
        });

        let mut reader = backend.execute("SELECT year, val FROM ts_data").unwrap();
        assert_eq!(reader.next().unwrap().unwrap().num_rows(), 1);
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("stream reset"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_column_info_error_propagates() {
        let (backend, _) = backend(empty_script());
        let err = backend.column_info("locked_table", "val").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryExecution);
        assert!(err.to_string().contains("Permission denied"));
    }
}
