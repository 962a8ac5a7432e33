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

//! Cell extraction from Arrow result batches.
//!
//! Backends differ in how they type a column (a location id may come back
//! as `Utf8`, `LargeUtf8` or an integer), so the accessors here coerce the
//! common representations and return an extraction error for the rest.
//! A SQL NULL is always `Ok(None)`.

use crate::backend::ResultReader;
use crate::error::{DatastoreErrorHelper, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use arrow_array::{Array, RecordBatch};
use arrow_schema::DataType;
use tracing::warn;

/// Get the index of a column by name (case-insensitive), or return an error.
pub fn column_index(batch: &RecordBatch, name: &str) -> Result<usize> {
    let schema = batch.schema();
    if let Ok(index) = schema.index_of(name) {
        return Ok(index);
    }
    schema
        .fields()
        .iter()
        .position(|f| f.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            DatastoreErrorHelper::extraction()
                .message(format!("Expected column '{}' in query result", name))
        })
}

/// String form of a cell. Numeric and boolean cells are formatted.
pub fn string_value(array: &dyn Array, row: usize) -> Result<Option<String>> {
    if array.is_null(row) {
        return Ok(None);
    }
    let value = match array.data_type() {
        DataType::Utf8 => array.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => array.as_string::<i64>().value(row).to_string(),
        DataType::Utf8View => array.as_string_view().value(row).to_string(),
        DataType::Boolean => array.as_boolean().value(row).to_string(),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => match int_value(array, row)? {
            Some(v) => v.to_string(),
            None => return Ok(None),
        },
        DataType::Float32 | DataType::Float64 | DataType::Decimal128(_, _) => {
            match float_value(array, row)? {
                Some(v) => v.to_string(),
                None => return Ok(None),
            }
        }
        dt => {
            return Err(DatastoreErrorHelper::extraction()
                .message(format!("Expected string column, got {:?}", dt)))
        }
    };
    Ok(Some(value))
}

/// Integer form of a cell. Integral decimals and numeric strings are accepted.
pub fn int_value(array: &dyn Array, row: usize) -> Result<Option<i64>> {
    if array.is_null(row) {
        return Ok(None);
    }
    let value = match array.data_type() {
        DataType::Int8 => array.as_primitive::<Int8Type>().value(row) as i64,
        DataType::Int16 => array.as_primitive::<Int16Type>().value(row) as i64,
        DataType::Int32 => array.as_primitive::<Int32Type>().value(row) as i64,
        DataType::Int64 => array.as_primitive::<Int64Type>().value(row),
        DataType::UInt8 => array.as_primitive::<UInt8Type>().value(row) as i64,
        DataType::UInt16 => array.as_primitive::<UInt16Type>().value(row) as i64,
        DataType::UInt32 => array.as_primitive::<UInt32Type>().value(row) as i64,
        DataType::UInt64 => {
            let v = array.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_err(|_| {
                DatastoreErrorHelper::extraction()
                    .message(format!("Integer value {} out of range", v))
            })?
        }
        DataType::Decimal128(_, _) => match float_value(array, row)? {
            Some(v) if v.fract() == 0.0 => v as i64,
            Some(v) => {
                return Err(DatastoreErrorHelper::extraction()
                    .message(format!("Expected integer, got {}", v)))
            }
            None => return Ok(None),
        },
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = string_value(array, row)?.unwrap_or_default();
            text.trim().parse::<i64>().map_err(|_| {
                DatastoreErrorHelper::extraction()
                    .message(format!("Expected integer, got '{}'", text))
            })?
        }
        dt => {
            return Err(DatastoreErrorHelper::extraction()
                .message(format!("Expected int column, got {:?}", dt)))
        }
    };
    Ok(Some(value))
}

/// Floating-point form of a cell.
pub fn float_value(array: &dyn Array, row: usize) -> Result<Option<f64>> {
    if array.is_null(row) {
        return Ok(None);
    }
    let value = match array.data_type() {
        DataType::Float32 => array.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Float64 => array.as_primitive::<Float64Type>().value(row),
        DataType::Decimal128(_, scale) => {
            let raw = array
                .as_primitive::<arrow_array::types::Decimal128Type>()
                .value(row);
            raw as f64 / 10f64.powi(*scale as i32)
        }
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => match int_value(array, row)? {
            Some(v) => v as f64,
            None => return Ok(None),
        },
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = string_value(array, row)?.unwrap_or_default();
            text.trim().parse::<f64>().map_err(|_| {
                DatastoreErrorHelper::extraction()
                    .message(format!("Expected number, got '{}'", text))
            })?
        }
        dt => {
            return Err(DatastoreErrorHelper::extraction()
                .message(format!("Expected numeric column, got {:?}", dt)))
        }
    };
    Ok(Some(value))
}

/// Collect the non-null values of the first column, in result order.
///
/// A batch-level error stops collection and is returned; a cell that can
/// not be read as text is logged and skipped.
pub fn collect_string_column(reader: ResultReader) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for batch in reader {
        let batch = batch?;
        if batch.num_columns() == 0 {
            continue;
        }
        let array = batch.column(0);
        for row in 0..batch.num_rows() {
            match string_value(array.as_ref(), row) {
                Ok(Some(v)) => values.push(v),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable value in row {}: {}", row, e),
            }
        }
    }
    Ok(values)
}
