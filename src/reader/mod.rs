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

//! Reconstruction of time series from data query results.
//!
//! The data query selects `date/time, value[, flag]` in that order. Rows
//! are decoded positionally:
//! - the date/time column per the [`DateTimeEncoding`] of the backend column
//! - a NULL or unreadable value becomes [`MISSING`]
//! - a NULL or unreadable flag becomes an empty string
//!
//! An error from the cursor itself ends the read with the points gathered
//! so far.

use crate::backend::ResultReader;
use crate::error::{DatastoreErrorHelper, Result};
use crate::metadata::parse::{float_value, int_value, string_value};
use crate::metadata::type_mapping::sql_types;
use crate::types::datetime::{DatePrecision, TsDateTime};
use crate::types::series::{DataPoint, TimeSeries, MISSING};
use arrow_array::cast::AsArray;
use arrow_array::types::{
    Date32Type, Date64Type, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType,
};
use arrow_array::Array;
use arrow_schema::{DataType, TimeUnit};
use tracing::{debug, warn};

/// How the date/time column stores its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeEncoding {
    /// Integer column holding a year.
    BareYear,
    /// Date or timestamp column.
    FullTimestamp,
}

impl DateTimeEncoding {
    /// Classify a backend type code; anything outside the integer and
    /// date/timestamp families is an error.
    pub fn classify(type_code: i32) -> Result<Self> {
        use sql_types::*;

        match type_code {
            SMALLINT | INTEGER | BIGINT => Ok(DateTimeEncoding::BareYear),
            DATE | TIMESTAMP | TIMESTAMP_WITH_TIMEZONE => Ok(DateTimeEncoding::FullTimestamp),
            other => Err(DatastoreErrorHelper::unsupported_type().message(format!(
                "Date/time column type code {} is neither an integer year nor a date/timestamp",
                other
            ))),
        }
    }
}

/// Decode one date/time cell.
pub fn value_as_datetime(
    array: &dyn Array,
    row: usize,
    encoding: DateTimeEncoding,
    precision: DatePrecision,
) -> Result<Option<TsDateTime>> {
    if array.is_null(row) {
        return Ok(None);
    }
    if encoding == DateTimeEncoding::BareYear {
        let Some(year) = int_value(array, row)? else {
            return Ok(None);
        };
        let year = i32::try_from(year).ok().and_then(TsDateTime::from_year);
        return year.map(Some).ok_or_else(|| {
            DatastoreErrorHelper::extraction().message("Year value out of range")
        });
    }

    let value = match array.data_type() {
        DataType::Date32 => array.as_primitive::<Date32Type>().value_as_datetime(row),
        DataType::Date64 => array.as_primitive::<Date64Type>().value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Second, _) => array
            .as_primitive::<TimestampSecondType>()
            .value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Millisecond, _) => array
            .as_primitive::<TimestampMillisecondType>()
            .value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Microsecond, _) => array
            .as_primitive::<TimestampMicrosecondType>()
            .value_as_datetime(row),
        DataType::Timestamp(TimeUnit::Nanosecond, _) => array
            .as_primitive::<TimestampNanosecondType>()
            .value_as_datetime(row),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = string_value(array, row)?.unwrap_or_default();
            Some(TsDateTime::parse(&text)?.value())
        }
        dt => {
            return Err(DatastoreErrorHelper::extraction()
                .message(format!("Expected date/time column, got {:?}", dt)))
        }
    };
    value
        .map(|v| Some(TsDateTime::new(v, precision)))
        .ok_or_else(|| DatastoreErrorHelper::extraction().message("Date/time value out of range"))
}

/// Read every row of a data query into points.
pub fn read_points(
    reader: ResultReader,
    encoding: DateTimeEncoding,
    precision: DatePrecision,
    has_flag: bool,
) -> Vec<DataPoint> {
    let mut points = Vec::new();
    for batch in reader {
        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    "Error reading data rows, keeping {} points read so far: {}",
                    points.len(),
                    e
                );
                break;
            }
        };
        let min_columns = if has_flag { 3 } else { 2 };
        if batch.num_columns() < min_columns {
            warn!(
                "Data query returned {} columns, expected {}",
                batch.num_columns(),
                min_columns
            );
            break;
        }

        let dates = batch.column(0);
        let values = batch.column(1);
        let flags = has_flag.then(|| batch.column(2));

        for row in 0..batch.num_rows() {
            let date_time = match value_as_datetime(dates.as_ref(), row, encoding, precision) {
                Ok(Some(dt)) => dt,
                Ok(None) => {
                    warn!("Skipping data row with NULL date/time");
                    continue;
                }
                Err(e) => {
                    warn!("Skipping data row with unreadable date/time: {}", e);
                    continue;
                }
            };
            let value = match float_value(values.as_ref(), row) {
                Ok(Some(v)) => v,
                Ok(None) => MISSING,
                Err(e) => {
                    warn!("Unreadable value at {}, using missing: {}", date_time, e);
                    MISSING
                }
            };
            let flag = match flags.map(|f| string_value(f.as_ref(), row)) {
                None | Some(Ok(None)) => String::new(),
                Some(Ok(Some(flag))) => flag,
                Some(Err(e)) => {
                    warn!("Unreadable flag at {}, using empty: {}", date_time, e);
                    String::new()
                }
            };
            points.push(DataPoint::new(date_time, value, flag));
        }
    }
    debug!("Read {} data points", points.len());
    points
}

/// Set the envelope and points of `series`.
///
/// The envelope is the requested period truncated to `precision` where
/// given, otherwise the first and last point. Only the read points are set;
/// no regular-interval slots are synthesized.
pub fn populate_series(
    series: &mut TimeSeries,
    points: Vec<DataPoint>,
    start: Option<TsDateTime>,
    end: Option<TsDateTime>,
    precision: DatePrecision,
) {
    let date1 = start
        .map(|d| d.with_precision(precision))
        .or_else(|| points.first().map(|p| p.date_time));
    let date2 = end
        .map(|d| d.with_precision(precision))
        .or_else(|| points.last().map(|p| p.date_time));
    let (Some(date1), Some(date2)) = (date1, date2) else {
        debug!("No data and no period for {}", series.identifier());
        return;
    };

    series.set_period(date1, date2);
    if let Err(e) = series.allocate_data_space() {
        warn!("Unable to allocate data space: {}", e);
        return;
    }
    for point in points {
        if let Err(e) = series.set_data_value(point) {
            warn!("{}", e);
        }
    }
}
