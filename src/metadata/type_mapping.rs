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

//! Backend column type → internal type mapping.
//!
//! Maps JDBC/XDBC type codes to the datastore's [`InternalType`], sanitizes
//! reported column widths, and applies per-engine precision corrections
//! to floating-point columns.

use crate::backend::{ColumnInfo, EngineFamily};
use arrow_schema::DataType;
use std::fmt;
use tracing::warn;

/// JDBC/XDBC type codes.
pub mod sql_types {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const SMALLINT: i32 = 5;
    pub const INTEGER: i32 = 4;
    pub const BIGINT: i32 = -5;
    pub const FLOAT: i32 = 6;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const CHAR: i32 = 1;
    pub const VARCHAR: i32 = 12;
    pub const LONGVARCHAR: i32 = -1;
    pub const NCHAR: i32 = -15;
    pub const NVARCHAR: i32 = -9;
    pub const LONGNVARCHAR: i32 = -16;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const TIMESTAMP_WITH_TIMEZONE: i32 = 2014;
    pub const BINARY: i32 = -2;
    pub const VARBINARY: i32 = -3;
    pub const NULL: i32 = 0;
    pub const OTHER: i32 = 1111;
    pub const JAVA_OBJECT: i32 = 2000;
    pub const STRUCT: i32 = 2002;
    pub const ARRAY: i32 = 2003;
    pub const CLOB: i32 = 2005;
    pub const NCLOB: i32 = 2011;
    pub const BOOLEAN: i32 = 16;
}

/// Widths above this are treated as unbounded.
pub const MAX_COLUMN_WIDTH: i32 = 100_000;

/// Width (or precision) meaning "no limit".
pub const UNBOUNDED: i32 = -1;

/// Decimal digits forced onto floating-point columns whose engine misreports them.
pub const DEFAULT_FLOAT_PRECISION: i32 = 6;

/// Scale reported by Oracle for an unconstrained `NUMBER` column.
pub const ORACLE_UNCONSTRAINED_SCALE: i32 = -127;

/// Internal column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalType {
    Array,
    Long,
    Int,
    Boolean,
    String,
    Date,
    Double,
    Float,
}

impl InternalType {
    pub fn is_floating_point(&self) -> bool {
        matches!(self, InternalType::Double | InternalType::Float)
    }
}

impl fmt::Display for InternalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InternalType::Array => "ARRAY",
            InternalType::Long => "LONG",
            InternalType::Int => "INT",
            InternalType::Boolean => "BOOLEAN",
            InternalType::String => "STRING",
            InternalType::Date => "DATE",
            InternalType::Double => "DOUBLE",
            InternalType::Float => "FLOAT",
        };
        f.write_str(name)
    }
}

/// Map a backend type code to the internal type.
///
/// Unknown codes map to [`InternalType::String`] with a warning.
pub fn sql_to_internal_type(type_code: i32) -> InternalType {
    use sql_types::*;

    match type_code {
        ARRAY => InternalType::Array,
        BIGINT => InternalType::Long,
        TINYINT | SMALLINT | INTEGER => InternalType::Int,
        BIT | BOOLEAN => InternalType::Boolean,
        CHAR | VARCHAR | LONGVARCHAR | NCHAR | NVARCHAR | LONGNVARCHAR | CLOB | NCLOB => {
            InternalType::String
        }
        DATE | TIME | TIMESTAMP | TIMESTAMP_WITH_TIMEZONE => InternalType::Date,
        DOUBLE | FLOAT | NUMERIC | DECIMAL => InternalType::Double,
        REAL => InternalType::Float,
        other => {
            warn!(
                "Unrecognized SQL type code {}, treating column as STRING",
                other
            );
            InternalType::String
        }
    }
}

/// Coerce pathological widths to [`UNBOUNDED`].
pub fn sanitize_width(width: i32) -> i32 {
    if width > MAX_COLUMN_WIDTH {
        UNBOUNDED
    } else {
        width
    }
}

/// Engine-specific correction of reported width/precision.
///
/// Implementations only touch floating-point columns.
pub trait PrecisionCorrector: Send + Sync + fmt::Debug {
    /// Returns the corrected `(width, precision)`.
    fn correct(&self, internal_type: InternalType, width: i32, precision: i32) -> (i32, i32);
}

/// Engines that report widths faithfully.
#[derive(Debug, Default)]
pub struct NoCorrection;

impl PrecisionCorrector for NoCorrection {
    fn correct(&self, _internal_type: InternalType, width: i32, precision: i32) -> (i32, i32) {
        (width, precision)
    }
}

/// SQL Server reports zero decimal digits for floating-point columns.
#[derive(Debug, Default)]
pub struct SqlServerCorrector;

impl PrecisionCorrector for SqlServerCorrector {
    fn correct(&self, internal_type: InternalType, width: i32, precision: i32) -> (i32, i32) {
        if internal_type.is_floating_point() && precision == 0 {
            (width, DEFAULT_FLOAT_PRECISION)
        } else {
            (width, precision)
        }
    }
}

/// Oracle reports scale -127 for `NUMBER` columns declared without limits.
#[derive(Debug, Default)]
pub struct OracleCorrector;

impl PrecisionCorrector for OracleCorrector {
    fn correct(&self, internal_type: InternalType, width: i32, precision: i32) -> (i32, i32) {
        if internal_type.is_floating_point() && precision == ORACLE_UNCONSTRAINED_SCALE {
            (UNBOUNDED, DEFAULT_FLOAT_PRECISION)
        } else {
            (width, precision)
        }
    }
}

/// Select the corrector for an engine family.
pub fn corrector_for(engine: &EngineFamily) -> Box<dyn PrecisionCorrector> {
    match engine {
        EngineFamily::SqlServer => Box::new(SqlServerCorrector),
        EngineFamily::Oracle => Box::new(OracleCorrector),
        EngineFamily::Other(_) | EngineFamily::Unknown => Box::new(NoCorrection),
    }
}

/// A column described in internal terms, ready for table display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnField {
    pub name: String,
    pub internal_type: InternalType,
    /// Display width, [`UNBOUNDED`] if unknown or unlimited.
    pub width: i32,
    /// Decimal digits for floating-point columns, otherwise as reported.
    pub precision: i32,
}

/// Describe a backend column using the given corrector.
pub fn describe_column(info: &ColumnInfo, corrector: &dyn PrecisionCorrector) -> ColumnField {
    let internal_type = sql_to_internal_type(info.type_code);
    let width = sanitize_width(info.column_size.unwrap_or(UNBOUNDED));
    let precision = info.decimal_digits.unwrap_or(0);
    let (width, precision) = corrector.correct(internal_type, width, precision);
    ColumnField {
        name: info.column_name.clone(),
        internal_type,
        width: sanitize_width(width),
        precision,
    }
}

/// Map a SQL type name to a JDBC/XDBC type code.
pub fn sql_type_name_to_code(type_name: &str) -> i32 {
    use sql_types::*;

    let type_upper = type_name.to_uppercase();
    let base_type = type_upper.split('(').next().unwrap_or(&type_upper).trim();

    match base_type {
        "BOOLEAN" | "BOOL" => BOOLEAN,
        "BIT" => BIT,
        "TINYINT" | "BYTE" => TINYINT,
        "SMALLINT" | "SHORT" | "INT2" => SMALLINT,
        "INT" | "INTEGER" | "INT4" => INTEGER,
        "BIGINT" | "LONG" | "INT8" => BIGINT,
        "FLOAT" | "FLOAT8" => FLOAT,
        "REAL" | "FLOAT4" => REAL,
        "DOUBLE" | "DOUBLE PRECISION" => DOUBLE,
        "DECIMAL" | "DEC" | "MONEY" => DECIMAL,
        "NUMERIC" | "NUMBER" => NUMERIC,
        "CHAR" | "CHARACTER" => CHAR,
        "NCHAR" => NCHAR,
        "VARCHAR" | "VARCHAR2" | "CHARACTER VARYING" | "STRING" => VARCHAR,
        "NVARCHAR" | "NVARCHAR2" => NVARCHAR,
        "TEXT" | "LONGVARCHAR" => LONGVARCHAR,
        "NTEXT" => LONGNVARCHAR,
        "CLOB" => CLOB,
        "NCLOB" => NCLOB,
        "DATE" => DATE,
        "TIME" => TIME,
        "TIMESTAMP" | "TIMESTAMP_NTZ" | "DATETIME" | "DATETIME2" | "SMALLDATETIME" => TIMESTAMP,
        "TIMESTAMP_LTZ" | "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" | "DATETIMEOFFSET" => {
            TIMESTAMP_WITH_TIMEZONE
        }
        "BINARY" => BINARY,
        "VARBINARY" | "BLOB" | "BYTEA" => VARBINARY,
        "ARRAY" => ARRAY,
        "MAP" => JAVA_OBJECT,
        "STRUCT" => STRUCT,
        "NULL" | "VOID" => NULL,
        _ => VARCHAR,
    }
}

/// Parse precision and scale from a `DECIMAL(p,s)` type string.
/// Defaults to `(38, 0)` for missing parts.
pub(crate) fn parse_decimal_params(type_name: &str) -> (i32, i32) {
    let default_precision = 38;
    let default_scale = 0;

    let Some(start) = type_name.find('(') else {
        return (default_precision, default_scale);
    };
    let Some(end) = type_name.find(')') else {
        return (default_precision, default_scale);
    };

    let params = &type_name[start + 1..end];
    let parts: Vec<&str> = params.split(',').map(|s| s.trim()).collect();

    let precision = parts
        .first()
        .and_then(|p| p.parse::<i32>().ok())
        .unwrap_or(default_precision);
    let scale = parts
        .get(1)
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(default_scale);

    (precision, scale)
}

/// Map an Arrow data type to `(type code, column size, decimal digits)`.
pub fn arrow_type_to_column_info(data_type: &DataType) -> (i32, Option<i32>, Option<i32>) {
    use sql_types::*;

    match data_type {
        DataType::Boolean => (BOOLEAN, Some(1), None),
        DataType::Int8 | DataType::UInt8 => (TINYINT, Some(3), Some(0)),
        DataType::Int16 | DataType::UInt16 => (SMALLINT, Some(5), Some(0)),
        DataType::Int32 | DataType::UInt32 => (INTEGER, Some(10), Some(0)),
        DataType::Int64 | DataType::UInt64 => (BIGINT, Some(19), Some(0)),
        DataType::Float16 | DataType::Float32 => (REAL, Some(7), None),
        DataType::Float64 => (DOUBLE, Some(15), None),
        DataType::Decimal128(p, s) | DataType::Decimal256(p, s) => {
            (DECIMAL, Some(i32::from(*p)), Some(i32::from(*s)))
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => (VARCHAR, None, None),
        DataType::Binary
        | DataType::LargeBinary
        | DataType::BinaryView
        | DataType::FixedSizeBinary(_) => (VARBINARY, None, None),
        DataType::Date32 | DataType::Date64 => (DATE, None, None),
        DataType::Timestamp(_, None) => (TIMESTAMP, None, None),
        DataType::Timestamp(_, Some(_)) => (TIMESTAMP_WITH_TIMEZONE, None, None),
        DataType::Time32(_) | DataType::Time64(_) => (TIME, None, None),
        DataType::List(_) | DataType::LargeList(_) | DataType::FixedSizeList(_, _) => {
            (ARRAY, None, None)
        }
        DataType::Struct(_) => (STRUCT, None, None),
        DataType::Null => (NULL, None, None),
        _ => (OTHER, None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::TimeUnit;

    #[test]
    fn test_sql_to_internal_type_fixed_table() {
        assert_eq!(sql_to_internal_type(sql_types::DATE), InternalType::Date);
        assert_eq!(sql_to_internal_type(sql_types::TIMESTAMP), InternalType::Date);
        assert_eq!(sql_to_internal_type(sql_types::INTEGER), InternalType::Int);
        assert_eq!(sql_to_internal_type(sql_types::SMALLINT), InternalType::Int);
        assert_eq!(sql_to_internal_type(sql_types::BIGINT), InternalType::Long);
        assert_eq!(sql_to_internal_type(sql_types::DOUBLE), InternalType::Double);
        assert_eq!(sql_to_internal_type(sql_types::DECIMAL), InternalType::Double);
        assert_eq!(sql_to_internal_type(sql_types::REAL), InternalType::Float);
        assert_eq!(sql_to_internal_type(sql_types::VARCHAR), InternalType::String);
        assert_eq!(sql_to_internal_type(sql_types::BIT), InternalType::Boolean);
        assert_eq!(sql_to_internal_type(sql_types::ARRAY), InternalType::Array);
    }

    #[test]
    fn test_sql_to_internal_type_unknown_is_string() {
        assert_eq!(sql_to_internal_type(sql_types::OTHER), InternalType::String);
        assert_eq!(sql_to_internal_type(-12345), InternalType::String);
    }

    #[test]
    fn test_sanitize_width() {
        assert_eq!(sanitize_width(500_000), UNBOUNDED);
        assert_eq!(sanitize_width(100_001), UNBOUNDED);
        assert_eq!(sanitize_width(100_000), 100_000);
        assert_eq!(sanitize_width(50), 50);
        assert_eq!(sanitize_width(UNBOUNDED), UNBOUNDED);
    }

    #[test]
    fn test_sql_server_corrector() {
        let corrector = SqlServerCorrector;
        assert_eq!(corrector.correct(InternalType::Double, 15, 0), (15, 6));
        assert_eq!(corrector.correct(InternalType::Float, 7, 0), (7, 6));
        assert_eq!(corrector.correct(InternalType::Double, 15, 3), (15, 3));
        assert_eq!(corrector.correct(InternalType::Int, 10, 0), (10, 0));
    }

    #[test]
    fn test_oracle_corrector() {
        let corrector = OracleCorrector;
        assert_eq!(corrector.correct(InternalType::Double, 0, -127), (UNBOUNDED, 6));
        assert_eq!(corrector.correct(InternalType::Double, 10, 2), (10, 2));
        assert_eq!(corrector.correct(InternalType::Double, 10, 0), (10, 0));
        assert_eq!(corrector.correct(InternalType::String, 0, -127), (0, -127));
    }

    #[test]
    fn test_corrector_selection() {
        let sql_server = corrector_for(&EngineFamily::SqlServer);
        assert_eq!(sql_server.correct(InternalType::Double, 15, 0), (15, 6));
        let oracle = corrector_for(&EngineFamily::Oracle);
        assert_eq!(oracle.correct(InternalType::Double, 15, 0), (15, 0));
        let other = corrector_for(&EngineFamily::Other("PostgreSQL".into()));
        assert_eq!(other.correct(InternalType::Double, 15, 0), (15, 0));
    }

    #[test]
    fn test_describe_column_sanitizes_and_corrects() {
        let info = ColumnInfo {
            column_name: "notes".to_string(),
            type_code: sql_types::LONGVARCHAR,
            type_name: "TEXT".to_string(),
            column_size: Some(2_147_483_647),
            decimal_digits: None,
        };
        let field = describe_column(&info, &NoCorrection);
        assert_eq!(field.internal_type, InternalType::String);
        assert_eq!(field.width, UNBOUNDED);

        let info = ColumnInfo {
            column_name: "value".to_string(),
            type_code: sql_types::NUMERIC,
            type_name: "NUMBER".to_string(),
            column_size: Some(0),
            decimal_digits: Some(-127),
        };
        let field = describe_column(&info, &OracleCorrector);
        assert_eq!(field.internal_type, InternalType::Double);
        assert_eq!(field.width, UNBOUNDED);
        assert_eq!(field.precision, 6);
    }

    #[test]
    fn test_sql_type_name_to_code() {
        assert_eq!(sql_type_name_to_code("INTEGER"), sql_types::INTEGER);
        assert_eq!(sql_type_name_to_code("bigint"), sql_types::BIGINT);
        assert_eq!(sql_type_name_to_code("DECIMAL(10,2)"), sql_types::DECIMAL);
        assert_eq!(sql_type_name_to_code("VARCHAR(255)"), sql_types::VARCHAR);
        assert_eq!(sql_type_name_to_code("datetime2"), sql_types::TIMESTAMP);
        assert_eq!(sql_type_name_to_code("NUMBER"), sql_types::NUMERIC);
        assert_eq!(sql_type_name_to_code("geometry"), sql_types::VARCHAR);
    }

    #[test]
    fn test_parse_decimal_params() {
        assert_eq!(parse_decimal_params("DECIMAL(10,2)"), (10, 2));
        assert_eq!(parse_decimal_params("NUMERIC(38, 0)"), (38, 0));
        assert_eq!(parse_decimal_params("DECIMAL(12)"), (12, 0));
        assert_eq!(parse_decimal_params("DECIMAL"), (38, 0));
    }

    #[test]
    fn test_arrow_type_to_column_info() {
        assert_eq!(
            arrow_type_to_column_info(&DataType::Int32),
            (sql_types::INTEGER, Some(10), Some(0))
        );
        assert_eq!(
            arrow_type_to_column_info(&DataType::Decimal128(12, 3)),
            (sql_types::DECIMAL, Some(12), Some(3))
        );
        assert_eq!(
            arrow_type_to_column_info(&DataType::Timestamp(TimeUnit::Microsecond, None)).0,
            sql_types::TIMESTAMP
        );
        assert_eq!(
            arrow_type_to_column_info(&DataType::Timestamp(
                TimeUnit::Second,
                Some("UTC".into())
            ))
            .0,
            sql_types::TIMESTAMP_WITH_TIMEZONE
        );
        assert_eq!(arrow_type_to_column_info(&DataType::Date32).0, sql_types::DATE);
        assert_eq!(arrow_type_to_column_info(&DataType::Utf8).0, sql_types::VARCHAR);
    }
}
