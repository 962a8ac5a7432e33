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

//! Date/time values with an explicit precision.
//!
//! A bare-year value (`2020`) and a daily value (`2020-01-01`) are both
//! stored as a [`NaiveDateTime`]; the precision controls truncation,
//! formatting and how bounds are rendered into SQL.

use crate::error::{DatastoreErrorHelper, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;

/// Smallest date/time unit carried by a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// A date/time truncated to its precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TsDateTime {
    value: NaiveDateTime,
    precision: DatePrecision,
}

impl TsDateTime {
    /// Create a value, truncating `value` to `precision`.
    pub fn new(value: NaiveDateTime, precision: DatePrecision) -> Self {
        Self {
            value: truncate(value, precision),
            precision,
        }
    }

    /// A bare-year value, `None` if the year is out of range.
    pub fn from_year(year: i32) -> Option<Self> {
        let value = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
        Some(Self {
            value,
            precision: DatePrecision::Year,
        })
    }

    /// A day-precision value, `None` for an invalid date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        let value = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        Some(Self {
            value,
            precision: DatePrecision::Day,
        })
    }

    /// Parse `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYY-MM-DD HH`,
    /// `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS` (a `T` separator is accepted).
    /// The precision follows the number of parts given.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || {
            DatastoreErrorHelper::invalid_argument()
                .message(format!("Invalid date/time '{}'", text))
        };
        let text = text.trim();
        let (date_part, time_part) = match text.split_once(['T', ' ']) {
            Some((d, t)) => (d, Some(t.trim())),
            None => (text, None),
        };

        let date_fields: Vec<&str> = date_part.split('-').collect();
        let year: i32 = date_fields[0].parse().map_err(|_| invalid())?;
        let month: u32 = match date_fields.get(1) {
            Some(m) => m.parse().map_err(|_| invalid())?,
            None => 1,
        };
        let day: u32 = match date_fields.get(2) {
            Some(d) => d.parse().map_err(|_| invalid())?,
            None => 1,
        };
        if date_fields.len() > 3 {
            return Err(invalid());
        }

        let time_fields: Vec<&str> = time_part
            .map(|t| t.split(':').collect())
            .unwrap_or_default();
        if time_fields.len() > 3 || (time_part.is_some() && date_fields.len() != 3) {
            return Err(invalid());
        }
        let mut hms = [0u32; 3];
        for (slot, field) in hms.iter_mut().zip(&time_fields) {
            // Fractional seconds are dropped.
            let whole = field.split('.').next().unwrap_or(field);
            *slot = whole.parse().map_err(|_| invalid())?;
        }

        let precision = match (date_fields.len(), time_fields.len()) {
            (1, _) => DatePrecision::Year,
            (2, _) => DatePrecision::Month,
            (_, 0) => DatePrecision::Day,
            (_, 1) => DatePrecision::Hour,
            (_, 2) => DatePrecision::Minute,
            _ => DatePrecision::Second,
        };

        let value = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hms[0], hms[1], hms[2]))
            .ok_or_else(invalid)?;
        Ok(Self { value, precision })
    }

    /// The same instant at another precision (truncating if coarser).
    pub fn with_precision(&self, precision: DatePrecision) -> Self {
        Self::new(self.value, precision)
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    pub fn precision(&self) -> DatePrecision {
        self.precision
    }

    pub fn year(&self) -> i32 {
        self.value.year()
    }

    /// SQL literal for comparing against a timestamp column.
    pub fn to_sql_literal(&self) -> String {
        format!("'{}'", self.value.format("%Y-%m-%d %H:%M:%S"))
    }
}

impl fmt::Display for TsDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.precision {
            DatePrecision::Year => "%Y",
            DatePrecision::Month => "%Y-%m",
            DatePrecision::Day => "%Y-%m-%d",
            DatePrecision::Hour => "%Y-%m-%d %H",
            DatePrecision::Minute => "%Y-%m-%d %H:%M",
            DatePrecision::Second => "%Y-%m-%d %H:%M:%S",
        };
        write!(f, "{}", self.value.format(format))
    }
}

fn truncate(value: NaiveDateTime, precision: DatePrecision) -> NaiveDateTime {
    let date = value.date();
    let (month, day) = match precision {
        DatePrecision::Year => (1, 1),
        DatePrecision::Month => (date.month(), 1),
        _ => (date.month(), date.day()),
    };
    let (hour, minute, second) = match precision {
        DatePrecision::Year | DatePrecision::Month | DatePrecision::Day => (0, 0, 0),
        DatePrecision::Hour => (value.hour(), 0, 0),
        DatePrecision::Minute => (value.hour(), value.minute(), 0),
        DatePrecision::Second => (value.hour(), value.minute(), value.second()),
    };
    NaiveDate::from_ymd_opt(date.year(), month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .unwrap_or(value)
}
