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

//! Data interval of a time series (`Day`, `15Minute`, `IrregSecond`, ...).

use crate::error::{DatastoreErrorHelper, Result};
use crate::types::datetime::DatePrecision;
use std::fmt;

/// Base unit of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalBase {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
    Irregular,
}

impl IntervalBase {
    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sec" | "second" => Some(IntervalBase::Second),
            "min" | "minute" => Some(IntervalBase::Minute),
            "hr" | "hour" => Some(IntervalBase::Hour),
            "day" => Some(IntervalBase::Day),
            "mon" | "month" => Some(IntervalBase::Month),
            "yr" | "year" => Some(IntervalBase::Year),
            "irreg" | "irregular" => Some(IntervalBase::Irregular),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            IntervalBase::Second => "Second",
            IntervalBase::Minute => "Minute",
            IntervalBase::Hour => "Hour",
            IntervalBase::Day => "Day",
            IntervalBase::Month => "Month",
            IntervalBase::Year => "Year",
            IntervalBase::Irregular => "Irregular",
        }
    }

    fn precision(&self) -> Option<DatePrecision> {
        match self {
            IntervalBase::Second => Some(DatePrecision::Second),
            IntervalBase::Minute => Some(DatePrecision::Minute),
            IntervalBase::Hour => Some(DatePrecision::Hour),
            IntervalBase::Day => Some(DatePrecision::Day),
            IntervalBase::Month => Some(DatePrecision::Month),
            IntervalBase::Year => Some(DatePrecision::Year),
            IntervalBase::Irregular => None,
        }
    }
}

/// A parsed data interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    base: IntervalBase,
    multiplier: u32,
    /// Date precision of irregular data (`IrregDay` → Day).
    irregular_precision: Option<DatePrecision>,
}

impl TimeInterval {
    /// Parse interval text such as `Day`, `1Day`, `15Minute`, `Irregular` or `IrregHour`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || {
            DatastoreErrorHelper::invalid_argument()
                .message(format!("Invalid data interval '{}'", text))
        };
        let text = text.trim();
        let lower = text.to_lowercase();

        if let Some(rest) = lower.strip_prefix("irreg") {
            let rest = rest.strip_prefix("ular").unwrap_or(rest);
            let irregular_precision = if rest.is_empty() {
                None
            } else {
                Some(
                    IntervalBase::parse(rest)
                        .and_then(|b| b.precision())
                        .ok_or_else(invalid)?,
                )
            };
            return Ok(Self {
                base: IntervalBase::Irregular,
                multiplier: 1,
                irregular_precision,
            });
        }

        let digits_end = text
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let multiplier = if digits_end == 0 {
            1
        } else {
            text[..digits_end].parse::<u32>().map_err(|_| invalid())?
        };
        if multiplier == 0 {
            return Err(invalid());
        }
        let base = IntervalBase::parse(&text[digits_end..]).ok_or_else(invalid)?;
        Ok(Self {
            base,
            multiplier,
            irregular_precision: None,
        })
    }

    pub fn base(&self) -> IntervalBase {
        self.base
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn is_regular(&self) -> bool {
        self.base != IntervalBase::Irregular
    }

    /// Precision used for date/time values of this interval.
    ///
    /// Irregular data without an explicit precision keeps seconds.
    pub fn date_precision(&self) -> DatePrecision {
        self.base
            .precision()
            .or(self.irregular_precision)
            .unwrap_or(DatePrecision::Second)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.base == IntervalBase::Irregular {
            return match self.irregular_precision {
                Some(DatePrecision::Year) => write!(f, "IrregYear"),
                Some(DatePrecision::Month) => write!(f, "IrregMonth"),
                Some(DatePrecision::Day) => write!(f, "IrregDay"),
                Some(DatePrecision::Hour) => write!(f, "IrregHour"),
                Some(DatePrecision::Minute) => write!(f, "IrregMinute"),
                Some(DatePrecision::Second) => write!(f, "IrregSecond"),
                None => write!(f, "Irregular"),
            };
        }
        if self.multiplier > 1 {
            write!(f, "{}{}", self.multiplier, self.base.name())
        } else {
            f.write_str(self.base.name())
        }
    }
}
