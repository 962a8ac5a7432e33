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

//! Reconstructed time series and their points.

use crate::error::{DatastoreErrorHelper, Result};
use crate::types::datetime::TsDateTime;
use crate::types::ident::TsIdent;

/// Missing-value sentinel.
pub const MISSING: f64 = f64::NAN;

/// One reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub date_time: TsDateTime,
    /// [`MISSING`] when there was no reading.
    pub value: f64,
    /// Empty when the row carried no flag.
    pub flag: String,
}

impl DataPoint {
    pub fn new(date_time: TsDateTime, value: f64, flag: impl Into<String>) -> Self {
        Self {
            date_time,
            value,
            flag: flag.into(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// A time series shell plus the points set within its envelope.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    identifier: TsIdent,
    description: String,
    units: String,
    missing: f64,
    date1: Option<TsDateTime>,
    date2: Option<TsDateTime>,
    points: Vec<DataPoint>,
    allocated: bool,
}

impl TimeSeries {
    pub fn new(identifier: TsIdent) -> Self {
        Self {
            identifier,
            description: String::new(),
            units: String::new(),
            missing: MISSING,
            date1: None,
            date2: None,
            points: Vec::new(),
            allocated: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn identifier(&self) -> &TsIdent {
        &self.identifier
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    /// The missing-value sentinel.
    pub fn missing(&self) -> f64 {
        self.missing
    }

    pub fn is_missing(&self, value: f64) -> bool {
        value.is_nan() || value == self.missing
    }

    /// Set the data envelope. Clears any points already set.
    pub fn set_period(&mut self, date1: TsDateTime, date2: TsDateTime) {
        self.date1 = Some(date1);
        self.date2 = Some(date2);
        self.points.clear();
        self.allocated = false;
    }

    pub fn date1(&self) -> Option<TsDateTime> {
        self.date1
    }

    pub fn date2(&self) -> Option<TsDateTime> {
        self.date2
    }

    /// Prepare storage for the envelope; fails if no envelope is set.
    pub fn allocate_data_space(&mut self) -> Result<()> {
        match (self.date1, self.date2) {
            (Some(d1), Some(d2)) if d1 <= d2 => {
                self.allocated = true;
                Ok(())
            }
            (Some(d1), Some(d2)) => Err(DatastoreErrorHelper::invalid_argument().message(
                format!("Series period start {} is after end {}", d1, d2),
            )),
            _ => Err(DatastoreErrorHelper::invalid_argument()
                .message(format!("Series {} has no period to allocate", self.identifier))),
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Set one point. Points outside the envelope are rejected.
    pub fn set_data_value(&mut self, point: DataPoint) -> Result<()> {
        if !self.allocated {
            return Err(DatastoreErrorHelper::invalid_argument()
                .message(format!("Series {} has no allocated data space", self.identifier)));
        }
        let inside = match (self.date1, self.date2) {
            (Some(d1), Some(d2)) => {
                point.date_time.value() >= d1.value() && point.date_time.value() <= d2.value()
            }
            _ => false,
        };
        if !inside {
            return Err(DatastoreErrorHelper::invalid_argument().message(format!(
                "Point {} is outside the period of series {}",
                point.date_time, self.identifier
            )));
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> TsDateTime {
        TsDateTime::from_ymd(2020, 1, d).unwrap()
    }

    fn series() -> TimeSeries {
        TimeSeries::new(TsIdent::parse("L1.SRC.Flow.Day").unwrap())
            .with_units("CFS")
            .with_description("Flow at L1")
    }

    #[test]
    fn test_set_data_value_within_envelope() {
        let mut ts = series();
        ts.set_period(day(1), day(3));
        ts.allocate_data_space().unwrap();
        ts.set_data_value(DataPoint::new(day(1), 1.0, "")).unwrap();
        ts.set_data_value(DataPoint::new(day(3), MISSING, "E")).unwrap();
        assert_eq!(ts.len(), 2);
        assert!(ts.points()[1].is_missing());
        assert!(ts.is_missing(ts.points()[1].value));
        assert_eq!(ts.units(), "CFS");
    }

    #[test]
    fn test_set_data_value_rejects_outside_envelope() {
        let mut ts = series();
        ts.set_period(day(2), day(3));
        ts.allocate_data_space().unwrap();
        assert!(ts.set_data_value(DataPoint::new(day(1), 1.0, "")).is_err());
        assert!(ts.set_data_value(DataPoint::new(day(4), 1.0, "")).is_err());
        assert!(ts.is_empty());
    }

    #[test]
    fn test_allocate_requires_period() {
        let mut ts = series();
        assert!(ts.allocate_data_space().is_err());
        assert!(ts.set_data_value(DataPoint::new(day(1), 1.0, "")).is_err());

        ts.set_period(day(3), day(1));
        assert!(ts.allocate_data_space().is_err());
    }
}
