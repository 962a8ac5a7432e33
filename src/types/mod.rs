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

//! Time-series domain types.
//!
//! - `datetime`: date/time values carrying a precision
//! - `interval`: data intervals (`Day`, `15Minute`, `IrregSecond`)
//! - `ident`: the `[type:]id.source.type.interval[.scenario][~store]` identifier
//! - `meta`: metadata table records
//! - `series`: reconstructed series and points

pub mod datetime;
pub mod ident;
pub mod interval;
pub mod meta;
pub mod series;

// Re-export commonly used types
pub use datetime::{DatePrecision, TsDateTime};
pub use ident::TsIdent;
pub use interval::{IntervalBase, TimeInterval};
pub use meta::TimeSeriesMeta;
pub use series::{DataPoint, TimeSeries, MISSING};
