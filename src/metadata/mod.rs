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

//! Metadata query support.
//!
//! ## Module Structure
//!
//! - `sql`: SELECT builder shared by every metadata and data query
//! - `filter`: filter panel clauses and scoping to one column
//! - `cache`: distinct-value cache
//! - `parse`: cell extraction from Arrow result batches
//! - `type_mapping`: backend type codes to internal types

pub mod cache;
pub mod filter;
pub mod parse;
pub mod sql;
pub mod type_mapping;

// Re-export commonly used types
pub use cache::DistinctValueCache;
pub use filter::{
    assemble_scoped_clause, FilterClauseSource, FilterOperator, InputFilter, InputFilterSet,
};
pub use sql::{SelectQuery, SqlValue};
pub use type_mapping::{ColumnField, InternalType, PrecisionCorrector};
