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

//! SQL SELECT builder for metadata and data queries.
//!
//! Every query the datastore issues is a single-table SELECT with equality
//! and range predicates, optional raw clauses from the filter assembler,
//! and an ORDER BY. The builder collects those parts and renders them in
//! one place so the text is testable on its own.

use crate::types::datetime::TsDateTime;

/// A literal on the right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Timestamp(TsDateTime),
}

impl SqlValue {
    fn render(&self) -> String {
        match self {
            SqlValue::Text(s) => Self::quote_literal(s),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Timestamp(dt) => dt.to_sql_literal(),
        }
    }

    /// Single-quote a string literal, doubling embedded quotes.
    pub fn quote_literal(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Builds a single-table SELECT.
///
/// # Examples
///
/// ```ignore
/// let sql = SelectQuery::new("ts_meta")
///     .distinct()
///     .column("ts_meta.data_type")
///     .filter_equals("ts_meta.interval", Some("Day"))
///     .order_by("ts_meta.data_type")
///     .build();
/// assert_eq!(
///     sql,
///     "SELECT DISTINCT ts_meta.data_type FROM ts_meta WHERE ts_meta.interval = 'Day' ORDER BY ts_meta.data_type"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: String,
    distinct: bool,
    columns: Vec<String>,
    predicates: Vec<String>,
    order_by: Vec<String>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            distinct: false,
            columns: Vec::new(),
            predicates: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add `column = 'value'` unless the value is unset, empty or `*`.
    pub fn filter_equals(self, column: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if is_filter_value(Some(v)) => {
                self.where_equals(column, SqlValue::Text(v.to_string()))
            }
            _ => self,
        }
    }

    pub fn where_equals(mut self, column: &str, value: SqlValue) -> Self {
        self.predicates
            .push(format!("{} = {}", column, value.render()));
        self
    }

    /// Inclusive lower bound.
    pub fn at_least(mut self, column: &str, value: SqlValue) -> Self {
        self.predicates
            .push(format!("{} >= {}", column, value.render()));
        self
    }

    /// Inclusive upper bound.
    pub fn at_most(mut self, column: &str, value: SqlValue) -> Self {
        self.predicates
            .push(format!("{} <= {}", column, value.render()));
        self
    }

    /// Add a pre-rendered boolean clause; empty clauses are ignored.
    pub fn where_clause(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        if !clause.trim().is_empty() {
            self.predicates.push(clause);
        }
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }

    pub fn build(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        sql
    }
}

/// Returns `true` if a filter argument should produce a predicate:
/// set, non-empty, and not the `*` wildcard.
pub fn is_filter_value(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !v.is_empty() && v != "*",
    }
}
