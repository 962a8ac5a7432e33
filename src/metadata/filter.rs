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

//! Filter clauses supplied by an input filter panel.
//!
//! A filter panel holds several groups, each rendering one boolean clause
//! over a `table.column`. One panel feeds many narrower queries: each
//! query keeps only the clauses that mention its own target column.

use crate::config::FilterKind;
use crate::metadata::sql::SqlValue;
use std::fmt;

/// Source of rendered filter clauses, one per group.
pub trait FilterClauseSource {
    fn group_count(&self) -> usize;

    /// Clause for one group, `None` if the group is unset.
    fn render_clause(&self, group: usize) -> Option<String>;
}

/// Pre-rendered clauses.
impl<S: AsRef<str>> FilterClauseSource for [S] {
    fn group_count(&self) -> usize {
        self.len()
    }

    fn render_clause(&self, group: usize) -> Option<String> {
        self.get(group)
            .map(|c| c.as_ref().to_string())
            .filter(|c| !c.trim().is_empty())
    }
}

impl<S: AsRef<str>> FilterClauseSource for Vec<S> {
    fn group_count(&self) -> usize {
        self.as_slice().group_count()
    }

    fn render_clause(&self, group: usize) -> Option<String> {
        self.as_slice().render_clause(group)
    }
}

/// Comparison applied by one filter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Matches,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterOperator::Equals => "Equals",
            FilterOperator::NotEquals => "NotEquals",
            FilterOperator::Matches => "Matches",
            FilterOperator::Contains => "Contains",
            FilterOperator::StartsWith => "StartsWith",
            FilterOperator::EndsWith => "EndsWith",
            FilterOperator::GreaterThan => "GreaterThan",
            FilterOperator::LessThan => "LessThan",
        };
        f.write_str(name)
    }
}

/// One filter group: `field` is `table.column`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
    pub kind: FilterKind,
}

impl InputFilter {
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            kind: FilterKind::String,
        }
    }

    pub fn with_kind(mut self, kind: FilterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Render as SQL; an empty value renders nothing.
    ///
    /// String comparisons are case-insensitive through `upper(..)`.
    /// Numeric kinds compare the raw value and ignore pattern operators.
    pub fn render(&self) -> Option<String> {
        let value = self.value.trim();
        if value.is_empty() {
            return None;
        }
        let field = &self.field;
        match self.kind {
            FilterKind::String => {
                let upper = value.to_uppercase();
                let like = |pattern: String| {
                    format!("upper({}) like {}", field, SqlValue::quote_literal(&pattern))
                };
                let clause = match self.operator {
                    FilterOperator::Equals => {
                        format!("upper({}) = {}", field, SqlValue::quote_literal(&upper))
                    }
                    FilterOperator::NotEquals => {
                        format!("upper({}) <> {}", field, SqlValue::quote_literal(&upper))
                    }
                    FilterOperator::Matches => like(upper.replace('*', "%")),
                    FilterOperator::Contains => like(format!("%{}%", upper)),
                    FilterOperator::StartsWith => like(format!("{}%", upper)),
                    FilterOperator::EndsWith => like(format!("%{}", upper)),
                    FilterOperator::GreaterThan => {
                        format!("upper({}) > {}", field, SqlValue::quote_literal(&upper))
                    }
                    FilterOperator::LessThan => {
                        format!("upper({}) < {}", field, SqlValue::quote_literal(&upper))
                    }
                };
                Some(clause)
            }
            FilterKind::Integer | FilterKind::Double | FilterKind::Boolean => {
                let literal = match self.kind {
                    FilterKind::Boolean => value.to_lowercase(),
                    _ => {
                        if value.parse::<f64>().is_err() {
                            tracing::warn!(
                                "Ignoring non-numeric filter value '{}' for {}",
                                value,
                                field
                            );
                            return None;
                        }
                        value.to_string()
                    }
                };
                let op = match self.operator {
                    FilterOperator::Equals | FilterOperator::Matches => "=",
                    FilterOperator::NotEquals => "<>",
                    FilterOperator::GreaterThan => ">",
                    FilterOperator::LessThan => "<",
                    FilterOperator::Contains
                    | FilterOperator::StartsWith
                    | FilterOperator::EndsWith => {
                        tracing::warn!(
                            "Operator {} does not apply to non-string field {}",
                            self.operator,
                            field
                        );
                        return None;
                    }
                };
                Some(format!("{} {} {}", field, op, literal))
            }
        }
    }
}

/// A filter panel's worth of [`InputFilter`] groups.
#[derive(Debug, Clone, Default)]
pub struct InputFilterSet {
    filters: Vec<InputFilter>,
}

impl InputFilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: InputFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: InputFilter) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[InputFilter] {
        &self.filters
    }
}

impl FilterClauseSource for InputFilterSet {
    fn group_count(&self) -> usize {
        self.filters.len()
    }

    fn render_clause(&self, group: usize) -> Option<String> {
        self.filters.get(group).and_then(InputFilter::render)
    }
}

/// Keep the clauses whose text mentions `target` (case-insensitive
/// substring) and join them as `(c1) AND (c2)`; empty if none match.
///
/// A column name that is a substring of another (`ID` in `LocationID`)
/// also matches.
pub fn assemble_scoped_clause<F>(source: &F, target: &str) -> String
where
    F: FilterClauseSource + ?Sized,
{
    let target = target.to_uppercase();
    (0..source.group_count())
        .filter_map(|group| source.render_clause(group))
        .filter(|clause| clause.to_uppercase().contains(&target))
        .map(|clause| format!("({})", clause))
        .collect::<Vec<_>>()
        .join(" AND ")
}
