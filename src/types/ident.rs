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

//! Time-series identifiers.
//!
//! Grammar:
//!
//! ```text
//! [locationType:]locationID.dataSource.dataType.interval[.scenario][~datastoreName]
//! ```
//!
//! A part containing periods is written in single quotes, e.g.
//! `'08.1234'.USGS.Streamflow.Day`.

use crate::error::{DatastoreErrorHelper, Result};
use crate::types::interval::TimeInterval;
use std::fmt;

/// Parsed time-series identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TsIdent {
    pub location_type: String,
    pub location_id: String,
    pub data_source: String,
    pub data_type: String,
    pub interval: String,
    pub scenario: String,
    /// Datastore name after `~`, if any.
    pub input_name: Option<String>,
}

impl TsIdent {
    /// Parse an identifier string.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (main, input_name) = match text.split_once('~') {
            Some((main, input)) => (main, Some(input.trim().to_string())),
            None => (text, None),
        };

        let parts = split_unquoted(main, '.').ok_or_else(|| {
            DatastoreErrorHelper::invalid_argument()
                .message(format!("Unbalanced quotes in time series identifier '{}'", text))
        })?;
        if parts.len() < 4 || parts.len() > 5 {
            return Err(DatastoreErrorHelper::invalid_argument().message(format!(
                "Time series identifier '{}' must have 4 or 5 period-separated parts, found {}",
                text,
                parts.len()
            )));
        }

        let (location_type, location_id) = match parts[0].split_once(':') {
            Some((t, id)) if !parts[0].starts_with('\'') => (t.to_string(), id.to_string()),
            _ => (String::new(), parts[0].clone()),
        };
        let location_id = unquote(&location_id).to_string();
        if location_id.is_empty() {
            return Err(DatastoreErrorHelper::invalid_argument()
                .message(format!("Time series identifier '{}' has no location", text)));
        }

        Ok(Self {
            location_type,
            location_id,
            data_source: unquote(&parts[1]).to_string(),
            data_type: unquote(&parts[2]).to_string(),
            interval: unquote(&parts[3]).to_string(),
            scenario: parts.get(4).map(|s| unquote(s).to_string()).unwrap_or_default(),
            input_name: input_name.filter(|n| !n.is_empty()),
        })
    }

    /// Parsed form of the interval part.
    pub fn time_interval(&self) -> Result<TimeInterval> {
        TimeInterval::parse(&self.interval)
    }

    /// Identifier text without the `~datastore` suffix.
    pub fn to_string_without_input(&self) -> String {
        let mut out = String::new();
        if !self.location_type.is_empty() {
            out.push_str(&self.location_type);
            out.push(':');
        }
        out.push_str(&quote_if_needed(&self.location_id));
        for part in [&self.data_source, &self.data_type, &self.interval] {
            out.push('.');
            out.push_str(&quote_if_needed(part));
        }
        if !self.scenario.is_empty() {
            out.push('.');
            out.push_str(&quote_if_needed(&self.scenario));
        }
        out
    }
}

impl fmt::Display for TsIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_without_input())?;
        if let Some(ref input) = self.input_name {
            write!(f, "~{}", input)?;
        }
        Ok(())
    }
}

/// Split on `sep` outside single quotes; `None` if a quote is left open.
fn split_unquoted(text: &str, sep: char) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    for c in text.chars() {
        if c == '\'' {
            in_quote = !in_quote;
            current.push(c);
        } else if c == sep && !in_quote {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    if in_quote {
        return None;
    }
    parts.push(current);
    Some(parts)
}

fn unquote(part: &str) -> &str {
    part.strip_prefix('\'')
        .and_then(|p| p.strip_suffix('\''))
        .unwrap_or(part)
}

fn quote_if_needed(part: &str) -> String {
    if part.contains('.') {
        format!("'{}'", part)
    } else {
        part.to_string()
    }
}
