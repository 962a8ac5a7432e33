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

use crate::types::ident::TsIdent;

/// One row of the metadata table.
///
/// Built once from a query result and never mutated afterwards; the
/// `with_*` methods consume the value and are only used while assembling it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesMeta {
    id: i64,
    location_type: String,
    location_id: String,
    data_source: String,
    data_type: String,
    interval: String,
    scenario: String,
    description: String,
    units: String,
}

impl TimeSeriesMeta {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_location_type(mut self, value: impl Into<String>) -> Self {
        self.location_type = value.into();
        self
    }

    pub fn with_location_id(mut self, value: impl Into<String>) -> Self {
        self.location_id = value.into();
        self
    }

    pub fn with_data_source(mut self, value: impl Into<String>) -> Self {
        self.data_source = value.into();
        self
    }

    pub fn with_data_type(mut self, value: impl Into<String>) -> Self {
        self.data_type = value.into();
        self
    }

    pub fn with_interval(mut self, value: impl Into<String>) -> Self {
        self.interval = value.into();
        self
    }

    pub fn with_scenario(mut self, value: impl Into<String>) -> Self {
        self.scenario = value.into();
        self
    }

    pub fn with_description(mut self, value: impl Into<String>) -> Self {
        self.description = value.into();
        self
    }

    pub fn with_units(mut self, value: impl Into<String>) -> Self {
        self.units = value.into();
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn location_type(&self) -> &str {
        &self.location_type
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    /// Identifier of the series this record describes.
    pub fn identifier(&self, datastore_name: Option<&str>) -> TsIdent {
        TsIdent {
            location_type: self.location_type.clone(),
            location_id: self.location_id.clone(),
            data_source: self.data_source.clone(),
            data_type: self.data_type.clone(),
            interval: self.interval.clone(),
            scenario: self.scenario.clone(),
            input_name: datastore_name
                .filter(|n| !n.is_empty())
                .map(|n| n.to_string()),
        }
    }
}
