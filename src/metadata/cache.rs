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

//! Distinct-value cache owned by one datastore.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Lists of distinct values keyed by filter signature.
///
/// Entries live as long as the datastore; nothing is evicted.
#[derive(Debug, Default)]
pub struct DistinctValueCache {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl DistinctValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached list for `key`, or run `compute` and store its result.
    ///
    /// `compute` runs while the lock is held, so concurrent callers with the
    /// same key execute it once. A `None` result is returned as an empty
    /// list and not stored.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Vec<String>
    where
        F: FnOnce() -> Option<Vec<String>>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(values) = entries.get(key) {
            debug!("Distinct value cache hit for '{}'", key);
            return values.clone();
        }
        match compute() {
            Some(values) => {
                entries.insert(key.to_string(), values.clone());
                values
            }
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
