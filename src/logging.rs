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

//! Tracing setup for datastores.
//!
//! Every datastore logs its query text, cache hits and skipped rows through
//! `tracing` under the `generic_datastore` target. The first
//! [`GenericDatabaseDatastore`](crate::GenericDatabaseDatastore) built in a
//! process installs a subscriber from its `Logging.*` properties:
//!
//! - `Logging.Level = off` leaves the process without a subscriber
//! - `Logging.Level = debug` (or any level name) overrides `RUST_LOG`
//! - with no level, `RUST_LOG` applies and falls back to `warn`
//! - `Logging.File` appends plain text to a file instead of stderr
//!
//! ```text
//! Logging.Level = debug
//! Logging.File = /var/log/hydro-datastore.log
//! ```

use crate::config::{DatastoreConfig, PROP_LOGGING_FILE, PROP_LOGGING_LEVEL};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{
    fmt::{self, time::SystemTime, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_TARGET: &str = "generic_datastore";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// The `Logging.*` properties of a datastore.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Level name such as `warn` or `debug`; `off` disables logging.
    pub level: Option<String>,
    /// Append to this file rather than stderr.
    pub file: Option<String>,
}

impl LogConfig {
    pub fn from_config(config: &DatastoreConfig) -> Self {
        Self {
            level: config.property(PROP_LOGGING_LEVEL).map(str::to_string),
            file: config.property(PROP_LOGGING_FILE).map(str::to_string),
        }
    }

    fn is_off(&self) -> bool {
        self.level
            .as_deref()
            .is_some_and(|level| level.eq_ignore_ascii_case("off"))
    }

    fn filter(&self) -> EnvFilter {
        match self.level {
            Some(ref level) => EnvFilter::new(format!("{}={}", LOG_TARGET, level.to_lowercase())),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", LOG_TARGET))),
        }
    }
}

/// Install the process-wide subscriber, once.
///
/// Later calls do nothing, and a subscriber the application installed
/// beforehand is left in place.
pub fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        if config.is_off() {
            return;
        }

        let writer = match config.file {
            Some(ref path) => {
                match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                    Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
                    Err(e) => {
                        eprintln!("generic-datastore: cannot open log file {}: {}", path, e);
                        return;
                    }
                }
            }
            None => BoxMakeWriter::new(std::io::stderr),
        };

        tracing_subscriber::registry()
            .with(config.filter())
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(false)
                    .with_ansi(config.file.is_none())
                    .with_timer(SystemTime),
            )
            .try_init()
            .ok();
    });
}
