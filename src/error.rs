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

//! Error types for the generic datastore.
//!
//! Most datastore operations log failures and fold them into empty or `None`
//! results. The [`Error`] type is surfaced to callers only for hard failures
//! (an unsupported date/time column type) and for malformed caller input.
//!
//! Errors are built through [`DatastoreErrorHelper`]:
//!
//! ```ignore
//! return Err(DatastoreErrorHelper::unsupported_type()
//!     .message(format!("date/time column has type code {}", code)));
//! ```

use adbc_core::error::Status;
use arrow_schema::ArrowError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of datastore failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required table/column is not configured or absent from the backend.
    Configuration,
    /// The backend failed to execute a query.
    QueryExecution,
    /// A supposedly unique metadata lookup matched zero or several rows.
    AmbiguousMetadata,
    /// The date/time column type is outside the supported families.
    UnsupportedType,
    /// A single field could not be decoded.
    Extraction,
    /// Malformed caller input.
    InvalidArgument,
    /// A table or column does not exist.
    NotFound,
}

impl ErrorKind {
    fn label(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::QueryExecution => "query execution error",
            ErrorKind::AmbiguousMetadata => "ambiguous metadata",
            ErrorKind::UnsupportedType => "unsupported type",
            ErrorKind::Extraction => "extraction error",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotFound => "not found",
        }
    }
}

/// Error raised by datastore operations.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .kind.label())]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    /// The failure classification.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human readable message without the kind prefix.
    pub fn message_text(&self) -> &str {
        &self.message
    }

    /// Convert into an ADBC error so the datastore can sit behind ADBC callers.
    pub fn to_adbc(&self) -> adbc_core::error::Error {
        let status = match self.kind {
            ErrorKind::Configuration => Status::InvalidState,
            ErrorKind::QueryExecution => Status::IO,
            ErrorKind::AmbiguousMetadata => Status::Integrity,
            ErrorKind::UnsupportedType => Status::NotImplemented,
            ErrorKind::Extraction => Status::InvalidData,
            ErrorKind::InvalidArgument => Status::InvalidArguments,
            ErrorKind::NotFound => Status::NotFound,
        };
        adbc_core::error::Error::with_message_and_status(self.message.clone(), status)
    }
}

impl From<adbc_core::error::Error> for Error {
    fn from(err: adbc_core::error::Error) -> Self {
        let kind = match err.status {
            Status::NotFound => ErrorKind::NotFound,
            Status::InvalidArguments => ErrorKind::InvalidArgument,
            _ => ErrorKind::QueryExecution,
        };
        Error {
            kind,
            message: err.message,
        }
    }
}

impl From<ArrowError> for Error {
    fn from(err: ArrowError) -> Self {
        DatastoreErrorHelper::extraction().message(format!("Arrow error: {}", err))
    }
}

/// Pending error of a known kind, completed with [`ErrorBuilder::message`].
#[derive(Debug, Clone, Copy)]
pub struct ErrorBuilder {
    kind: ErrorKind,
}

impl ErrorBuilder {
    /// Attach the message and produce the error.
    pub fn message(self, message: impl Into<String>) -> Error {
        Error {
            kind: self.kind,
            message: message.into(),
        }
    }
}

/// Entry points for building [`Error`] values.
pub struct DatastoreErrorHelper;

impl DatastoreErrorHelper {
    pub fn configuration() -> ErrorBuilder {
        ErrorBuilder {
            kind: ErrorKind::Configuration,
        }
    }

    pub fn query_execution() -> ErrorBuilder {
        ErrorBuilder {
            kind: ErrorKind::QueryExecution,
        }
    }

    pub fn ambiguous_metadata() -> ErrorBuilder {
        ErrorBuilder {
            kind: ErrorKind::AmbiguousMetadata,
        }
    }

    pub fn unsupported_type() -> ErrorBuilder {
        ErrorBuilder {
            kind: ErrorKind::UnsupportedType,
        }
    }

    pub fn extraction() -> ErrorBuilder {
        ErrorBuilder {
            kind: ErrorKind::Extraction,
        }
    }

    pub fn invalid_argument() -> ErrorBuilder {
        ErrorBuilder {
            kind: ErrorKind::InvalidArgument,
        }
    }

    pub fn not_found() -> ErrorBuilder {
        ErrorBuilder {
            kind: ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_kind() {
        let err = DatastoreErrorHelper::unsupported_type().message("type code 12");
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert_eq!(format!("{err}"), "unsupported type: type code 12");
        assert_eq!(err.message_text(), "type code 12");
    }

    #[test]
    fn test_to_adbc_status() {
        let err = DatastoreErrorHelper::not_found().message("no such table");
        let adbc = err.to_adbc();
        assert_eq!(adbc.status, Status::NotFound);
        assert_eq!(adbc.message, "no such table");

        let err = DatastoreErrorHelper::invalid_argument().message("bad identifier");
        assert_eq!(err.to_adbc().status, Status::InvalidArguments);
    }

    #[test]
    fn test_from_adbc_error() {
        let adbc = adbc_core::error::Error::with_message_and_status("boom", Status::IO);
        let err: Error = adbc.into();
        assert_eq!(err.kind(), ErrorKind::QueryExecution);
        assert_eq!(err.message_text(), "boom");
    }

    #[test]
    fn test_from_arrow_error() {
        let err: Error = ArrowError::CastError("not a string".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Extraction);
        assert!(err.message_text().contains("not a string"));
    }
}
