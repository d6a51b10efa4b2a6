use thiserror::Error;

use crate::models::InvalidCoordinate;
use crate::services::StoreError;

/// Errors surfaced by list fetches
///
/// An empty page is never an error: it means zero matching records.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// A geography-filtered list was requested but the requester has no location
    #[error("Missing location: requester {0} has no known coordinate")]
    MissingLocation(i64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl From<InvalidCoordinate> for ListError {
    fn from(value: InvalidCoordinate) -> Self {
        ListError::InputValidation(value.to_string())
    }
}

impl From<validator::ValidationErrors> for ListError {
    fn from(value: validator::ValidationErrors) -> Self {
        ListError::InputValidation(value.to_string())
    }
}
