use thiserror::Error;

use crate::soap::TransportError;

/// Errors returned by registry adapter operations
#[derive(Error, Debug)]
pub enum AdapterError {
    /// SOAP/HTTP failure, passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The result payload could not be decoded: no matching record
    #[error("No data found")]
    NotFound,
}

impl AdapterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdapterError::NotFound)
    }
}

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;
