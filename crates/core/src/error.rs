use crate::types::DbId;

/// Error taxonomy shared by every catalog operation.
///
/// Arguments and validation are checked before any mutation. Storage
/// failures reach callers only as [`CoreError::Conflict`] (retryable) or
/// [`CoreError::Internal`]; backend details are logged where they occur.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed input caught before touching storage (e.g. a non-positive id).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A business rule on a transfer object was violated.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A concurrent writer won the race, or stored positions are corrupt.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Uniform service-tier failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
}
