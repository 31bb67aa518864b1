//! Domain-level error taxonomy shared across all crates.

use crate::types::DbId;

/// Errors produced by domain logic and the repository layer.
///
/// The API crate maps each variant onto an HTTP status and the standard
/// `{ success: false, message }` envelope; nothing here knows about HTTP.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by id found nothing.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity name for the error message (e.g. `"Book"`).
        entity: &'static str,
        /// The id that was looked up.
        id: DbId,
    },

    /// User input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An external service failed in a classified, user-explainable way.
    /// The message is safe to surface to the caller.
    #[error("{0}")]
    Upstream(String),

    /// An unexpected internal failure. The message is logged, not surfaced.
    #[error("Internal error: {0}")]
    Internal(String),
}
