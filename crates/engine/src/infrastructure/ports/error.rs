//! Error types for port operations.

use branchwright_domain::DomainError;

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Business constraint violated.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// An aggregate refused the change.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a ConstraintViolation error.
    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from a prose rewriting backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProseError {
    /// Transient backend failure
    #[error("Prose request failed: {0}")]
    RequestFailed(String),
    /// The backend refused the request; retrying cannot help
    #[error("Prose request rejected: {0}")]
    Rejected(String),
    #[error("Invalid prose response: {0}")]
    InvalidResponse(String),
    #[error("Prose request timed out after {0} ms")]
    Timeout(u64),
}
