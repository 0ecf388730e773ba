//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when an input is structurally present but unusable:
    /// - A selected alternative id that is not in the alternative set
    /// - Scores or weights outside their allowed range
    ///
    /// # Example
    /// ```ignore
    /// if anchor.alternatives.is_empty() {
    ///     return Err(DomainError::validation("Anchor has no alternative outcomes"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Used by the `FromStr` implementations of the closed vocabulary enums
    /// (moods, ending types, strictness levels) when reading configuration.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("alternative set is empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: alternative set is empty");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Branch", "123e4567-e89b-12d3-a456-426614174000");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("Branch"));
        assert!(err.to_string().contains("123e4567"));
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("critical issues cannot be dismissed");
        assert_eq!(
            err.to_string(),
            "Constraint violation: critical issues cannot be dismissed"
        );
    }

    #[test]
    fn test_invalid_state_transition_error() {
        let err = DomainError::invalid_state_transition("issue already resolved");
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }
}
