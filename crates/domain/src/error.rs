//! Unified error types for the domain layer
//!
//! Every error here is a user-facing validation failure: it is raised before
//! any mutation happens, so callers can display it and carry on.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid name format)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Identifier could not be parsed at all
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("No such {entity_type} with ID: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Name or tag already taken
    #[error("{entity_type} name {name:?} is already in use")]
    Duplicate {
        entity_type: &'static str,
        name: String,
    },

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    /// Creates a validation error for malformed input.
    ///
    /// # Example
    /// ```ignore
    /// if name.len() > 32 {
    ///     return Err(DomainError::validation(format!("Quantity name {name:?} is too long")));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a duplicate name error
    pub fn duplicate(entity_type: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            name: name.into(),
        }
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }
}
