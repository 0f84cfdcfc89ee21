//! Error types for port operations.

/// Game store operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

/// Errors reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessagingError {
    /// The message (or channel) no longer exists.
    #[error("Message not found")]
    NotFound,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Messaging unavailable: {0}")]
    Unavailable(String),
}

impl MessagingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_carries_operation() {
        let err = RepoError::database("game_documents", "disk I/O error");
        assert_eq!(
            err.to_string(),
            "Database error in game_documents: disk I/O error"
        );
    }

    #[test]
    fn only_not_found_is_not_found() {
        assert!(MessagingError::NotFound.is_not_found());
        assert!(!MessagingError::Forbidden("missing permissions".into()).is_not_found());
    }
}
