use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Unverified: {message}")]
    Unverified { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("Dependency failed: {dependency} - {message}")]
    DependencyFailed { dependency: String, message: String },

    /// One of two required store mutations succeeded and the other did not
    #[error("Partial write during {operation}: {message}")]
    PartialWrite { operation: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn unverified(message: impl Into<String>) -> Self {
        Self::Unverified {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn dependency(dependency: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DependencyFailed {
            dependency: dependency.into(),
            message: message.into(),
        }
    }

    pub fn partial_write(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PartialWrite {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether the message is safe to show to the end user as-is
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::Storage { .. }
                | Self::Internal { .. }
                | Self::Configuration { .. }
                | Self::PartialWrite { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Post 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Post 'abc' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Title is required");
        assert_eq!(error.to_string(), "Validation error: Title is required");
    }

    #[test]
    fn test_partial_write_error() {
        let error = DomainError::partial_write("submit", "mirror update failed");
        assert_eq!(
            error.to_string(),
            "Partial write during submit: mirror update failed"
        );
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(DomainError::forbidden("no").is_user_facing());
        assert!(DomainError::dependency("mail", "down").is_user_facing());
        assert!(!DomainError::storage("pool closed").is_user_facing());
        assert!(!DomainError::partial_write("delete", "x").is_user_facing());
    }
}
