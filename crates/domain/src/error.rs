//! Domain error types.

use cache::CacheError;
use common::AggregateId;
use store::StoreError;
use thiserror::Error;

use crate::publisher::PublishError;

/// A value failed its construction rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be a positive finite number (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{value:?} is not a valid {field}; expected one of: {allowed}")]
    InvalidVariant {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{field}: {message}")]
    Inconsistent {
        field: &'static str,
        message: String,
    },
}

/// Errors raised by entity construction and transitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The entity is soft-deleted and accepts no further changes.
    #[error("{aggregate_type} {id} is deleted")]
    Deleted {
        aggregate_type: &'static str,
        id: AggregateId,
    },
}

/// Errors surfaced by command and query handlers.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An entity expected to exist was not found.
    #[error("{aggregate_type} not found: {aggregate_id}")]
    NotFound {
        aggregate_type: &'static str,
        aggregate_id: AggregateId,
    },

    /// Entity construction or transition was rejected.
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    /// An error occurred in the document store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An error occurred in the cache.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// An event could not be delivered.
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// A stored document could not be rehydrated into an entity.
    #[error("Corrupt {aggregate_type} document {aggregate_id}: {message}")]
    Corrupt {
        aggregate_type: &'static str,
        aggregate_id: AggregateId,
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Creates a not-found error for an aggregate type.
    pub fn not_found(aggregate_type: &'static str, aggregate_id: AggregateId) -> Self {
        DomainError::NotFound {
            aggregate_type,
            aggregate_id,
        }
    }

    /// Returns true for errors a client caused (validation, not found).
    pub fn is_client_error(&self) -> bool {
        matches!(self, DomainError::NotFound { .. } | DomainError::Entity(_))
    }
}

impl From<ValidationError> for DomainError {
    fn from(e: ValidationError) -> Self {
        DomainError::Entity(EntityError::Validation(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_field() {
        let err = ValidationError::InvalidVariant {
            field: "soil type",
            value: "lava".to_string(),
            allowed: "clay, sandy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "\"lava\" is not a valid soil type; expected one of: clay, sandy"
        );
    }

    #[test]
    fn client_errors_are_classified() {
        let id = AggregateId::new();
        assert!(DomainError::not_found("Crop", id).is_client_error());
        assert!(DomainError::from(ValidationError::Empty { field: "name" }).is_client_error());
        assert!(
            !DomainError::Corrupt {
                aggregate_type: "Crop",
                aggregate_id: id,
                message: "bad".to_string(),
            }
            .is_client_error()
        );
    }
}
