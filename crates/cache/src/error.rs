use thiserror::Error;

/// Errors that can occur when talking to a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not serve the request.
    #[error("Cache backend error: {message}")]
    Backend { message: String },

    /// A key pattern could not be compiled.
    #[error("Invalid key pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// A value could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Creates a backend error from any message.
    pub fn backend(message: impl Into<String>) -> Self {
        CacheError::Backend {
            message: message.into(),
        }
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
