//! Error Types

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Provider error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Provider returned an error response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unreachable, timed out, or answering 5xx
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Credential absent from the environment
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Credential rejected by the provider
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider answered but produced no text
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// True when the failure happened on the way to or from the provider,
    /// as opposed to a provider that answered with something unusable.
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Auth(_) | Self::Provider(_)
        )
    }
}
