//! Error types for the contact-graph client.
//!
//! # Design
//! Building a request can only fail while encoding the payload, so the
//! builder has a single failure mode. `MissingConfig` belongs to
//! `ClientConfig::from_env`. Authentication problems are never detected
//! here; the server rejects the bearer token.

/// Errors returned by `GraphClient` and `ClientConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required configuration variable is not set.
    #[error("missing configuration: {var} is not set")]
    MissingConfig { var: &'static str },
}
