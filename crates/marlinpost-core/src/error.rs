//! Error handling for marlinpost
//!
//! Generation either completes or aborts: a half-written program is unsafe
//! to run, so every variant here is fatal to the job that raised it.

use thiserror::Error;

/// Post-processor error type
///
/// Represents conditions that stop G-code generation immediately.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PostError {
    /// The job requests motion this controller cannot perform
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// The job or properties name a mode the post does not know
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An event arrived in a lifecycle state that cannot accept it
    #[error("Unexpected {event} event while in state {state}")]
    UnexpectedEvent {
        /// The lifecycle state at the time of the event.
        state: String,
        /// The event kind that was rejected.
        event: String,
    },
}

impl PostError {
    /// Create an unsupported-feature error
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature(feature.into())
    }

    /// Create an invalid-configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// Result type alias for post-processor operations.
pub type PostResult<T> = Result<T, PostError>;
