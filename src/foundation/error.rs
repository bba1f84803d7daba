/// Convenience result type used across replaycast.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Top-level error taxonomy used by replay APIs.
///
/// Only conditions that abort a run surface here. Malformed commands and removals of unknown ids
/// are absorbed where they are detected and never become a `ReplayError`.
#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    /// Invalid user-provided options or session data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while painting onto a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while writing frames to a sink. Fatal for the run.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors while reading frames from a source (not exhaustion, which is `Ok(None)`).
    #[error("source error: {0}")]
    Source(String),

    /// Errors when serializing or deserializing records and manifests.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error with preserved source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReplayError {
    /// Build a [`ReplayError::Validation`] from any message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReplayError::Render`] from any message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ReplayError::Encode`] from any message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReplayError::Source`] from any message.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Build a [`ReplayError::Serde`] from any message.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
