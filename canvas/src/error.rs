//! Error taxonomy shared by every engine operation.
//!
//! Each variant maps to one user-facing outcome: `Unauthorized` sends the user
//! to the login entry point, `Forbidden` shows a permission notice, `NotFound`
//! triggers a refresh, `Validation` rejects the edit before it reaches
//! persistence, and `Network` shows a retryable failure notice. The engine
//! never retries on its own.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Stable machine-readable code for an error, suitable for wire payloads.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("not signed in")]
    Unauthorized,
    #[error("permission denied: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("network failure: {0}")]
    Network(String),
}

impl CanvasError {
    /// Whether a manual re-trigger of the same operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the UI should redirect to the login entry point.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl ErrorCode for CanvasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Validation(_) => "E_VALIDATION",
            Self::Network(_) => "E_NETWORK",
        }
    }
}
