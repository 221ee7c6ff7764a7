//! Error types for update sessions

/// Errors raised by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A required input is missing or structurally invalid
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The text-mutation service returned an unresolved result
    ///
    /// The session must be discarded after this error.
    #[error("integrity failure during {operation}: {detail}")]
    Integrity {
        /// Operation that was in flight
        operation: &'static str,
        /// What could not be resolved
        detail: String,
    },
}

impl SessionError {
    /// Create invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create integrity error
    pub fn integrity(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Integrity {
            operation,
            detail: detail.into(),
        }
    }

    /// True if the session that raised this error must be discarded
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }
}
