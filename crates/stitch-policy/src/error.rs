//! Policy lookup errors

/// Errors raised while resolving configured policies
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// No policy registered under the name
    #[error("unknown {kind} policy '{name}'")]
    UnknownPolicy {
        /// Policy family (`bounds_check`, `error_block`, `logging`)
        kind: &'static str,
        /// Requested name
        name: String,
    },

    /// Logger field name is empty or not an identifier
    #[error("invalid logger field '{0}'")]
    InvalidLoggerField(String),
}
