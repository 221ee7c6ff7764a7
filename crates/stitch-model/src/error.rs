//! Error types for snapshot construction

use crate::node::{NodeId, Span};
use crate::path::PathError;

/// Errors raised while building or addressing snapshots
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Span does not fit in the document text
    #[error("span {}..{} exceeds document length {len}", span.start, span.end)]
    SpanOutOfBounds { span: Span, len: usize },

    /// Parent id not present in the arena
    #[error("unknown parent node {0}")]
    UnknownParent(NodeId),

    /// Parent is not a type definition
    #[error("node {0} is not a container")]
    NotAContainer(NodeId),

    /// Member declared outside any container
    #[error("member '{0}' has no enclosing container")]
    OrphanMember(String),

    /// Arena index space exhausted
    #[error("node arena is full")]
    ArenaFull,

    /// Malformed lookup path
    #[error("lookup path error: {0}")]
    Path(#[from] PathError),
}
