//! Edits exchanged with the text-mutation service

use crate::hash::ContentHash;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Position new text is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "at", content = "node")]
pub enum Anchor {
    /// Immediately before an existing node
    Before(NodeId),
    /// Immediately after an existing node
    After(NodeId),
    /// Start of the document
    DocumentStart,
    /// End of the document
    DocumentEnd,
    /// Start of a container body
    ContainerStart(NodeId),
    /// End of a container body
    ContainerEnd(NodeId),
}

impl Display for Anchor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before(id) => write!(f, "before {id}"),
            Self::After(id) => write!(f, "after {id}"),
            Self::DocumentStart => f.write_str("document start"),
            Self::DocumentEnd => f.write_str("document end"),
            Self::ContainerStart(id) => write!(f, "start of {id}"),
            Self::ContainerEnd(id) => write!(f, "end of {id}"),
        }
    }
}

/// A single text mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum Edit {
    /// Insert text at an anchor
    Insert {
        /// Where
        anchor: Anchor,
        /// What
        text: String,
    },
    /// Replace a node's full text
    Replace {
        /// Node to overwrite
        node: NodeId,
        /// New text
        text: String,
    },
    /// Remove a node
    Delete {
        /// Node to remove
        node: NodeId,
    },
    /// Add an import directive
    AddImport {
        /// Imported namespace
        namespace: String,
        /// Optional alias
        alias: Option<String>,
    },
}

impl Edit {
    /// Short operation name for logs and errors
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Replace { .. } => "replace",
            Self::Delete { .. } => "delete",
            Self::AddImport { .. } => "add_import",
        }
    }
}

/// Journal entry for an applied edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    /// The edit that was applied
    pub edit: Edit,
    /// Hash of the text the edit was applied to
    pub base_hash: ContentHash,
    /// Hash of the resulting text
    pub result_hash: ContentHash,
}

impl EditRecord {
    /// True if the edit left the text unchanged
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.base_hash == self.result_hash
    }
}
