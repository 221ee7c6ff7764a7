//! Text-mutation service boundary
//!
//! The engine never edits text itself. Every mutation is delegated to an
//! implementation of [`TextMutationService`], which applies the edit,
//! re-parses, and hands back a fresh [`SourceDocument`]. An absent result
//! means the edit could not be resolved against the text.

use crate::document::SourceDocument;
use crate::edit::{Anchor, Edit};
use crate::node::NodeId;
use crate::path::LookupPath;
use async_trait::async_trait;
use std::fmt::Debug;

/// External service that applies text edits and re-derives structure
///
/// # Contract
/// - Every mutating method returns a new snapshot or `None`
/// - Node ids passed in belong to `document`
/// - Calls against one document are issued sequentially
#[async_trait]
pub trait TextMutationService: Send + Sync + Debug {
    /// Insert `text` immediately before `anchor`
    async fn insert_before(&self, document: &SourceDocument, anchor: NodeId, text: &str)
        -> Option<SourceDocument>;

    /// Insert `text` immediately after `anchor`
    async fn insert_after(&self, document: &SourceDocument, anchor: NodeId, text: &str)
        -> Option<SourceDocument>;

    /// Insert `text` at the start of the document
    async fn insert_at_document_start(&self, document: &SourceDocument, text: &str) -> Option<SourceDocument>;

    /// Insert `text` at the end of the document
    async fn insert_at_document_end(&self, document: &SourceDocument, text: &str) -> Option<SourceDocument>;

    /// Insert `text` at the start of a container body
    async fn insert_at_container_start(
        &self,
        document: &SourceDocument,
        container: NodeId,
        text: &str,
    ) -> Option<SourceDocument>;

    /// Insert `text` at the end of a container body
    async fn insert_at_container_end(
        &self,
        document: &SourceDocument,
        container: NodeId,
        text: &str,
    ) -> Option<SourceDocument>;

    /// Replace the full text of `node`
    async fn replace(&self, document: &SourceDocument, node: NodeId, text: &str) -> Option<SourceDocument>;

    /// Remove `node`
    async fn delete(&self, document: &SourceDocument, node: NodeId) -> Option<SourceDocument>;

    /// Add an import directive
    async fn add_import(
        &self,
        document: &SourceDocument,
        namespace: &str,
        alias: Option<&str>,
    ) -> Option<SourceDocument>;

    /// Locate a container by lookup path
    fn resolve_container(&self, document: &SourceDocument, path: &LookupPath) -> Option<NodeId> {
        document.resolve(path)
    }

    /// Dispatch an [`Edit`] to the primitive operations
    async fn apply(&self, document: &SourceDocument, edit: &Edit) -> Option<SourceDocument> {
        match edit {
            Edit::Insert { anchor, text } => match *anchor {
                Anchor::Before(id) => self.insert_before(document, id, text).await,
                Anchor::After(id) => self.insert_after(document, id, text).await,
                Anchor::DocumentStart => self.insert_at_document_start(document, text).await,
                Anchor::DocumentEnd => self.insert_at_document_end(document, text).await,
                Anchor::ContainerStart(id) => self.insert_at_container_start(document, id, text).await,
                Anchor::ContainerEnd(id) => self.insert_at_container_end(document, id, text).await,
            },
            Edit::Replace { node, text } => self.replace(document, *node, text).await,
            Edit::Delete { node } => self.delete(document, *node).await,
            Edit::AddImport { namespace, alias } => {
                self.add_import(document, namespace, alias.as_deref()).await
            }
        }
    }
}
