//! Immutable source snapshots
//!
//! A [`SourceDocument`] pairs program text with the structural tree derived
//! from it. Snapshots are never mutated: every edit produces a new one, and
//! holders re-resolve their containers through a [`LookupPath`].

use crate::error::ModelError;
use crate::hash::ContentHash;
use crate::node::{DocumentId, MemberCategory, Node, NodeId, NodeKind, Origin, Span};
use crate::path::LookupPath;
use std::sync::Arc;

/// Immutable snapshot of program text plus its structural tree
///
/// # Invariants
/// - `hash` is always the Blake3 hash of `text`
/// - every node span lies within `text`
/// - every member node has a container parent
///
/// Cheap to clone (shared inner data).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    inner: Arc<DocumentData>,
}

#[derive(Debug, PartialEq)]
struct DocumentData {
    id: DocumentId,
    text: String,
    hash: ContentHash,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    imports: Vec<NodeId>,
}

impl SourceDocument {
    /// Start building a snapshot for `text`
    #[inline]
    #[must_use]
    pub fn builder(id: DocumentId, text: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(id, text)
    }

    /// Physical document identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &DocumentId {
        &self.inner.id
    }

    /// Program text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.inner.text
    }

    /// Hash of the program text
    #[inline]
    #[must_use]
    pub fn hash(&self) -> ContentHash {
        self.inner.hash
    }

    /// Node by id
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.inner.nodes.get(id.index())
    }

    /// Number of nodes in the arena
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    /// Top-level containers in source order
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.inner.roots
    }

    /// Import directives in source order
    #[inline]
    #[must_use]
    pub fn import_ids(&self) -> &[NodeId] {
        &self.inner.imports
    }

    /// Import nodes in source order
    pub fn imports(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.inner
            .imports
            .iter()
            .filter_map(move |&id| self.node(id).map(|n| (id, n)))
    }

    /// Text covered by a span (empty if out of range)
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        self.inner.text.get(span.start..span.end).unwrap_or("")
    }

    /// Text of a node
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> &str {
        self.node(id).map_or("", |n| self.slice(n.span))
    }

    /// Direct children of a container, in source order
    pub fn children(&self, container: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        self.node(container)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&id| self.node(id).map(|n| (id, n)))
    }

    /// Children of a container in one category, in source order
    ///
    /// For [`MemberCategory::Imports`] this yields the document imports.
    #[must_use]
    pub fn members_in(&self, container: NodeId, category: MemberCategory) -> Vec<(NodeId, &Node)> {
        if category.is_document_scoped() {
            return self.imports().collect();
        }
        self.children(container)
            .filter(|(_, n)| n.category() == category)
            .collect()
    }

    /// Namespace-qualified name of a container
    #[must_use]
    pub fn qualified_name(&self, id: NodeId) -> Option<String> {
        let node = self.node(id)?;
        Some(match &node.namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}.{}", node.name),
            _ => node.name.clone(),
        })
    }

    /// Resolve a lookup path to a container in this snapshot
    #[must_use]
    pub fn resolve(&self, path: &LookupPath) -> Option<NodeId> {
        let mut segments = path.iter();
        let first = segments.next()?;

        let mut current = self.inner.roots.iter().copied().find(|&id| {
            self.qualified_name(id).as_deref() == Some(first)
        })?;

        for segment in segments {
            current = self
                .children(current)
                .find(|(_, n)| n.container_kind().is_some() && n.name == segment)
                .map(|(id, _)| id)?;
        }

        Some(current)
    }

    /// Lookup path of a container in this snapshot
    #[must_use]
    pub fn lookup_path(&self, id: NodeId) -> Option<LookupPath> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            node.container_kind()?;
            chain.push(current);
            cursor = node.parent;
        }
        chain.reverse();

        let mut segments = Vec::with_capacity(chain.len());
        for (i, &node_id) in chain.iter().enumerate() {
            if i == 0 {
                segments.push(self.qualified_name(node_id)?);
            } else {
                segments.push(self.node(node_id)?.name.clone());
            }
        }
        Some(LookupPath::new(segments))
    }

    /// Containers in the whole document, depth first
    #[must_use]
    pub fn containers(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.inner.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            let nested: Vec<NodeId> = self
                .children(id)
                .filter(|(_, n)| n.container_kind().is_some())
                .map(|(child, _)| child)
                .collect();
            stack.extend(nested.into_iter().rev());
        }
        out
    }
}

/// Builder for [`SourceDocument`] snapshots
///
/// Used by parsers at the model boundary; validates structure on `build`.
#[derive(Debug)]
pub struct DocumentBuilder {
    id: DocumentId,
    text: String,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    imports: Vec<NodeId>,
}

impl DocumentBuilder {
    /// Empty builder for `text`
    #[must_use]
    pub fn new(id: DocumentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            nodes: Vec::new(),
            roots: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Document identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Origin for elements parsed from this document
    #[inline]
    #[must_use]
    pub fn local_origin(&self) -> Origin {
        Origin::source(self.id.clone())
    }

    /// Add an import directive
    ///
    /// # Errors
    /// Returns error if the span lies outside the text
    pub fn add_import(
        &mut self,
        namespace: impl Into<String>,
        alias: Option<String>,
        span: Span,
    ) -> Result<NodeId, ModelError> {
        let mut node = Node::new(NodeKind::Import, namespace, span, self.local_origin());
        node.alias = alias;
        self.add_node(None, node)
    }

    /// Add a node under `parent` (or at top level)
    ///
    /// # Errors
    /// - `SpanOutOfBounds` if the span lies outside the text
    /// - `UnknownParent` / `NotAContainer` if `parent` is invalid
    /// - `OrphanMember` if a member has no parent
    pub fn add_node(&mut self, parent: Option<NodeId>, mut node: Node) -> Result<NodeId, ModelError> {
        let len = self.text.len();
        if node.span.end > len || node.span.start > node.span.end {
            return Err(ModelError::SpanOutOfBounds { span: node.span, len });
        }
        if let Some(body) = node.body {
            if body.end > len || body.start > body.end {
                return Err(ModelError::SpanOutOfBounds { span: body, len });
            }
        }

        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| ModelError::ArenaFull)?);

        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent_id.index())
                    .ok_or(ModelError::UnknownParent(parent_id))?;
                if parent_node.container_kind().is_none() {
                    return Err(ModelError::NotAContainer(parent_id));
                }
                parent_node.children.push(id);
            }
            None => match node.kind {
                NodeKind::Import => self.imports.push(id),
                NodeKind::Container(_) => self.roots.push(id),
                NodeKind::Member(_) => return Err(ModelError::OrphanMember(node.name)),
            },
        }

        node.parent = parent;
        self.nodes.push(node);
        Ok(id)
    }

    /// Mutable access to a node added earlier (e.g. to close its span)
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Finish the snapshot
    ///
    /// # Errors
    /// Returns error if a node span was widened past the text
    pub fn build(self) -> Result<SourceDocument, ModelError> {
        let len = self.text.len();
        if let Some(bad) = self.nodes.iter().find(|n| n.span.end > len) {
            return Err(ModelError::SpanOutOfBounds { span: bad.span, len });
        }

        let hash = ContentHash::compute(self.text.as_bytes());
        Ok(SourceDocument {
            inner: Arc::new(DocumentData {
                id: self.id,
                text: self.text,
                hash,
                nodes: self.nodes,
                roots: self.roots,
                imports: self.imports,
            }),
        })
    }
}
