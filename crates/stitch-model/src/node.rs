//! Structural nodes of a source snapshot
//!
//! Nodes live in an arena owned by a [`SourceDocument`](crate::SourceDocument)
//! and are addressed by [`NodeId`]. Ids are only meaningful for the snapshot
//! that produced them.

use crate::types::{Attribute, Signature, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Index of a node within one snapshot's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena slot
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a physical document (usually its path)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a document identity
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw identity
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open byte range into a snapshot's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    /// First byte
    pub start: usize,
    /// One past the last byte
    pub end: usize,
}

impl Span {
    /// New span
    #[inline]
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for zero-length spans
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Where a model element came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    /// Parsed from a physical document, as opposed to a compiled-only view
    pub loaded_from_source: bool,
    /// Document the element was parsed from
    pub document: DocumentId,
}

impl Origin {
    /// Element parsed from `document`
    #[must_use]
    pub fn source(document: DocumentId) -> Self {
        Self {
            loaded_from_source: true,
            document,
        }
    }

    /// Element only known from metadata, attributed to `document`
    #[must_use]
    pub fn metadata(document: DocumentId) -> Self {
        Self {
            loaded_from_source: false,
            document,
        }
    }
}

/// Kind of type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `struct`
    Structure,
    /// `enum`
    Enum,
}

impl ContainerKind {
    /// Category this kind occupies when nested inside another container
    #[inline]
    #[must_use]
    pub fn nested_category(self) -> MemberCategory {
        match self {
            Self::Class => MemberCategory::NestedClasses,
            Self::Interface => MemberCategory::NestedInterfaces,
            Self::Structure => MemberCategory::NestedStructures,
            Self::Enum => MemberCategory::NestedEnums,
        }
    }

    /// Declaration keyword
    #[inline]
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Structure => "struct",
            Self::Enum => "enum",
        }
    }
}

/// Syntactic category of container content, in placement order
///
/// The declaration order of the variants is the fallback chain used when
/// resolving insertion points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberCategory {
    /// Import directives (document scoped)
    Imports,
    /// Fields
    Fields,
    /// Constructors
    Constructors,
    /// Properties
    Properties,
    /// Events
    Events,
    /// Methods
    Methods,
    /// Nested enums
    NestedEnums,
    /// Nested interfaces
    NestedInterfaces,
    /// Nested structures
    NestedStructures,
    /// Nested classes
    NestedClasses,
}

impl MemberCategory {
    /// The fixed precedence chain
    pub const CHAIN: [Self; 10] = [
        Self::Imports,
        Self::Fields,
        Self::Constructors,
        Self::Properties,
        Self::Events,
        Self::Methods,
        Self::NestedEnums,
        Self::NestedInterfaces,
        Self::NestedStructures,
        Self::NestedClasses,
    ];

    /// Position in the chain
    #[inline]
    #[must_use]
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Category one step up the chain
    #[inline]
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.rank().checked_sub(1).map(|i| Self::CHAIN[i])
    }

    /// Category one step down the chain
    #[inline]
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::CHAIN.get(self.rank() + 1).copied()
    }

    /// True for the document-scoped import category
    #[inline]
    #[must_use]
    pub fn is_document_scoped(self) -> bool {
        self == Self::Imports
    }
}

impl Display for MemberCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Imports => "imports",
            Self::Fields => "fields",
            Self::Constructors => "constructors",
            Self::Properties => "properties",
            Self::Events => "events",
            Self::Methods => "methods",
            Self::NestedEnums => "nested enums",
            Self::NestedInterfaces => "nested interfaces",
            Self::NestedStructures => "nested structures",
            Self::NestedClasses => "nested classes",
        };
        f.write_str(name)
    }
}

/// What a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Import directive
    Import,
    /// Member of a container (field, constructor, property, event, method)
    Member(MemberCategory),
    /// Type definition
    Container(ContainerKind),
}

impl NodeKind {
    /// Placement category
    #[inline]
    #[must_use]
    pub fn category(self) -> MemberCategory {
        match self {
            Self::Import => MemberCategory::Imports,
            Self::Member(category) => category,
            Self::Container(kind) => kind.nested_category(),
        }
    }
}

/// A structural node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// What the node represents
    pub kind: NodeKind,
    /// Declared name; the namespace for imports
    pub name: String,
    /// Full extent, including leading docs and attributes
    pub span: Span,
    /// Extent of the body between braces (containers only)
    #[serde(default)]
    pub body: Option<Span>,
    /// Provenance
    pub origin: Origin,
    /// Enclosing container
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Members and nested containers, in source order
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Declaring namespace (containers)
    #[serde(default)]
    pub namespace: Option<String>,
    /// Alias of an aliased import
    #[serde(default)]
    pub alias: Option<String>,
    /// Signature (methods and constructors)
    #[serde(default)]
    pub signature: Option<Signature>,
    /// Declared type (fields, properties, events)
    #[serde(default)]
    pub type_ref: Option<TypeRef>,
    /// Applied attributes
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Leading documentation comment present
    #[serde(default)]
    pub has_documentation: bool,
}

impl Node {
    /// Bare node with everything optional left empty
    #[must_use]
    pub fn new(kind: NodeKind, name: impl Into<String>, span: Span, origin: Origin) -> Self {
        Self {
            kind,
            name: name.into(),
            span,
            body: None,
            origin,
            parent: None,
            children: Vec::new(),
            namespace: None,
            alias: None,
            signature: None,
            type_ref: None,
            attributes: Vec::new(),
            has_documentation: false,
        }
    }

    /// Placement category
    #[inline]
    #[must_use]
    pub fn category(&self) -> MemberCategory {
        self.kind.category()
    }

    /// Container kind, if this node is a type definition
    #[inline]
    #[must_use]
    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self.kind {
            NodeKind::Container(kind) => Some(kind),
            _ => None,
        }
    }

    /// True if parsed from the physical document `document`
    #[inline]
    #[must_use]
    pub fn is_local_to(&self, document: &DocumentId) -> bool {
        self.origin.loaded_from_source && &self.origin.document == document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_order_matches_variant_order() {
        for (i, category) in MemberCategory::CHAIN.iter().enumerate() {
            assert_eq!(category.rank(), i);
        }
        assert_eq!(MemberCategory::Imports.previous(), None);
        assert_eq!(MemberCategory::Properties.previous(), Some(MemberCategory::Constructors));
        assert_eq!(MemberCategory::NestedClasses.next(), None);
        assert_eq!(MemberCategory::Methods.next(), Some(MemberCategory::NestedEnums));
    }

    #[test]
    fn nested_container_categories() {
        assert_eq!(
            NodeKind::Container(ContainerKind::Enum).category(),
            MemberCategory::NestedEnums
        );
        assert_eq!(
            NodeKind::Container(ContainerKind::Class).category(),
            MemberCategory::NestedClasses
        );
        assert_eq!(NodeKind::Import.category(), MemberCategory::Imports);
    }

    #[test]
    fn locality_requires_source_origin_and_same_document() {
        let doc = DocumentId::new("OrderService.cs");
        let other = DocumentId::new("OrderService.Partial.cs");
        let span = Span::new(0, 1);

        let local = Node::new(NodeKind::Member(MemberCategory::Fields), "_a", span, Origin::source(doc.clone()));
        let metadata = Node::new(NodeKind::Member(MemberCategory::Fields), "_b", span, Origin::metadata(doc.clone()));
        let partial = Node::new(NodeKind::Member(MemberCategory::Fields), "_c", span, Origin::source(other));

        assert!(local.is_local_to(&doc));
        assert!(!metadata.is_local_to(&doc));
        assert!(!partial.is_local_to(&doc));
    }
}
