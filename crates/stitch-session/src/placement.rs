//! Insertion-point resolution
//!
//! New syntax is placed by category along a fixed chain:
//!
//! ```text
//! imports → fields → constructors → properties → events → methods →
//! nested enums → nested interfaces → nested structures → nested classes
//! ```
//!
//! "Before C" anchors before the first member of C and "after C" after the
//! last one. Only members parsed from the document being edited count. When
//! C has none, the request is redirected to "after" the previous category,
//! ending at the container body start (or the document start for imports).

use serde::{Deserialize, Serialize};
use stitch_model::{Anchor, MemberCategory, NodeId, SourceDocument};

/// Placement switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    /// Let nested classes anchor "after" placements when they come from the
    /// edited document, whatever their load origin
    pub legacy_nested_class_anchor: bool,
}

/// Resolves anchors for one container in one snapshot
#[derive(Debug, Clone, Copy)]
pub struct InsertionPointResolver<'d> {
    document: &'d SourceDocument,
    container: NodeId,
    options: PlacementOptions,
}

impl<'d> InsertionPointResolver<'d> {
    /// Resolver for `container` in `document`
    #[must_use]
    pub fn new(document: &'d SourceDocument, container: NodeId, options: PlacementOptions) -> Self {
        Self {
            document,
            container,
            options,
        }
    }

    /// Members of `category` that may serve as anchors, in source order
    #[must_use]
    pub fn anchors(&self, category: MemberCategory, after: bool) -> Vec<NodeId> {
        let doc_id = self.document.id();
        let legacy = after && self.options.legacy_nested_class_anchor && category == MemberCategory::NestedClasses;
        self.document
            .members_in(self.container, category)
            .into_iter()
            .filter(|(_, node)| {
                if legacy {
                    &node.origin.document == doc_id
                } else {
                    node.is_local_to(doc_id)
                }
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Anchor for placing new syntax before the first member of `category`
    #[must_use]
    pub fn resolve_before(&self, category: MemberCategory) -> Anchor {
        if let Some(&first) = self.anchors(category, false).first() {
            return Anchor::Before(first);
        }
        tracing::trace!(%category, "no anchor for before-placement, redirecting");
        self.fallback(category)
    }

    /// Anchor for placing new syntax after the last member of `category`
    #[must_use]
    pub fn resolve_after(&self, category: MemberCategory) -> Anchor {
        if let Some(&last) = self.anchors(category, true).last() {
            return Anchor::After(last);
        }
        tracing::trace!(%category, "no anchor for after-placement, redirecting");
        self.fallback(category)
    }

    fn fallback(&self, category: MemberCategory) -> Anchor {
        match category {
            MemberCategory::Imports => Anchor::DocumentStart,
            MemberCategory::Fields => Anchor::ContainerStart(self.container),
            _ => match category.previous() {
                Some(previous) => self.resolve_after(previous),
                None => Anchor::ContainerStart(self.container),
            },
        }
    }
}
