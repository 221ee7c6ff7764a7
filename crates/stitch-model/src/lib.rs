//! Stitch Model
//!
//! Immutable source snapshots and the boundary to the external text-mutation
//! service.
//!
//! # Core Concepts
//!
//! - [`SourceDocument`]: Program text plus its structural tree, never mutated
//! - [`Node`]: Arena node addressed by [`NodeId`] within one snapshot
//! - [`LookupPath`]: Stable address used to re-locate a container after an edit
//! - [`MemberIdentity`]: Structural fingerprint for duplicate detection
//! - [`TextMutationService`]: Applies edits and returns the next snapshot
//!
//! # Example
//!
//! ```rust,ignore
//! use stitch_model::{Anchor, Edit, LookupPath};
//!
//! let path = LookupPath::top_level("Acme.Orders.OrderService");
//! let container = document.resolve(&path).unwrap();
//! let next = service
//!     .apply(&document, &Edit::Insert { anchor: Anchor::ContainerStart(container), text })
//!     .await;
//! ```

#![warn(unreachable_pub)]

mod container;
mod document;
mod edit;
mod error;
mod hash;
mod identity;
mod node;
mod path;
mod service;
mod types;

pub use container::{Class, ContainerType, Interface, Structure};

/// Sealed trait support
#[doc(hidden)]
pub mod __private {
    pub use super::container::private::Sealed;
}

pub use document::{DocumentBuilder, SourceDocument};
pub use edit::{Anchor, Edit, EditRecord};
pub use error::ModelError;
pub use hash::{ContentHash, HashError};
pub use identity::MemberIdentity;
pub use node::{ContainerKind, DocumentId, MemberCategory, Node, NodeId, NodeKind, Origin, Span};
pub use path::{LookupPath, PathError};
pub use service::TextMutationService;
pub use types::{
    AsyncShape, Attribute, GenericConstraint, GenericParameter, Parameter, ParameterModifier, Signature, TypeKind,
    TypeRef, Visibility,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
