//! Container type markers
//!
//! [`ContainerType`] is a sealed trait: only the markers defined here can
//! implement it. Sessions and synthesizers are generic over it so a session
//! opened for a class can never be bound to an interface.

use crate::node::ContainerKind;
use std::fmt::Debug;

/// Marker for a kind of type definition that can receive members
///
/// This trait is **sealed**.
pub trait ContainerType: Send + Sync + 'static + Debug + private::Sealed {
    /// Kind of container node this marker accepts
    const KIND: ContainerKind;

    /// True if members need an explicit visibility modifier
    #[must_use]
    fn requires_visibility() -> bool {
        true
    }

    /// True if members are declarations without bodies
    #[must_use]
    fn signature_only() -> bool {
        false
    }
}

#[doc(hidden)]
pub mod private {
    /// Sealed trait marker
    pub trait Sealed {}
}

/// `class`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Class;

/// `interface`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interface;

/// `struct`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure;

impl private::Sealed for Class {}
impl private::Sealed for Interface {}
impl private::Sealed for Structure {}

impl ContainerType for Class {
    const KIND: ContainerKind = ContainerKind::Class;
}

impl ContainerType for Interface {
    const KIND: ContainerKind = ContainerKind::Interface;

    fn requires_visibility() -> bool {
        false
    }

    fn signature_only() -> bool {
        true
    }
}

impl ContainerType for Structure {
    const KIND: ContainerKind = ContainerKind::Structure;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_members_are_declarations() {
        assert!(Interface::signature_only());
        assert!(!Interface::requires_visibility());
        assert!(!Class::signature_only());
        assert!(Structure::requires_visibility());
        assert_eq!(Structure::KIND, ContainerKind::Structure);
    }
}
