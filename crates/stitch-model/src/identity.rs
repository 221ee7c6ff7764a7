//! Member identity for duplicate detection
//!
//! Fields, properties and events are identified by declared name. Methods
//! and constructors are identified by a signature fingerprint covering the
//! name, ordered parameter types and return type. Formatting, documentation,
//! namespaces and parameter names never participate.

use crate::hash::ContentHash;
use crate::node::{MemberCategory, Node};
use crate::types::Signature;
use std::fmt::{self, Display, Formatter};

/// Structural identity of a member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberIdentity {
    /// Identified by name within a category
    Named {
        /// Category the name lives in
        category: MemberCategory,
        /// Declared name
        name: String,
    },
    /// Identified by signature fingerprint
    Signature(ContentHash),
}

impl MemberIdentity {
    /// Name-based identity
    #[must_use]
    pub fn named(category: MemberCategory, name: impl Into<String>) -> Self {
        Self::Named {
            category,
            name: name.into(),
        }
    }

    /// Fingerprint of a method signature
    #[must_use]
    pub fn of_method(name: &str, signature: &Signature) -> Self {
        Self::Signature(fingerprint(MemberCategory::Methods, name, signature))
    }

    /// Fingerprint of a constructor signature
    #[must_use]
    pub fn of_constructor(name: &str, signature: &Signature) -> Self {
        Self::Signature(fingerprint(MemberCategory::Constructors, name, signature))
    }

    /// Identity of an existing node, if it is an identifiable member
    #[must_use]
    pub fn of_node(node: &Node) -> Option<Self> {
        match node.category() {
            category @ (MemberCategory::Methods | MemberCategory::Constructors) => {
                let signature = node.signature.as_ref()?;
                Some(Self::Signature(fingerprint(category, &node.name, signature)))
            }
            category @ (MemberCategory::Fields | MemberCategory::Properties | MemberCategory::Events) => {
                Some(Self::named(category, node.name.clone()))
            }
            _ => None,
        }
    }

    /// True if `node` has this identity
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        Self::of_node(node).as_ref() == Some(self)
    }
}

impl Display for MemberIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { category, name } => write!(f, "{category}:{name}"),
            Self::Signature(hash) => write!(f, "sig:{}", hash.short()),
        }
    }
}

fn fingerprint(category: MemberCategory, name: &str, signature: &Signature) -> ContentHash {
    let mut parts = Vec::with_capacity(signature.parameters.len() + 3);
    parts.push(category.to_string());
    parts.push(name.to_string());
    parts.extend(signature.parameters.iter().map(|p| p.signature_type()));
    parts.push(signature.return_type.to_string());
    ContentHash::of_parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DocumentId, NodeKind, Origin, Span};
    use crate::types::{Parameter, ParameterModifier, TypeRef};

    fn sig(params: Vec<Parameter>, ret: TypeRef) -> Signature {
        Signature::new(params, ret)
    }

    #[test]
    fn parameter_names_and_namespaces_are_ignored() {
        let a = sig(
            vec![Parameter::new("c", TypeRef::reference("Acme", "Customer"))],
            TypeRef::void(),
        );
        let mut b_type = TypeRef::reference("Other", "Customer");
        b_type.namespace = None;
        let b = sig(vec![Parameter::new("customer", b_type)], TypeRef::void());
        assert_eq!(
            MemberIdentity::of_method("Process", &a),
            MemberIdentity::of_method("Process", &b)
        );
    }

    #[test]
    fn order_return_type_and_modifiers_matter() {
        let int = TypeRef::keyword("int");
        let s = TypeRef::keyword("string");
        let base = MemberIdentity::of_method(
            "Run",
            &sig(vec![Parameter::new("a", int.clone()), Parameter::new("b", s.clone())], TypeRef::void()),
        );
        let swapped = MemberIdentity::of_method(
            "Run",
            &sig(vec![Parameter::new("b", s.clone()), Parameter::new("a", int.clone())], TypeRef::void()),
        );
        let returns = MemberIdentity::of_method(
            "Run",
            &sig(vec![Parameter::new("a", int.clone()), Parameter::new("b", s.clone())], int.clone()),
        );
        let by_ref = MemberIdentity::of_method(
            "Run",
            &sig(
                vec![
                    Parameter::new("a", int.clone()).with_modifier(ParameterModifier::Ref),
                    Parameter::new("b", s),
                ],
                TypeRef::void(),
            ),
        );
        assert_ne!(base, swapped);
        assert_ne!(base, returns);
        assert_ne!(base, by_ref);
    }

    #[test]
    fn constructors_and_methods_do_not_collide() {
        let s = sig(vec![], TypeRef::void());
        assert_ne!(
            MemberIdentity::of_method("Widget", &s),
            MemberIdentity::of_constructor("Widget", &s)
        );
    }

    #[test]
    fn node_identity() {
        let origin = Origin::source(DocumentId::new("a.cs"));
        let field = Node::new(NodeKind::Member(MemberCategory::Fields), "_order", Span::new(0, 1), origin.clone());
        assert!(MemberIdentity::named(MemberCategory::Fields, "_order").matches(&field));
        assert!(!MemberIdentity::named(MemberCategory::Properties, "_order").matches(&field));

        let mut method = Node::new(NodeKind::Member(MemberCategory::Methods), "Run", Span::new(0, 1), origin);
        assert_eq!(MemberIdentity::of_node(&method), None);
        method.signature = Some(sig(vec![], TypeRef::void()));
        assert!(MemberIdentity::of_method("Run", &sig(vec![], TypeRef::void())).matches(&method));
    }
}
