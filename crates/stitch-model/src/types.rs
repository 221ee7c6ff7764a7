//! Type and member descriptors
//!
//! These are the value types exchanged across the type/member model
//! boundary: referenced types, parameters, generic parameters, attributes
//! and visibility. The external parser produces them for existing members;
//! callers produce them to describe members that should be synthesized.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Broad classification of a referenced type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Copy-semantics type (struct, enum, primitive)
    Value,
    /// Reference type (class, interface, delegate, string)
    #[default]
    Reference,
    /// Placeholder bound by a generic parameter (`T`)
    GenericParameter,
    /// No value (`void`)
    Void,
}

/// A referenced type
///
/// The namespace is the declaring namespace used for import resolution;
/// it never appears in rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Simple name, without namespace or type arguments
    pub name: String,
    /// Declaring namespace, if known
    #[serde(default)]
    pub namespace: Option<String>,
    /// Type arguments, in order
    #[serde(default)]
    pub args: Vec<TypeRef>,
    /// Classification
    #[serde(default)]
    pub kind: TypeKind,
    /// Nullable annotation (`int?`)
    #[serde(default)]
    pub nullable: bool,
    /// Array rank; 0 when not an array
    #[serde(default)]
    pub array_rank: u8,
    /// Asynchronous wrapper (`Task`, `Task<T>`, `ValueTask<T>`)
    #[serde(default)]
    pub awaitable: bool,
}

/// Result of unwrapping an asynchronous return type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncShape<'a> {
    /// Not an asynchronous wrapper
    NotAsync,
    /// Non-generic wrapper: completes without a value
    Completion,
    /// Single-layer generic wrapper around a value type
    Value(&'a TypeRef),
}

impl TypeRef {
    fn with_kind(namespace: Option<&str>, name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            args: Vec::new(),
            kind,
            nullable: false,
            array_rank: 0,
            awaitable: false,
        }
    }

    /// Reference type declared in `namespace`
    #[must_use]
    pub fn reference(namespace: &str, name: &str) -> Self {
        Self::with_kind(Some(namespace), name, TypeKind::Reference)
    }

    /// Value type declared in `namespace`
    #[must_use]
    pub fn value(namespace: &str, name: &str) -> Self {
        Self::with_kind(Some(namespace), name, TypeKind::Value)
    }

    /// Built-in keyword type (`int`, `string`, `bool`); never needs an import
    #[must_use]
    pub fn keyword(name: &str) -> Self {
        let kind = match name {
            "string" | "object" | "dynamic" => TypeKind::Reference,
            "void" => TypeKind::Void,
            _ => TypeKind::Value,
        };
        Self::with_kind(None, name, kind)
    }

    /// Generic placeholder (`T`)
    #[must_use]
    pub fn generic_parameter(name: &str) -> Self {
        Self::with_kind(None, name, TypeKind::GenericParameter)
    }

    /// `void`
    #[must_use]
    pub fn void() -> Self {
        Self::keyword("void")
    }

    /// Non-generic asynchronous completion (`Task`)
    #[must_use]
    pub fn task() -> Self {
        let mut ty = Self::reference("System.Threading.Tasks", "Task");
        ty.awaitable = true;
        ty
    }

    /// Generic asynchronous wrapper (`Task<inner>`)
    #[must_use]
    pub fn task_of(inner: TypeRef) -> Self {
        Self::task().with_args(vec![inner])
    }

    /// Replace type arguments
    #[must_use]
    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.args = args;
        self
    }

    /// Mark as nullable
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark as an array of the given rank
    #[must_use]
    pub fn array(mut self, rank: u8) -> Self {
        self.array_rank = rank;
        self
    }

    /// Mark as an asynchronous wrapper
    #[must_use]
    pub fn awaitable(mut self) -> Self {
        self.awaitable = true;
        self
    }

    /// True for `void`
    #[inline]
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    /// True for generic placeholders
    #[inline]
    #[must_use]
    pub fn is_generic_parameter(&self) -> bool {
        self.kind == TypeKind::GenericParameter
    }

    /// True when the type carries type arguments
    #[inline]
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// True for non-nullable value types (non-array)
    #[inline]
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.kind == TypeKind::Value && !self.nullable && self.array_rank == 0
    }

    /// True when a variable of this type can hold null
    #[inline]
    #[must_use]
    pub fn accepts_null(&self) -> bool {
        match self.kind {
            TypeKind::Reference => true,
            TypeKind::Value => self.nullable || self.array_rank > 0,
            TypeKind::GenericParameter | TypeKind::Void => false,
        }
    }

    /// True for the built-in string type
    #[inline]
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.array_rank == 0
            && (self.name == "string"
                || (self.name == "String" && self.namespace.as_deref() == Some("System")))
    }

    /// Unwrap a single layer of asynchronous wrapper
    #[must_use]
    pub fn async_shape(&self) -> AsyncShape<'_> {
        if !self.awaitable || self.array_rank > 0 {
            return AsyncShape::NotAsync;
        }
        match self.args.as_slice() {
            [] => AsyncShape::Completion,
            [inner] => AsyncShape::Value(inner),
            _ => AsyncShape::NotAsync,
        }
    }

    /// Render with the given name for the outermost type
    ///
    /// Used by callers that qualify names through an alias.
    #[must_use]
    pub fn display_with<F>(&self, name_of: &F) -> String
    where
        F: Fn(&TypeRef) -> String,
    {
        let mut out = name_of(self);
        if !self.args.is_empty() {
            out.push('<');
            let args: Vec<String> = self.args.iter().map(|a| a.display_with(name_of)).collect();
            out.push_str(&args.join(", "));
            out.push('>');
        }
        if self.nullable {
            out.push('?');
        }
        for _ in 0..self.array_rank {
            out.push_str("[]");
        }
        out
    }

    /// Every type reachable from this one, type arguments first
    #[must_use]
    pub fn walk(&self) -> Vec<&TypeRef> {
        let mut out = Vec::new();
        for arg in &self.args {
            out.extend(arg.walk());
        }
        out.push(self);
        out
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with(&|t: &TypeRef| t.name.clone()))
    }
}

/// Parameter passing modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParameterModifier {
    /// By value
    #[default]
    None,
    /// `ref`
    Ref,
    /// `out`
    Out,
    /// `in`
    In,
    /// `params`
    Params,
}

impl ParameterModifier {
    /// Keyword, if any
    #[inline]
    #[must_use]
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Ref => Some("ref"),
            Self::Out => Some("out"),
            Self::In => Some("in"),
            Self::Params => Some("params"),
        }
    }
}

/// A method or constructor parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Default value expression, as source text
    #[serde(default)]
    pub default_value: Option<String>,
    /// Passing modifier
    #[serde(default)]
    pub modifier: ParameterModifier,
}

impl Parameter {
    /// Plain by-value parameter
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            default_value: None,
            modifier: ParameterModifier::None,
        }
    }

    /// Attach a default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Attach a passing modifier
    #[must_use]
    pub fn with_modifier(mut self, modifier: ParameterModifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// True when a default value is declared
    #[inline]
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    /// Type text as it participates in a signature (`ref int`)
    #[must_use]
    pub fn signature_type(&self) -> String {
        match self.modifier.keyword() {
            Some(kw) => format!("{kw} {}", self.type_ref),
            None => self.type_ref.to_string(),
        }
    }
}

/// Constraint on a generic parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericConstraint {
    /// Must derive from / implement a type
    Type(TypeRef),
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `new()`
    New,
}

/// A generic parameter declaration (`T where T : IEntity`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericParameter {
    /// Placeholder name
    pub name: String,
    /// Constraints, in declaration order
    #[serde(default)]
    pub constraints: Vec<GenericConstraint>,
}

impl GenericParameter {
    /// Unconstrained parameter
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    /// Add a constraint
    #[must_use]
    pub fn with_constraint(mut self, constraint: GenericConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Types referenced by constraints
    pub fn constraint_types(&self) -> impl Iterator<Item = &TypeRef> {
        self.constraints.iter().filter_map(|c| match c {
            GenericConstraint::Type(t) => Some(t),
            _ => None,
        })
    }
}

/// An attribute applied to a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute type
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Positional/named arguments, as source text
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl Attribute {
    /// Attribute without arguments
    #[must_use]
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            arguments: Vec::new(),
        }
    }

    /// Attach an argument
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }
}

/// Declared accessibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `public`
    Public,
    /// `internal`
    Internal,
    /// `protected`
    Protected,
    /// `protected internal`
    ProtectedInternal,
    /// `private protected`
    PrivateProtected,
    /// `private`
    Private,
}

impl Visibility {
    /// Keyword text
    #[inline]
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Protected => "protected",
            Self::ProtectedInternal => "protected internal",
            Self::PrivateProtected => "private protected",
            Self::Private => "private",
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Signature of a method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Generic parameters, in order
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    /// Parameters, in order
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Return type; `void` for constructors
    pub return_type: TypeRef,
}

impl Signature {
    /// Signature returning `return_type` with the given parameters
    #[must_use]
    pub fn new(parameters: Vec<Parameter>, return_type: TypeRef) -> Self {
        Self {
            generic_parameters: Vec::new(),
            parameters,
            return_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_generics_nullability_and_arrays() {
        let list = TypeRef::reference("System.Collections.Generic", "List")
            .with_args(vec![TypeRef::reference("Acme", "Customer")]);
        assert_eq!(list.to_string(), "List<Customer>");
        assert_eq!(TypeRef::keyword("int").nullable().to_string(), "int?");
        assert_eq!(TypeRef::keyword("byte").array(1).to_string(), "byte[]");
    }

    #[test]
    fn async_shape_unwraps_one_layer() {
        assert_eq!(TypeRef::keyword("int").async_shape(), AsyncShape::NotAsync);
        assert_eq!(TypeRef::task().async_shape(), AsyncShape::Completion);

        let inner = TypeRef::task_of(TypeRef::keyword("int"));
        let wrapped = TypeRef::task_of(inner.clone());
        assert_eq!(wrapped.async_shape(), AsyncShape::Value(&inner));
    }

    #[test]
    fn null_acceptance_by_kind() {
        assert!(TypeRef::reference("Acme", "Customer").accepts_null());
        assert!(TypeRef::keyword("string").accepts_null());
        assert!(!TypeRef::keyword("int").accepts_null());
        assert!(TypeRef::keyword("int").nullable().accepts_null());
        assert!(!TypeRef::generic_parameter("T").accepts_null());
    }

    #[test]
    fn walk_visits_arguments_before_outer_type() {
        let ty = TypeRef::reference("System.Collections.Generic", "Dictionary").with_args(vec![
            TypeRef::keyword("string"),
            TypeRef::reference("Acme", "Order"),
        ]);
        let names: Vec<&str> = ty.walk().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["string", "Order", "Dictionary"]);
    }

    #[test]
    fn parameter_signature_type_includes_modifier() {
        let p = Parameter::new("count", TypeRef::keyword("int")).with_modifier(ParameterModifier::Ref);
        assert_eq!(p.signature_type(), "ref int");
        assert_eq!(Parameter::new("c", TypeRef::keyword("int")).signature_type(), "int");
    }

    #[test]
    fn string_detection() {
        assert!(TypeRef::keyword("string").is_string());
        assert!(TypeRef::reference("System", "String").is_string());
        assert!(!TypeRef::reference("Acme", "String").is_string());
        assert!(!TypeRef::keyword("string").array(1).is_string());
    }
}
