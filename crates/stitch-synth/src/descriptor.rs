//! Member descriptors and synthesis requests

use stitch_model::{Attribute, GenericParameter, Parameter, Signature, TypeRef, Visibility};
use stitch_policy::LogLevel;

/// XML documentation for a generated member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    /// `<summary>` text, or a block that already starts with `///`
    pub summary: String,
    /// `<param>` entries, in order
    pub params: Vec<(String, String)>,
    /// `<returns>` text
    pub returns: Option<String>,
}

impl Documentation {
    /// Documentation with a summary only
    #[must_use]
    pub fn summary(text: impl Into<String>) -> Self {
        Self {
            summary: text.into(),
            ..Self::default()
        }
    }

    /// Add a `<param>` entry
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.params.push((name.into(), text.into()));
        self
    }

    /// Set the `<returns>` text
    #[must_use]
    pub fn with_returns(mut self, text: impl Into<String>) -> Self {
        self.returns = Some(text.into());
        self
    }

    /// True if the summary is already rendered comment text
    #[inline]
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.summary.trim_start().starts_with("///")
    }
}

/// A method to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Generic parameters, parameters and return type
    pub signature: Signature,
    /// Applied attributes
    pub attributes: Vec<Attribute>,
    /// Leading documentation
    pub documentation: Option<Documentation>,
    /// `static` modifier
    pub is_static: bool,
}

impl MethodDescriptor {
    /// Parameterless method returning `return_type`
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            signature: Signature::new(Vec::new(), return_type),
            attributes: Vec::new(),
            documentation: None,
            is_static: false,
        }
    }

    /// Append a parameter
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.signature.parameters.push(parameter);
        self
    }

    /// Append a generic parameter
    #[must_use]
    pub fn with_generic(mut self, parameter: GenericParameter) -> Self {
        self.signature.generic_parameters.push(parameter);
        self
    }

    /// Append an attribute
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set documentation
    #[must_use]
    pub fn with_documentation(mut self, documentation: Documentation) -> Self {
        self.documentation = Some(documentation);
        self
    }

    /// Mark `static`
    #[must_use]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Types mentioned by the method, in import order
    ///
    /// Generic constraint types first, then attribute types, parameter
    /// types and the return type.
    #[must_use]
    pub fn referenced_types(&self) -> Vec<&TypeRef> {
        let sig = &self.signature;
        sig.generic_parameters
            .iter()
            .flat_map(GenericParameter::constraint_types)
            .chain(self.attributes.iter().map(|a| &a.type_ref))
            .chain(sig.parameters.iter().map(|p| &p.type_ref))
            .chain(std::iter::once(&sig.return_type))
            .collect()
    }
}

/// A property to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Property type
    pub type_ref: TypeRef,
    /// Has a getter
    pub getter: bool,
    /// Has a setter
    pub setter: bool,
    /// Applied attributes
    pub attributes: Vec<Attribute>,
    /// Leading documentation
    pub documentation: Option<Documentation>,
}

impl PropertyDescriptor {
    /// Read-write property
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            getter: true,
            setter: true,
            attributes: Vec::new(),
            documentation: None,
        }
    }

    /// Drop the setter
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.setter = false;
        self
    }

    /// Set documentation
    #[must_use]
    pub fn with_documentation(mut self, documentation: Documentation) -> Self {
        self.documentation = Some(documentation);
        self
    }

    /// Append an attribute
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Number of accessors
    #[must_use]
    pub fn accessor_count(&self) -> usize {
        usize::from(self.getter) + usize::from(self.setter)
    }
}

/// A field to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Base name, before the naming transform
    pub name: String,
    /// Field type
    pub type_ref: TypeRef,
    /// Initializer expression
    pub default_value: Option<String>,
    /// `static`
    pub is_static: bool,
    /// `const`; overrides `static` and `readonly`
    pub is_const: bool,
    /// `readonly`
    pub is_readonly: bool,
    /// `<summary>` text
    pub summary: Option<String>,
}

impl FieldDescriptor {
    /// Plain instance field
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            default_value: None,
            is_static: false,
            is_const: false,
            is_readonly: false,
            summary: None,
        }
    }

    /// Set the initializer
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Mark `readonly`
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    /// Mark `static`
    #[must_use]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark `const`
    #[must_use]
    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    /// Set the summary
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// An event to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    /// Event name
    pub name: String,
    /// Delegate type
    pub type_ref: TypeRef,
    /// Leading documentation
    pub documentation: Option<Documentation>,
}

impl EventDescriptor {
    /// Event of delegate type `type_ref`
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            documentation: None,
        }
    }
}

/// Method synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRequest {
    /// What to generate
    pub descriptor: MethodDescriptor,
    /// Member indentation; derived from the container when absent
    pub indent: Option<String>,
    /// Level for entry and exit log lines; configured default when absent
    pub level: Option<LogLevel>,
    /// Target visibility (mandatory outside interfaces)
    pub visibility: Option<Visibility>,
    /// Overwrite an existing member with the same identity
    pub replace: bool,
}

impl MethodRequest {
    /// Insert-only request with the given visibility
    #[must_use]
    pub fn new(descriptor: MethodDescriptor, visibility: Option<Visibility>) -> Self {
        Self {
            descriptor,
            indent: None,
            level: None,
            visibility,
            replace: false,
        }
    }

    /// Overwrite an existing member
    #[must_use]
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Set the member indentation
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Set the entry/exit log level
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }
}

/// Property synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRequest {
    /// What to generate
    pub descriptor: PropertyDescriptor,
    /// Member indentation; derived from the container when absent
    pub indent: Option<String>,
    /// Target visibility (mandatory outside interfaces)
    pub visibility: Option<Visibility>,
    /// Overwrite an existing property with the same name
    pub replace: bool,
}

impl PropertyRequest {
    /// Insert-only request
    #[must_use]
    pub fn new(descriptor: PropertyDescriptor, visibility: Option<Visibility>) -> Self {
        Self {
            descriptor,
            indent: None,
            visibility,
            replace: false,
        }
    }

    /// Overwrite an existing property
    #[must_use]
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }
}

/// Field synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    /// What to generate
    pub descriptor: FieldDescriptor,
    /// Member indentation; derived from the container when absent
    pub indent: Option<String>,
    /// Target visibility
    pub visibility: Option<Visibility>,
}

impl FieldRequest {
    /// Request with the given visibility
    #[must_use]
    pub fn new(descriptor: FieldDescriptor, visibility: Option<Visibility>) -> Self {
        Self {
            descriptor,
            indent: None,
            visibility,
        }
    }
}

/// Event synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    /// What to generate
    pub descriptor: EventDescriptor,
    /// Member indentation; derived from the container when absent
    pub indent: Option<String>,
    /// Target visibility (mandatory outside interfaces)
    pub visibility: Option<Visibility>,
}

impl EventRequest {
    /// Request with the given visibility
    #[must_use]
    pub fn new(descriptor: EventDescriptor, visibility: Option<Visibility>) -> Self {
        Self {
            descriptor,
            indent: None,
            visibility,
        }
    }
}

/// Any synthesis request, for batches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRequest {
    /// A method
    Method(MethodRequest),
    /// A property
    Property(PropertyRequest),
    /// A field
    Field(FieldRequest),
    /// An event
    Event(EventRequest),
}

impl MemberRequest {
    /// Name of the requested member
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Method(r) => &r.descriptor.name,
            Self::Property(r) => &r.descriptor.name,
            Self::Field(r) => &r.descriptor.name,
            Self::Event(r) => &r.descriptor.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitch_model::GenericConstraint;

    #[test]
    fn referenced_types_follow_import_order() {
        let method = MethodDescriptor::new("Find", TypeRef::reference("Acme.Orders", "Order"))
            .with_generic(
                GenericParameter::new("T").with_constraint(GenericConstraint::Type(TypeRef::reference(
                    "Acme.Core",
                    "IEntity",
                ))),
            )
            .with_attribute(Attribute::new(TypeRef::reference("System.Diagnostics", "DebuggerStepThrough")))
            .with_parameter(Parameter::new("id", TypeRef::value("System", "Guid")));

        let names: Vec<&str> = method.referenced_types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["IEntity", "DebuggerStepThrough", "Guid", "Order"]);
    }

    #[test]
    fn rendered_documentation_is_detected() {
        assert!(Documentation::summary("/// <summary>x</summary>").is_rendered());
        assert!(!Documentation::summary("Finds an order.").is_rendered());
    }
}
