//! Text rendering for declarations
//!
//! Types are written with their simple name, or qualified by an alias when
//! the import table only makes the namespace visible through one.

use crate::descriptor::Documentation;
use stitch_model::{Attribute, GenericConstraint, GenericParameter, Parameter, TypeRef};
use stitch_policy::TypeNames;
use stitch_session::ImportTable;

#[derive(Debug)]
pub(crate) struct Renderer<'a> {
    imports: &'a ImportTable,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(imports: &'a ImportTable) -> Self {
        Self { imports }
    }

    pub(crate) fn type_name(&self, type_ref: &TypeRef) -> String {
        type_ref.display_with(&|t: &TypeRef| {
            match t.namespace.as_deref().and_then(|ns| self.imports.qualifier_for(ns)) {
                Some(alias) => format!("{alias}.{}", t.name),
                None => t.name.clone(),
            }
        })
    }

    pub(crate) fn documentation(&self, indent: &str, doc: &Documentation) -> String {
        let mut out = String::new();
        if doc.is_rendered() {
            for line in doc.summary.lines() {
                out.push_str(indent);
                out.push_str(line.trim_start());
                out.push('\n');
            }
            return out;
        }
        out.push_str(&format!("{indent}/// <summary>\n"));
        for line in doc.summary.lines() {
            out.push_str(&format!("{indent}/// {}\n", line.trim()));
        }
        out.push_str(&format!("{indent}/// </summary>\n"));
        for (name, text) in &doc.params {
            out.push_str(&format!("{indent}/// <param name=\"{name}\">{text}</param>\n"));
        }
        if let Some(returns) = &doc.returns {
            out.push_str(&format!("{indent}/// <returns>{returns}</returns>\n"));
        }
        out
    }

    pub(crate) fn summary(&self, indent: &str, summary: &str) -> String {
        self.documentation(indent, &Documentation::summary(summary))
    }

    pub(crate) fn attributes(&self, indent: &str, attributes: &[Attribute]) -> String {
        let mut out = String::new();
        for attribute in attributes {
            let full = self.type_name(&attribute.type_ref);
            let name = full
                .strip_suffix("Attribute")
                .filter(|n| !n.is_empty())
                .unwrap_or(full.as_str());
            if attribute.arguments.is_empty() {
                out.push_str(&format!("{indent}[{name}]\n"));
            } else {
                out.push_str(&format!("{indent}[{name}({})]\n", attribute.arguments.join(", ")));
            }
        }
        out
    }

    pub(crate) fn parameters(&self, parameters: &[Parameter]) -> String {
        let rendered: Vec<String> = parameters
            .iter()
            .map(|p| {
                let mut s = String::new();
                if let Some(keyword) = p.modifier.keyword() {
                    s.push_str(keyword);
                    s.push(' ');
                }
                s.push_str(&self.type_name(&p.type_ref));
                s.push(' ');
                s.push_str(&p.name);
                if let Some(value) = &p.default_value {
                    s.push_str(" = ");
                    s.push_str(value);
                }
                s
            })
            .collect();
        rendered.join(", ")
    }

    pub(crate) fn generic_list(generics: &[GenericParameter]) -> String {
        if generics.is_empty() {
            return String::new();
        }
        let names: Vec<&str> = generics.iter().map(|g| g.name.as_str()).collect();
        format!("<{}>", names.join(", "))
    }

    pub(crate) fn where_clauses(&self, generics: &[GenericParameter]) -> String {
        let mut out = String::new();
        for generic in generics.iter().filter(|g| !g.constraints.is_empty()) {
            let constraints: Vec<String> = generic
                .constraints
                .iter()
                .map(|c| match c {
                    GenericConstraint::Type(t) => self.type_name(t),
                    GenericConstraint::Class => "class".to_string(),
                    GenericConstraint::Struct => "struct".to_string(),
                    GenericConstraint::New => "new()".to_string(),
                })
                .collect();
            out.push_str(&format!(" where {} : {}", generic.name, constraints.join(", ")));
        }
        out
    }
}

impl TypeNames for Renderer<'_> {
    fn type_name(&self, type_ref: &TypeRef) -> String {
        Renderer::type_name(self, type_ref)
    }
}
