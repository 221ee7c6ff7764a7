//! Bounds-check policies
//!
//! A bounds-check policy decides whether a guard clause applies to a
//! parameter and renders it. Policies are tried in configured order and the
//! first one that applies wins; see [`first_applicable`].

use crate::context::{render_block, MethodContext};
use crate::logging::LogLevel;
use std::fmt::Debug;
use std::sync::Arc;
use stitch_model::{Parameter, ParameterModifier, TypeRef};

/// Guard-clause generator for one validation rule
pub trait BoundsCheckPolicy: Send + Sync + Debug {
    /// Stable policy name
    fn name(&self) -> &'static str;

    /// Whether the guard is still emitted for parameters with a default value
    fn applies_when_default_value_present(&self) -> bool {
        false
    }

    /// Namespaces the generated guard depends on
    fn required_namespaces(&self) -> Vec<String>;

    /// Render the guard for `parameter`, or `None` if the rule does not apply
    fn generate(&self, ctx: &MethodContext<'_>, parameter: &Parameter) -> Option<String>;
}

/// First applicable policy for a parameter, with the guard it rendered
///
/// Policies are tried in slice order. A policy is skipped for parameters
/// carrying a default value unless it opts in.
#[must_use]
pub fn first_applicable<'p>(
    policies: &'p [Arc<dyn BoundsCheckPolicy>],
    ctx: &MethodContext<'_>,
    parameter: &Parameter,
) -> Option<(&'p Arc<dyn BoundsCheckPolicy>, String)> {
    policies.iter().find_map(|policy| {
        if parameter.has_default() && !policy.applies_when_default_value_present() {
            return None;
        }
        policy.generate(ctx, parameter).map(|text| (policy, text))
    })
}

fn guards_input(parameter: &Parameter) -> bool {
    parameter.modifier != ParameterModifier::Out
}

fn namespaces_of(exception: &TypeRef) -> Vec<String> {
    exception.namespace.iter().cloned().collect()
}

fn guard(
    ctx: &MethodContext<'_>,
    log_level: LogLevel,
    condition: String,
    message: String,
    throw: String,
) -> String {
    let mut body = Vec::with_capacity(2);
    if let Some(line) = ctx.log(log_level, &message, None) {
        body.push(line);
    }
    body.push(throw);
    render_block(ctx, &format!("if ({condition})"), &body)
}

/// Throws when a nullable parameter is null
#[derive(Debug, Clone)]
pub struct NullCheckPolicy {
    exception: TypeRef,
    log_level: LogLevel,
}

impl NullCheckPolicy {
    /// Guard throwing `exception(nameof(param))`
    #[must_use]
    pub fn new(exception: TypeRef) -> Self {
        Self {
            exception,
            log_level: LogLevel::Warning,
        }
    }

    /// Level of the log line preceding the throw
    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for NullCheckPolicy {
    fn default() -> Self {
        Self::new(TypeRef::reference("System", "ArgumentNullException"))
    }
}

impl BoundsCheckPolicy for NullCheckPolicy {
    fn name(&self) -> &'static str {
        "null_check"
    }

    fn required_namespaces(&self) -> Vec<String> {
        namespaces_of(&self.exception)
    }

    fn generate(&self, ctx: &MethodContext<'_>, parameter: &Parameter) -> Option<String> {
        if !guards_input(parameter) || !parameter.type_ref.accepts_null() {
            return None;
        }
        let name = &parameter.name;
        Some(guard(
            ctx,
            self.log_level,
            format!("{name} == null"),
            format!("Parameter '{name}' of {} was null", ctx.member_name),
            format!("throw new {}(nameof({name}));", ctx.type_name(&self.exception)),
        ))
    }
}

/// Throws when a string parameter is null or empty
#[derive(Debug, Clone)]
pub struct StringNullOrEmptyPolicy {
    exception: TypeRef,
    log_level: LogLevel,
}

impl StringNullOrEmptyPolicy {
    /// Guard throwing `exception(message, nameof(param))`
    #[must_use]
    pub fn new(exception: TypeRef) -> Self {
        Self {
            exception,
            log_level: LogLevel::Warning,
        }
    }
}

impl Default for StringNullOrEmptyPolicy {
    fn default() -> Self {
        Self::new(TypeRef::reference("System", "ArgumentException"))
    }
}

impl BoundsCheckPolicy for StringNullOrEmptyPolicy {
    fn name(&self) -> &'static str {
        "string_null_or_empty"
    }

    fn required_namespaces(&self) -> Vec<String> {
        namespaces_of(&self.exception)
    }

    fn generate(&self, ctx: &MethodContext<'_>, parameter: &Parameter) -> Option<String> {
        if !guards_input(parameter) || !parameter.type_ref.is_string() {
            return None;
        }
        let name = &parameter.name;
        Some(guard(
            ctx,
            self.log_level,
            format!("string.IsNullOrEmpty({name})"),
            format!("Parameter '{name}' of {} was null or empty", ctx.member_name),
            format!(
                "throw new {}(\"Value cannot be null or empty.\", nameof({name}));",
                ctx.type_name(&self.exception)
            ),
        ))
    }
}

/// Throws when a string parameter is null, empty or whitespace
#[derive(Debug, Clone)]
pub struct StringNullOrWhitespacePolicy {
    exception: TypeRef,
    log_level: LogLevel,
}

impl StringNullOrWhitespacePolicy {
    /// Guard throwing `exception(message, nameof(param))`
    #[must_use]
    pub fn new(exception: TypeRef) -> Self {
        Self {
            exception,
            log_level: LogLevel::Warning,
        }
    }
}

impl Default for StringNullOrWhitespacePolicy {
    fn default() -> Self {
        Self::new(TypeRef::reference("System", "ArgumentException"))
    }
}

impl BoundsCheckPolicy for StringNullOrWhitespacePolicy {
    fn name(&self) -> &'static str {
        "string_null_or_whitespace"
    }

    fn required_namespaces(&self) -> Vec<String> {
        namespaces_of(&self.exception)
    }

    fn generate(&self, ctx: &MethodContext<'_>, parameter: &Parameter) -> Option<String> {
        if !guards_input(parameter) || !parameter.type_ref.is_string() {
            return None;
        }
        let name = &parameter.name;
        Some(guard(
            ctx,
            self.log_level,
            format!("string.IsNullOrWhiteSpace({name})"),
            format!("Parameter '{name}' of {} was null or whitespace", ctx.member_name),
            format!(
                "throw new {}(\"Value cannot be null or whitespace.\", nameof({name}));",
                ctx.type_name(&self.exception)
            ),
        ))
    }
}
