//! Error-handling block policies

use crate::context::{render_block, MethodContext};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use stitch_model::TypeRef;

/// Which clause of a try statement a policy emits
///
/// Member synthesis wraps the body in `try` itself and only emits
/// catch-kind policies after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// `try { }`
    Try,
    /// `catch (...) { }`
    Catch,
    /// `finally { }`
    Finally,
}

/// Generator for one exception-handling pattern
pub trait ErrorBlockPolicy: Send + Sync + Debug {
    /// Stable policy name
    fn name(&self) -> &'static str;

    /// Clause this policy emits
    fn kind(&self) -> BlockKind;

    /// Namespaces the generated block depends on
    fn required_namespaces(&self) -> Vec<String>;

    /// Render the block at `ctx.indent`
    fn generate(&self, ctx: &MethodContext<'_>) -> String;
}

/// Lets exceptions of a known type propagate unchanged
///
/// ```text
/// catch (ArgumentException)
/// {
///     throw;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RethrowCatchPolicy {
    exception: TypeRef,
}

impl RethrowCatchPolicy {
    /// Rethrow `exception` as is
    #[must_use]
    pub fn new(exception: TypeRef) -> Self {
        Self { exception }
    }
}

impl Default for RethrowCatchPolicy {
    fn default() -> Self {
        Self::new(TypeRef::reference("System", "ArgumentException"))
    }
}

impl ErrorBlockPolicy for RethrowCatchPolicy {
    fn name(&self) -> &'static str {
        "catch_rethrow_managed"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Catch
    }

    fn required_namespaces(&self) -> Vec<String> {
        self.exception.namespace.iter().cloned().collect()
    }

    fn generate(&self, ctx: &MethodContext<'_>) -> String {
        let header = format!("catch ({})", ctx.type_name(&self.exception));
        render_block(ctx, &header, &["throw;".to_string()])
    }
}

/// Logs any other exception and rethrows it wrapped
#[derive(Debug, Clone)]
pub struct WrapCatchPolicy {
    caught: TypeRef,
    wrapper: TypeRef,
    variable: String,
}

impl WrapCatchPolicy {
    /// Catch `caught` and throw `wrapper(message, inner)`
    #[must_use]
    pub fn new(caught: TypeRef, wrapper: TypeRef) -> Self {
        Self {
            caught,
            wrapper,
            variable: "unhandledException".to_string(),
        }
    }
}

impl Default for WrapCatchPolicy {
    fn default() -> Self {
        Self::new(
            TypeRef::reference("System", "Exception"),
            TypeRef::reference("System", "InvalidOperationException"),
        )
    }
}

impl ErrorBlockPolicy for WrapCatchPolicy {
    fn name(&self) -> &'static str {
        "catch_wrap_unhandled"
    }

    fn kind(&self) -> BlockKind {
        BlockKind::Catch
    }

    fn required_namespaces(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for ns in [&self.caught.namespace, &self.wrapper.namespace].into_iter().flatten() {
            if !out.contains(ns) {
                out.push(ns.clone());
            }
        }
        out
    }

    fn generate(&self, ctx: &MethodContext<'_>) -> String {
        let message = format!("Unhandled error in {}", ctx.member_name);
        let mut body = Vec::with_capacity(2);
        if let Some(line) = ctx.log(LogLevel::Error, &message, Some(&self.variable)) {
            body.push(line);
        }
        body.push(format!(
            "throw new {}(\"{}\", {});",
            ctx.type_name(&self.wrapper),
            crate::logging::escape_literal(&message),
            self.variable
        ));
        let header = format!("catch ({} {})", ctx.type_name(&self.caught), self.variable);
        render_block(ctx, &header, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::SerilogFormatter;
    use pretty_assertions::assert_eq;

    #[test]
    fn rethrow_block() {
        let ctx = MethodContext::new("Run", "    ", "    ");
        assert_eq!(
            RethrowCatchPolicy::default().generate(&ctx),
            "    catch (ArgumentException)\n    {\n        throw;\n    }\n"
        );
    }

    #[test]
    fn wrap_block_logs_before_throwing() {
        let f = SerilogFormatter::new("_log");
        let ctx = MethodContext::new("Run", "", "  ").with_formatter(Some(&f));
        assert_eq!(
            WrapCatchPolicy::default().generate(&ctx),
            "catch (Exception unhandledException)\n{\n  _log.Error(unhandledException, \"Unhandled error in Run\");\n  throw new InvalidOperationException(\"Unhandled error in Run\", unhandledException);\n}\n"
        );
    }

    #[test]
    fn wrap_namespaces_are_deduplicated() {
        assert_eq!(WrapCatchPolicy::default().required_namespaces(), vec!["System".to_string()]);
        assert_eq!(WrapCatchPolicy::default().kind(), BlockKind::Catch);
    }
}
