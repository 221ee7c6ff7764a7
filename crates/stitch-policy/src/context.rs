//! Per-member generation context handed to policies

use crate::logging::{LogLevel, LoggingFormatter};
use std::fmt::Debug;
use stitch_model::TypeRef;

/// Spells a type the way the target document can refer to it
pub trait TypeNames: Send + Sync + Debug {
    /// Name of `type_ref` as written in generated code
    fn type_name(&self, type_ref: &TypeRef) -> String;
}

/// What a policy needs to know about the member being generated
#[derive(Debug, Clone, Copy)]
pub struct MethodContext<'a> {
    /// Name of the member being generated
    pub member_name: &'a str,
    /// Indentation of statements at the position the policy emits into
    pub indent: &'a str,
    /// One level of indentation
    pub indent_unit: &'a str,
    /// Configured logging formatter, if any
    pub formatter: Option<&'a dyn LoggingFormatter>,
    /// Default level for generated log calls
    pub level: LogLevel,
    /// Import-aware type naming; simple names when absent
    pub type_names: Option<&'a dyn TypeNames>,
}

impl<'a> MethodContext<'a> {
    /// Context without logging
    #[must_use]
    pub fn new(member_name: &'a str, indent: &'a str, indent_unit: &'a str) -> Self {
        Self {
            member_name,
            indent,
            indent_unit,
            formatter: None,
            level: LogLevel::default(),
            type_names: None,
        }
    }

    /// Attach a logging formatter
    #[must_use]
    pub fn with_formatter(mut self, formatter: Option<&'a dyn LoggingFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Set the default log level
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Attach import-aware type naming
    #[must_use]
    pub fn with_type_names(mut self, type_names: &'a dyn TypeNames) -> Self {
        self.type_names = Some(type_names);
        self
    }

    /// How `type_ref` is written in the generated member
    #[must_use]
    pub fn type_name(&self, type_ref: &TypeRef) -> String {
        self.type_names
            .map_or_else(|| type_ref.to_string(), |names| names.type_name(type_ref))
    }

    /// Indentation one level deeper than [`Self::indent`]
    #[must_use]
    pub fn inner_indent(&self) -> String {
        format!("{}{}", self.indent, self.indent_unit)
    }

    /// Render a log statement, if a formatter is configured
    #[must_use]
    pub fn log(&self, level: LogLevel, message: &str, exception: Option<&str>) -> Option<String> {
        self.formatter.map(|f| f.format(level, message, exception))
    }
}

/// Render `{ body }` as an indented block under `header`
///
/// Every produced line ends with a newline.
pub(crate) fn render_block(ctx: &MethodContext<'_>, header: &str, body: &[String]) -> String {
    let inner = ctx.inner_indent();
    let mut out = format!("{indent}{header}\n{indent}{{\n", indent = ctx.indent);
    for line in body {
        out.push_str(&inner);
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(ctx.indent);
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::ExtensionsLoggingFormatter;

    #[test]
    fn block_rendering_indents_body() {
        let ctx = MethodContext::new("Run", "        ", "    ");
        let block = render_block(&ctx, "if (x == null)", &["throw;".to_string()]);
        assert_eq!(block, "        if (x == null)\n        {\n            throw;\n        }\n");
    }

    #[test]
    fn log_requires_formatter() {
        let ctx = MethodContext::new("Run", "", "    ");
        assert_eq!(ctx.log(LogLevel::Information, "m", None), None);

        let f = ExtensionsLoggingFormatter::new("_logger");
        let ctx = ctx.with_formatter(Some(&f));
        assert_eq!(
            ctx.log(LogLevel::Information, "m", None).as_deref(),
            Some("_logger.LogInformation(\"m\");")
        );
    }

    #[derive(Debug)]
    struct Aliased;

    impl TypeNames for Aliased {
        fn type_name(&self, type_ref: &TypeRef) -> String {
            format!("Sys.{}", type_ref.name)
        }
    }

    #[test]
    fn type_names_fall_back_to_simple_names() {
        let exception = TypeRef::reference("System", "ArgumentException");
        let ctx = MethodContext::new("Run", "", "    ");
        assert_eq!(ctx.type_name(&exception), "ArgumentException");
        assert_eq!(ctx.with_type_names(&Aliased).type_name(&exception), "Sys.ArgumentException");
    }
}
