//! Policy registry
//!
//! Maps stable names to policy objects so synthesis configuration can name
//! its policies instead of constructing them.

use crate::bounds::{BoundsCheckPolicy, NullCheckPolicy, StringNullOrEmptyPolicy, StringNullOrWhitespacePolicy};
use crate::error::PolicyError;
use crate::error_block::{ErrorBlockPolicy, RethrowCatchPolicy, WrapCatchPolicy};
use crate::logging::{ExtensionsLoggingFormatter, LoggingFormatter, NLogFormatter, SerilogFormatter};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Builds a formatter for a logger field
pub type FormatterFactory = fn(&str) -> Arc<dyn LoggingFormatter>;

/// Registry of named policies
#[derive(Default, Clone)]
pub struct PolicyRegistry {
    bounds_checks: IndexMap<String, Arc<dyn BoundsCheckPolicy>>,
    error_blocks: IndexMap<String, Arc<dyn ErrorBlockPolicy>>,
    formatters: IndexMap<String, FormatterFactory>,
}

impl PolicyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with built-in policies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_bounds_check(Arc::new(NullCheckPolicy::default()));
        registry.register_bounds_check(Arc::new(StringNullOrEmptyPolicy::default()));
        registry.register_bounds_check(Arc::new(StringNullOrWhitespacePolicy::default()));
        registry.register_error_block(Arc::new(RethrowCatchPolicy::default()));
        registry.register_error_block(Arc::new(WrapCatchPolicy::default()));
        registry.register_formatter("extensions_logging", extensions_logging);
        registry.register_formatter("serilog", serilog);
        registry.register_formatter("nlog", nlog);
        registry
    }

    /// Register a bounds-check policy under its own name, replacing any previous one
    pub fn register_bounds_check(&mut self, policy: Arc<dyn BoundsCheckPolicy>) {
        self.bounds_checks.insert(policy.name().to_string(), policy);
    }

    /// Register an error-block policy under its own name, replacing any previous one
    pub fn register_error_block(&mut self, policy: Arc<dyn ErrorBlockPolicy>) {
        self.error_blocks.insert(policy.name().to_string(), policy);
    }

    /// Register a formatter factory
    pub fn register_formatter(&mut self, name: &str, factory: FormatterFactory) {
        self.formatters.insert(name.to_string(), factory);
    }

    /// Look up a bounds-check policy
    ///
    /// # Errors
    /// `UnknownPolicy` if no policy has that name
    pub fn bounds_check(&self, name: &str) -> Result<Arc<dyn BoundsCheckPolicy>, PolicyError> {
        self.bounds_checks.get(name).cloned().ok_or_else(|| PolicyError::UnknownPolicy {
            kind: "bounds_check",
            name: name.to_string(),
        })
    }

    /// Look up an error-block policy
    ///
    /// # Errors
    /// `UnknownPolicy` if no policy has that name
    pub fn error_block(&self, name: &str) -> Result<Arc<dyn ErrorBlockPolicy>, PolicyError> {
        self.error_blocks.get(name).cloned().ok_or_else(|| PolicyError::UnknownPolicy {
            kind: "error_block",
            name: name.to_string(),
        })
    }

    /// Build a formatter logging through `logger_field`
    ///
    /// # Errors
    /// - `UnknownPolicy` if no formatter has that name
    /// - `InvalidLoggerField` if the field is not an identifier
    pub fn formatter(&self, name: &str, logger_field: &str) -> Result<Arc<dyn LoggingFormatter>, PolicyError> {
        let factory = self.formatters.get(name).ok_or_else(|| PolicyError::UnknownPolicy {
            kind: "logging",
            name: name.to_string(),
        })?;
        if !is_identifier(logger_field) {
            return Err(PolicyError::InvalidLoggerField(logger_field.to_string()));
        }
        Ok(factory(logger_field))
    }

    /// Resolve an ordered list of bounds-check names, preserving order
    ///
    /// # Errors
    /// `UnknownPolicy` for the first unknown name
    pub fn bounds_checks<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn BoundsCheckPolicy>>, PolicyError> {
        names.iter().map(|n| self.bounds_check(n.as_ref())).collect()
    }

    /// Resolve an ordered list of error-block names, preserving order
    ///
    /// # Errors
    /// `UnknownPolicy` for the first unknown name
    pub fn error_blocks<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn ErrorBlockPolicy>>, PolicyError> {
        names.iter().map(|n| self.error_block(n.as_ref())).collect()
    }

    /// Registered bounds-check names, in registration order
    #[must_use]
    pub fn bounds_check_names(&self) -> Vec<&str> {
        self.bounds_checks.keys().map(String::as_str).collect()
    }

    /// Registered error-block names, in registration order
    #[must_use]
    pub fn error_block_names(&self) -> Vec<&str> {
        self.error_blocks.keys().map(String::as_str).collect()
    }

    /// Registered formatter names, in registration order
    #[must_use]
    pub fn formatter_names(&self) -> Vec<&str> {
        self.formatters.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("bounds_checks", &self.bounds_check_names())
            .field("error_blocks", &self.error_block_names())
            .field("formatters", &self.formatter_names())
            .finish()
    }
}

fn extensions_logging(field: &str) -> Arc<dyn LoggingFormatter> {
    Arc::new(ExtensionsLoggingFormatter::new(field))
}

fn serilog(field: &str) -> Arc<dyn LoggingFormatter> {
    Arc::new(SerilogFormatter::new(field))
}

fn nlog(field: &str) -> Arc<dyn LoggingFormatter> {
    Arc::new(NLogFormatter::new(field))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}
