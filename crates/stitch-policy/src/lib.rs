//! Stitch Policies
//!
//! Pluggable text generators used by member synthesis.
//!
//! # Core Concepts
//!
//! - [`LoggingFormatter`]: Renders a log call for one logging framework
//! - [`BoundsCheckPolicy`]: Guard clause for one validation rule
//! - [`ErrorBlockPolicy`]: One exception-handling pattern
//! - [`PolicyRegistry`]: Name-based lookup of built-in and custom policies
//!
//! Policies are immutable and shared read-only across a batch of synthesis
//! calls. Ordered lists of them are applied in list order.
//!
//! # Example
//!
//! ```rust,ignore
//! use stitch_policy::{first_applicable, MethodContext, PolicyRegistry};
//!
//! let registry = PolicyRegistry::with_defaults();
//! let checks = registry.bounds_checks(&["string_null_or_whitespace", "null_check"])?;
//! let ctx = MethodContext::new("Process", "        ", "    ");
//! if let Some((policy, guard)) = first_applicable(&checks, &ctx, &parameter) {
//!     println!("{} needs {:?}", policy.name(), policy.required_namespaces());
//! }
//! ```

#![warn(unreachable_pub)]

mod bounds;
mod context;
mod error;
mod error_block;
mod logging;
mod registry;

pub use bounds::{
    first_applicable, BoundsCheckPolicy, NullCheckPolicy, StringNullOrEmptyPolicy, StringNullOrWhitespacePolicy,
};
pub use context::{MethodContext, TypeNames};
pub use error::PolicyError;
pub use error_block::{BlockKind, ErrorBlockPolicy, RethrowCatchPolicy, WrapCatchPolicy};
pub use logging::{
    escape_literal, ExtensionsLoggingFormatter, LogLevel, LoggingFormatter, NLogFormatter, SerilogFormatter,
};
pub use registry::{FormatterFactory, PolicyRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
