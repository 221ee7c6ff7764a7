//! Stitch Session
//!
//! Sequential editing of one container through an external text-mutation
//! service.
//!
//! # Core Concepts
//!
//! - [`UpdateSession`]: Current snapshot, container identity and edit journal
//! - [`InsertionPointResolver`]: Category-ordered placement with fallback
//! - [`ImportTable`]: Namespaces visible to the container
//! - [`NamespaceResolver`]: Adds imports for the namespaces a type mentions
//!
//! # Example
//!
//! ```rust,ignore
//! use stitch_model::{Class, LookupPath, MemberCategory};
//! use stitch_session::{NamespaceResolver, PlacementOptions, UpdateSession};
//!
//! let mut session = UpdateSession::<Class>::open(
//!     service,
//!     document,
//!     LookupPath::top_level("Acme.Orders.OrderService"),
//!     PlacementOptions::default(),
//! )?;
//! NamespaceResolver::ensure_visible(&mut session, &return_type).await?;
//! session.add_after(MemberCategory::Methods, &method_text).await?;
//! ```

#![warn(unreachable_pub)]

mod error;
mod imports;
mod placement;
mod session;

pub use error::SessionError;
pub use imports::{ImportTable, NamespaceResolver};
pub use placement::{InsertionPointResolver, PlacementOptions};
pub use session::UpdateSession;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
