//! Stitch Synth
//!
//! Composes the text of new members and inserts it through an
//! [`UpdateSession`](stitch_session::UpdateSession).
//!
//! # Core Concepts
//!
//! - [`MemberSynthesizer`]: Policy-driven method, property, field and event synthesis
//! - [`SynthConfig`]: TOML-loadable indentation, naming, property and policy settings
//! - [`SynthOutcome`]: Inserted, replaced, or skipped because the member exists
//! - [`FieldNaming`]: Stored field names derived from base names
//!
//! # Example
//!
//! ```rust,ignore
//! use stitch_policy::PolicyRegistry;
//! use stitch_synth::{MemberSynthesizer, MethodDescriptor, MethodRequest, SynthConfig};
//!
//! let config = SynthConfig::load("stitch.toml").await?;
//! let synth = MemberSynthesizer::from_config(config, &PolicyRegistry::with_defaults())?;
//! let request = MethodRequest::new(descriptor, Some(Visibility::Public));
//! let outcome = synth.synthesize_method(&mut session, &request).await?;
//! ```

#![warn(unreachable_pub)]

mod config;
mod descriptor;
mod error;
mod naming;
mod render;
mod synthesizer;

pub use config::{PolicyConfig, PropertyConfig, PropertyStyle, SynthConfig};
pub use descriptor::{
    Documentation, EventDescriptor, EventRequest, FieldDescriptor, FieldRequest, MemberRequest, MethodDescriptor,
    MethodRequest, PropertyDescriptor, PropertyRequest,
};
pub use error::{ConfigError, SynthError};
pub use naming::FieldNaming;
pub use synthesizer::{MemberSynthesizer, MemberSynthesizerBuilder, SkipReason, SynthOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
