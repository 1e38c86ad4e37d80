//! Quill Builder — capability enrichment core
//!
//! The mechanism that lets cross-cutting behaviors (instrumentation,
//! mocking, tracing) be applied uniformly to every pluggable extension point
//! of a declarative client, without the extension points knowing anything
//! about the behavior being attached.
//!
//! # Core Concepts
//!
//! - [`Capability`]: an injected decorator with one identity-defaulted
//!   operation per extension kind
//! - [`slots_to_enrich`]: the static, per-variant registry of enrichable
//!   configuration slots
//! - [`ClientBuilder`]: mutex-guarded configuration, safe for concurrent
//!   mutation from many threads
//! - [`EnrichedBuilder`]: the independent, decorated snapshot produced once
//!   by [`ClientBuilder::enrich`]
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_builder::ClientBuilder;
//!
//! let builder = ClientBuilder::asynchronous();
//! builder
//!     .request_interceptor(AuthInterceptor::new(token))
//!     .add_capability(TracingCapability::default());
//!
//! let enriched = builder.enrich()?;
//! assert_eq!(enriched.slots_to_enrich().len(), 14);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod builder;
mod capability;
mod enrich;
mod error;
mod registry;

pub mod extension;

// Re-exports
pub use builder::{ClientBuilder, EnrichedBuilder};
pub use capability::Capability;
pub use error::BuilderError;
pub use registry::{
    slot_manifest, slots_to_enrich, BuilderVariant, SlotCardinality, SlotDescriptor, SlotInfo,
    ASYNC_SLOT_COUNT, BLOCKING_SLOT_COUNT,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
