//! Builder core: guarded configuration and the terminal enriched snapshot
//!
//! [`ClientBuilder`] owns the registry reference, the capability list, and
//! all extension-point slots behind one mutex, so any number of threads may
//! configure a shared builder without losing appends or corrupting storage.
//! [`ClientBuilder::enrich`] produces an [`EnrichedBuilder`] — a distinct,
//! accessor-only type, so mutation after enrichment is rejected at compile
//! time rather than tolerated at runtime.
//!
//! ```rust,ignore
//! use quill_builder::{Capability, ClientBuilder};
//!
//! let builder = ClientBuilder::blocking();
//! builder
//!     .request_interceptor(AuthInterceptor::new(token))
//!     .add_capability(MetricsCapability::default());
//! let enriched = builder.enrich()?;
//! ```

use crate::capability::Capability;
use crate::enrich::{enrich_store, SlotStore};
use crate::error::BuilderError;
use crate::extension::{
    CompletionAdapter, ContextSupplier, Contract, Decoder, Encoder, ErrorDecoder, HeaderProvider,
    QueryEncoder, RequestInterceptor, RequestLogger, ResponseInterceptor, RetryPolicy,
    TargetResolver, Transport,
};
use crate::registry::{slots_to_enrich, BuilderVariant, SlotDescriptor};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

/// Mutable state shared by configuring threads.
#[derive(Debug)]
struct BuilderState {
    slots: SlotStore,
    capabilities: Vec<Arc<dyn Capability>>,
}

/// Mutable, concurrency-safe client configuration.
///
/// Created empty for a variant; configured through chainable `&self`
/// mutators (share it across threads behind an `Arc`); consumed by
/// [`ClientBuilder::enrich`].
#[derive(Debug)]
pub struct ClientBuilder {
    variant: BuilderVariant,
    state: Mutex<BuilderState>,
}

impl ClientBuilder {
    /// Create an empty builder for `variant`.
    #[must_use]
    pub fn new(variant: BuilderVariant) -> Self {
        Self {
            variant,
            state: Mutex::new(BuilderState {
                slots: SlotStore::new(variant),
                capabilities: Vec::new(),
            }),
        }
    }

    /// Create an empty baseline (12-slot) builder.
    #[must_use]
    pub fn blocking() -> Self {
        Self::new(BuilderVariant::Blocking)
    }

    /// Create an empty extended (14-slot) builder.
    #[must_use]
    pub fn asynchronous() -> Self {
        Self::new(BuilderVariant::Async)
    }

    /// This builder's variant.
    #[inline]
    #[must_use]
    pub fn variant(&self) -> BuilderVariant {
        self.variant
    }

    /// Register a capability.
    ///
    /// Chainable; registration order is preserved and determines decoration
    /// order at enrichment (first registered is innermost).
    pub fn add_capability(&self, capability: impl Capability + 'static) -> &Self {
        let mut state = self.state.lock();
        state.capabilities.push(Arc::new(capability));
        trace!(capabilities = state.capabilities.len(), "capability registered");
        self
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn capability_count(&self) -> usize {
        self.state.lock().capabilities.len()
    }

    /// Append a request interceptor (sequence slot).
    pub fn request_interceptor(&self, interceptor: impl RequestInterceptor + 'static) -> &Self {
        self.state
            .lock()
            .slots
            .request_interceptors
            .push(Arc::new(interceptor));
        self
    }

    /// Append a response interceptor (sequence slot).
    pub fn response_interceptor(&self, interceptor: impl ResponseInterceptor + 'static) -> &Self {
        self.state
            .lock()
            .slots
            .response_interceptors
            .push(Arc::new(interceptor));
        self
    }

    /// Set the encoder, replacing any previous value.
    pub fn encoder(&self, encoder: impl Encoder + 'static) -> &Self {
        self.state.lock().slots.encoder = Some(Arc::new(encoder));
        self
    }

    /// Set the decoder, replacing any previous value.
    pub fn decoder(&self, decoder: impl Decoder + 'static) -> &Self {
        self.state.lock().slots.decoder = Some(Arc::new(decoder));
        self
    }

    /// Set the error decoder, replacing any previous value.
    pub fn error_decoder(&self, decoder: impl ErrorDecoder + 'static) -> &Self {
        self.state.lock().slots.error_decoder = Some(Arc::new(decoder));
        self
    }

    /// Set the retry policy, replacing any previous value.
    pub fn retry_policy(&self, policy: impl RetryPolicy + 'static) -> &Self {
        self.state.lock().slots.retry_policy = Some(Arc::new(policy));
        self
    }

    /// Set the request logger, replacing any previous value.
    pub fn request_logger(&self, logger: impl RequestLogger + 'static) -> &Self {
        self.state.lock().slots.request_logger = Some(Arc::new(logger));
        self
    }

    /// Set the contract, replacing any previous value.
    pub fn contract(&self, contract: impl Contract + 'static) -> &Self {
        self.state.lock().slots.contract = Some(Arc::new(contract));
        self
    }

    /// Set the query encoder, replacing any previous value.
    pub fn query_encoder(&self, encoder: impl QueryEncoder + 'static) -> &Self {
        self.state.lock().slots.query_encoder = Some(Arc::new(encoder));
        self
    }

    /// Set the target resolver, replacing any previous value.
    pub fn target_resolver(&self, resolver: impl TargetResolver + 'static) -> &Self {
        self.state.lock().slots.target_resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the header provider, replacing any previous value.
    pub fn header_provider(&self, provider: impl HeaderProvider + 'static) -> &Self {
        self.state.lock().slots.header_provider = Some(Arc::new(provider));
        self
    }

    /// Set the transport, replacing any previous value.
    pub fn transport(&self, transport: impl Transport + 'static) -> &Self {
        self.state.lock().slots.transport = Some(Arc::new(transport));
        self
    }

    /// Set the context supplier, replacing any previous value.
    ///
    /// # Errors
    /// [`BuilderError::SlotUnavailable`] on the `Blocking` variant.
    pub fn context_supplier(
        &self,
        supplier: impl ContextSupplier + 'static,
    ) -> Result<&Self, BuilderError> {
        self.ensure_extended("context_supplier")?;
        self.state.lock().slots.context_supplier = Some(Arc::new(supplier));
        Ok(self)
    }

    /// Set the completion adapter, replacing any previous value.
    ///
    /// # Errors
    /// [`BuilderError::SlotUnavailable`] on the `Blocking` variant.
    pub fn completion_adapter(
        &self,
        adapter: impl CompletionAdapter + 'static,
    ) -> Result<&Self, BuilderError> {
        self.ensure_extended("completion_adapter")?;
        self.state.lock().slots.completion_adapter = Some(Arc::new(adapter));
        Ok(self)
    }

    /// The ordered slot descriptor table for this builder's variant.
    #[inline]
    #[must_use]
    pub fn slots_to_enrich(&self) -> &'static [SlotDescriptor] {
        slots_to_enrich(self.variant)
    }

    /// Current population of every enrichable slot, in registry order.
    #[must_use]
    pub fn slot_population(&self) -> Vec<(&'static str, usize)> {
        let state = self.state.lock();
        slots_to_enrich(self.variant)
            .iter()
            .map(|descriptor| (descriptor.name, (descriptor.populated)(&state.slots)))
            .collect()
    }

    /// Produce a decorated, independent snapshot of this configuration.
    ///
    /// Every populated slot is chained through every registered capability
    /// in registration order; empty slots stay empty; sequence storage is
    /// freshly allocated so the result shares nothing with this builder.
    /// The source builder is not mutated.
    ///
    /// Callers are expected to join configuring threads before enriching;
    /// the internal guard is still held for the duration as a defense
    /// against in-flight mutators.
    ///
    /// # Errors
    /// [`BuilderError::RegistryMismatch`] if the registry and slot storage
    /// disagree; no partially enriched builder is returned.
    pub fn enrich(&self) -> Result<EnrichedBuilder, BuilderError> {
        let state = self.state.lock();
        debug!(
            variant = ?self.variant,
            capabilities = state.capabilities.len(),
            "enrich requested"
        );
        let slots = enrich_store(self.variant, &state.slots, &state.capabilities)?;
        Ok(EnrichedBuilder {
            variant: self.variant,
            slots,
            capabilities: state.capabilities.clone(),
        })
    }

    fn ensure_extended(&self, slot: &'static str) -> Result<(), BuilderError> {
        if self.variant == BuilderVariant::Async {
            Ok(())
        } else {
            Err(BuilderError::SlotUnavailable {
                slot,
                variant: self.variant,
            })
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::blocking()
    }
}

/// Terminal, decorated configuration snapshot.
///
/// Produced once by [`ClientBuilder::enrich`]; owns independently allocated
/// slot storage and exposes read accessors only. Downstream
/// client-construction logic consumes these values as the final
/// configuration.
#[derive(Debug)]
pub struct EnrichedBuilder {
    variant: BuilderVariant,
    slots: SlotStore,
    capabilities: Vec<Arc<dyn Capability>>,
}

impl EnrichedBuilder {
    /// The variant this snapshot was enriched for.
    #[inline]
    #[must_use]
    pub fn variant(&self) -> BuilderVariant {
        self.variant
    }

    /// The capabilities that decorated this snapshot, in registration order.
    #[must_use]
    pub fn capabilities(&self) -> &[Arc<dyn Capability>] {
        &self.capabilities
    }

    /// The ordered slot descriptor table for this snapshot's variant.
    #[inline]
    #[must_use]
    pub fn slots_to_enrich(&self) -> &'static [SlotDescriptor] {
        slots_to_enrich(self.variant)
    }

    /// Population of every enrichable slot, in registry order.
    #[must_use]
    pub fn slot_population(&self) -> Vec<(&'static str, usize)> {
        slots_to_enrich(self.variant)
            .iter()
            .map(|descriptor| (descriptor.name, (descriptor.populated)(&self.slots)))
            .collect()
    }

    /// Decorated request interceptors, in append order.
    #[must_use]
    pub fn request_interceptors(&self) -> &[Arc<dyn RequestInterceptor>] {
        &self.slots.request_interceptors
    }

    /// Decorated response interceptors, in append order.
    #[must_use]
    pub fn response_interceptors(&self) -> &[Arc<dyn ResponseInterceptor>] {
        &self.slots.response_interceptors
    }

    /// Decorated encoder, if configured.
    #[must_use]
    pub fn encoder(&self) -> Option<&Arc<dyn Encoder>> {
        self.slots.encoder.as_ref()
    }

    /// Decorated decoder, if configured.
    #[must_use]
    pub fn decoder(&self) -> Option<&Arc<dyn Decoder>> {
        self.slots.decoder.as_ref()
    }

    /// Decorated error decoder, if configured.
    #[must_use]
    pub fn error_decoder(&self) -> Option<&Arc<dyn ErrorDecoder>> {
        self.slots.error_decoder.as_ref()
    }

    /// Decorated retry policy, if configured.
    #[must_use]
    pub fn retry_policy(&self) -> Option<&Arc<dyn RetryPolicy>> {
        self.slots.retry_policy.as_ref()
    }

    /// Decorated request logger, if configured.
    #[must_use]
    pub fn request_logger(&self) -> Option<&Arc<dyn RequestLogger>> {
        self.slots.request_logger.as_ref()
    }

    /// Decorated contract, if configured.
    #[must_use]
    pub fn contract(&self) -> Option<&Arc<dyn Contract>> {
        self.slots.contract.as_ref()
    }

    /// Decorated query encoder, if configured.
    #[must_use]
    pub fn query_encoder(&self) -> Option<&Arc<dyn QueryEncoder>> {
        self.slots.query_encoder.as_ref()
    }

    /// Decorated target resolver, if configured.
    #[must_use]
    pub fn target_resolver(&self) -> Option<&Arc<dyn TargetResolver>> {
        self.slots.target_resolver.as_ref()
    }

    /// Decorated header provider, if configured.
    #[must_use]
    pub fn header_provider(&self) -> Option<&Arc<dyn HeaderProvider>> {
        self.slots.header_provider.as_ref()
    }

    /// Decorated transport, if configured.
    #[must_use]
    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.slots.transport.as_ref()
    }

    /// Decorated context supplier, if configured (`Async` variant only).
    #[must_use]
    pub fn context_supplier(&self) -> Option<&Arc<dyn ContextSupplier>> {
        self.slots.context_supplier.as_ref()
    }

    /// Decorated completion adapter, if configured (`Async` variant only).
    #[must_use]
    pub fn completion_adapter(&self) -> Option<&Arc<dyn CompletionAdapter>> {
        self.slots.completion_adapter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{CallContext, RequestTemplate};

    #[derive(Debug)]
    struct NoopInterceptor;

    impl RequestInterceptor for NoopInterceptor {
        fn apply(&self, _template: &mut RequestTemplate) {}
    }

    #[derive(Debug)]
    struct EmptyContextSupplier;

    impl ContextSupplier for EmptyContextSupplier {
        fn context(&self) -> CallContext {
            CallContext::default()
        }
    }

    #[test]
    fn builder_starts_empty() {
        let builder = ClientBuilder::blocking();
        assert_eq!(builder.capability_count(), 0);
        assert!(builder.slot_population().iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn sequence_mutators_append() {
        let builder = ClientBuilder::blocking();
        builder
            .request_interceptor(NoopInterceptor)
            .request_interceptor(NoopInterceptor);

        let population = builder.slot_population();
        assert!(population.contains(&("request_interceptors", 2)));
    }

    #[test]
    fn single_mutators_replace() {
        #[derive(Debug)]
        struct CountingLogger(u32);

        impl RequestLogger for CountingLogger {
            fn log(&self, _method_key: &str, _line: &str) {}
        }

        let builder = ClientBuilder::blocking();
        builder
            .request_logger(CountingLogger(1))
            .request_logger(CountingLogger(2));

        assert!(builder.slot_population().contains(&("request_logger", 1)));
    }

    #[test]
    fn extended_mutator_rejected_on_blocking_variant() {
        let builder = ClientBuilder::blocking();
        let err = builder.context_supplier(EmptyContextSupplier).unwrap_err();

        assert_eq!(
            err,
            BuilderError::SlotUnavailable {
                slot: "context_supplier",
                variant: BuilderVariant::Blocking,
            }
        );
    }

    #[test]
    fn extended_mutator_accepted_on_async_variant() {
        let builder = ClientBuilder::asynchronous();
        assert!(builder.context_supplier(EmptyContextSupplier).is_ok());
        assert!(builder.slot_population().contains(&("context_supplier", 1)));
    }

    #[test]
    fn registry_access_matches_variant() {
        assert_eq!(ClientBuilder::blocking().slots_to_enrich().len(), 12);
        assert_eq!(ClientBuilder::asynchronous().slots_to_enrich().len(), 14);
    }

    #[test]
    fn enrich_without_capabilities_succeeds() {
        let builder = ClientBuilder::blocking();
        builder.request_interceptor(NoopInterceptor);

        let enriched = builder.enrich().unwrap();
        assert_eq!(enriched.request_interceptors().len(), 1);
        assert_eq!(enriched.variant(), BuilderVariant::Blocking);
    }

    #[test]
    fn source_mutation_after_enrich_does_not_affect_snapshot() {
        let builder = ClientBuilder::blocking();
        builder.request_interceptor(NoopInterceptor);

        let enriched = builder.enrich().unwrap();
        builder.request_interceptor(NoopInterceptor);

        assert_eq!(enriched.request_interceptors().len(), 1);
        assert!(builder.slot_population().contains(&("request_interceptors", 2)));
    }
}
