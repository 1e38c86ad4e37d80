//! Enrichment engine
//!
//! Owns the concrete slot storage ([`SlotStore`]) and the pure transformation
//! that produces a decorated copy of it. Enrichment is a function of
//! (source slots, capability list) only: no I/O, no mutation of the source.
//!
//! Per-slot read/decorate/write functions are macro-generated so the set of
//! enrichable slots stays a closed, uniform table; the registry references
//! them by plain `fn` pointer.

use crate::capability::Capability;
use crate::error::BuilderError;
use crate::extension::{
    CompletionAdapter, ContextSupplier, Contract, Decoder, Encoder, ErrorDecoder, HeaderProvider,
    QueryEncoder, RequestInterceptor, RequestLogger, ResponseInterceptor, RetryPolicy,
    TargetResolver, Transport,
};
use crate::registry::{slots_to_enrich, BuilderVariant};
use std::sync::Arc;
use tracing::debug;

/// Concrete storage for every extension slot.
///
/// One struct serves both variants; the `variant` tag records which registry
/// the store was created for, and extended-only fields simply stay empty on
/// `Blocking` stores.
#[derive(Debug)]
pub(crate) struct SlotStore {
    pub(crate) variant: BuilderVariant,
    pub(crate) request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    pub(crate) response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    pub(crate) encoder: Option<Arc<dyn Encoder>>,
    pub(crate) decoder: Option<Arc<dyn Decoder>>,
    pub(crate) error_decoder: Option<Arc<dyn ErrorDecoder>>,
    pub(crate) retry_policy: Option<Arc<dyn RetryPolicy>>,
    pub(crate) request_logger: Option<Arc<dyn RequestLogger>>,
    pub(crate) contract: Option<Arc<dyn Contract>>,
    pub(crate) query_encoder: Option<Arc<dyn QueryEncoder>>,
    pub(crate) target_resolver: Option<Arc<dyn TargetResolver>>,
    pub(crate) header_provider: Option<Arc<dyn HeaderProvider>>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) context_supplier: Option<Arc<dyn ContextSupplier>>,
    pub(crate) completion_adapter: Option<Arc<dyn CompletionAdapter>>,
}

impl SlotStore {
    /// Create an empty store tagged with `variant`.
    pub(crate) fn new(variant: BuilderVariant) -> Self {
        Self {
            variant,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            encoder: None,
            decoder: None,
            error_decoder: None,
            retry_policy: None,
            request_logger: None,
            contract: None,
            query_encoder: None,
            target_resolver: None,
            header_provider: None,
            transport: None,
            context_supplier: None,
            completion_adapter: None,
        }
    }
}

/// Read the slot from `src`, chain it through every capability in
/// registration order, and write the result into `dst`. Empty slots stay
/// empty; sequence slots keep their element order and count.
pub(crate) type ApplyFn =
    fn(&SlotStore, &mut SlotStore, &[Arc<dyn Capability>]) -> Result<(), BuilderError>;

/// Number of values currently held by the slot (0 or 1 for single slots).
pub(crate) type PopulatedFn = fn(&SlotStore) -> usize;

macro_rules! single_slot {
    ($apply:ident, $count:ident, $field:ident, $decorate:ident) => {
        pub(crate) fn $apply(
            src: &SlotStore,
            dst: &mut SlotStore,
            capabilities: &[Arc<dyn Capability>],
        ) -> Result<(), BuilderError> {
            if let Some(value) = &src.$field {
                let mut value = Arc::clone(value);
                for capability in capabilities {
                    value = capability.$decorate(value);
                }
                dst.$field = Some(value);
            }
            Ok(())
        }

        pub(crate) fn $count(store: &SlotStore) -> usize {
            usize::from(store.$field.is_some())
        }
    };
}

macro_rules! sequence_slot {
    ($apply:ident, $count:ident, $field:ident, $decorate:ident) => {
        pub(crate) fn $apply(
            src: &SlotStore,
            dst: &mut SlotStore,
            capabilities: &[Arc<dyn Capability>],
        ) -> Result<(), BuilderError> {
            dst.$field = src
                .$field
                .iter()
                .map(|value| {
                    let mut value = Arc::clone(value);
                    for capability in capabilities {
                        value = capability.$decorate(value);
                    }
                    value
                })
                .collect();
            Ok(())
        }

        pub(crate) fn $count(store: &SlotStore) -> usize {
            store.$field.len()
        }
    };
}

sequence_slot!(
    apply_request_interceptors,
    count_request_interceptors,
    request_interceptors,
    decorate_request_interceptor
);
sequence_slot!(
    apply_response_interceptors,
    count_response_interceptors,
    response_interceptors,
    decorate_response_interceptor
);
single_slot!(apply_encoder, count_encoder, encoder, decorate_encoder);
single_slot!(apply_decoder, count_decoder, decoder, decorate_decoder);
single_slot!(
    apply_error_decoder,
    count_error_decoder,
    error_decoder,
    decorate_error_decoder
);
single_slot!(
    apply_retry_policy,
    count_retry_policy,
    retry_policy,
    decorate_retry_policy
);
single_slot!(
    apply_request_logger,
    count_request_logger,
    request_logger,
    decorate_request_logger
);
single_slot!(apply_contract, count_contract, contract, decorate_contract);
single_slot!(
    apply_query_encoder,
    count_query_encoder,
    query_encoder,
    decorate_query_encoder
);
single_slot!(
    apply_target_resolver,
    count_target_resolver,
    target_resolver,
    decorate_target_resolver
);
single_slot!(
    apply_header_provider,
    count_header_provider,
    header_provider,
    decorate_header_provider
);
single_slot!(apply_transport, count_transport, transport, decorate_transport);
single_slot!(
    apply_context_supplier,
    count_context_supplier,
    context_supplier,
    decorate_context_supplier
);
single_slot!(
    apply_completion_adapter,
    count_completion_adapter,
    completion_adapter,
    decorate_completion_adapter
);

/// Produce a decorated copy of `src`.
///
/// Allocates a fresh store (fresh containers, so no sequence storage is ever
/// shared with the source) and runs every registry descriptor for `variant`
/// over it. With an empty capability list, values pass through undecorated.
///
/// # Errors
/// [`BuilderError::RegistryMismatch`] when `variant` disagrees with the
/// store's own tag; the copy is discarded and no partial result escapes.
pub(crate) fn enrich_store(
    variant: BuilderVariant,
    src: &SlotStore,
    capabilities: &[Arc<dyn Capability>],
) -> Result<SlotStore, BuilderError> {
    if src.variant != variant {
        return Err(BuilderError::RegistryMismatch {
            expected: variant,
            found: src.variant,
        });
    }

    let descriptors = slots_to_enrich(variant);
    debug!(
        ?variant,
        capabilities = capabilities.len(),
        slots = descriptors.len(),
        "enriching builder slots"
    );

    let mut dst = SlotStore::new(variant);
    for descriptor in descriptors {
        (descriptor.apply)(src, &mut dst, capabilities)?;
    }
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::RequestTemplate;

    #[derive(Debug)]
    struct NoopInterceptor;

    impl RequestInterceptor for NoopInterceptor {
        fn apply(&self, _template: &mut RequestTemplate) {}
    }

    #[test]
    fn empty_store_enriches_to_empty_store() {
        let src = SlotStore::new(BuilderVariant::Blocking);
        let dst = enrich_store(BuilderVariant::Blocking, &src, &[]).unwrap();

        assert!(dst.request_interceptors.is_empty());
        assert!(dst.encoder.is_none());
    }

    #[test]
    fn variant_mismatch_fails_atomically() {
        let src = SlotStore::new(BuilderVariant::Blocking);
        let err = enrich_store(BuilderVariant::Async, &src, &[]).unwrap_err();

        assert_eq!(
            err,
            BuilderError::RegistryMismatch {
                expected: BuilderVariant::Async,
                found: BuilderVariant::Blocking,
            }
        );
    }

    #[test]
    fn passthrough_preserves_value_identity() {
        let mut src = SlotStore::new(BuilderVariant::Blocking);
        let interceptor: Arc<dyn RequestInterceptor> = Arc::new(NoopInterceptor);
        src.request_interceptors.push(Arc::clone(&interceptor));

        let dst = enrich_store(BuilderVariant::Blocking, &src, &[]).unwrap();

        assert_eq!(dst.request_interceptors.len(), 1);
        assert!(Arc::ptr_eq(&interceptor, &dst.request_interceptors[0]));
    }
}
