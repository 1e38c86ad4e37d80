//! Capability abstraction: uniform decoration of extension points
//!
//! A [`Capability`] is an injected, cross-cutting decorator (instrumentation,
//! mocking, tracing) applied to every populated extension slot of a builder
//! during enrichment. Each extension kind has one decoration operation, all
//! defaulting to identity passthrough, so a capability implements only the
//! kinds it cares about.

use crate::extension::{
    CompletionAdapter, ContextSupplier, Contract, Decoder, Encoder, ErrorDecoder, HeaderProvider,
    QueryEncoder, RequestInterceptor, RequestLogger, ResponseInterceptor, RetryPolicy,
    TargetResolver, Transport,
};
use std::fmt;
use std::sync::Arc;

/// A cross-cutting decorator over the builder's extension points.
///
/// # Composition order
/// When several capabilities are registered, the enricher applies them in
/// registration order: the first registered capability produces the innermost
/// wrapper and the last registered produces the outermost.
pub trait Capability: Send + Sync + fmt::Debug {
    /// Decorate a request interceptor.
    fn decorate_request_interceptor(
        &self,
        interceptor: Arc<dyn RequestInterceptor>,
    ) -> Arc<dyn RequestInterceptor> {
        interceptor
    }

    /// Decorate a response interceptor.
    fn decorate_response_interceptor(
        &self,
        interceptor: Arc<dyn ResponseInterceptor>,
    ) -> Arc<dyn ResponseInterceptor> {
        interceptor
    }

    /// Decorate the encoder.
    fn decorate_encoder(&self, encoder: Arc<dyn Encoder>) -> Arc<dyn Encoder> {
        encoder
    }

    /// Decorate the decoder.
    fn decorate_decoder(&self, decoder: Arc<dyn Decoder>) -> Arc<dyn Decoder> {
        decoder
    }

    /// Decorate the error decoder.
    fn decorate_error_decoder(&self, decoder: Arc<dyn ErrorDecoder>) -> Arc<dyn ErrorDecoder> {
        decoder
    }

    /// Decorate the retry policy.
    fn decorate_retry_policy(&self, policy: Arc<dyn RetryPolicy>) -> Arc<dyn RetryPolicy> {
        policy
    }

    /// Decorate the request logger.
    fn decorate_request_logger(&self, logger: Arc<dyn RequestLogger>) -> Arc<dyn RequestLogger> {
        logger
    }

    /// Decorate the contract.
    fn decorate_contract(&self, contract: Arc<dyn Contract>) -> Arc<dyn Contract> {
        contract
    }

    /// Decorate the query encoder.
    fn decorate_query_encoder(&self, encoder: Arc<dyn QueryEncoder>) -> Arc<dyn QueryEncoder> {
        encoder
    }

    /// Decorate the target resolver.
    fn decorate_target_resolver(
        &self,
        resolver: Arc<dyn TargetResolver>,
    ) -> Arc<dyn TargetResolver> {
        resolver
    }

    /// Decorate the header provider.
    fn decorate_header_provider(
        &self,
        provider: Arc<dyn HeaderProvider>,
    ) -> Arc<dyn HeaderProvider> {
        provider
    }

    /// Decorate the transport.
    fn decorate_transport(&self, transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
        transport
    }

    /// Decorate the context supplier (`Async` variant only).
    fn decorate_context_supplier(
        &self,
        supplier: Arc<dyn ContextSupplier>,
    ) -> Arc<dyn ContextSupplier> {
        supplier
    }

    /// Decorate the completion adapter (`Async` variant only).
    fn decorate_completion_adapter(
        &self,
        adapter: Arc<dyn CompletionAdapter>,
    ) -> Arc<dyn CompletionAdapter> {
        adapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::RequestTemplate;

    #[derive(Debug)]
    struct InertCapability;

    impl Capability for InertCapability {}

    #[derive(Debug)]
    struct NoopInterceptor;

    impl RequestInterceptor for NoopInterceptor {
        fn apply(&self, _template: &mut RequestTemplate) {}
    }

    #[test]
    fn default_decoration_is_identity() {
        let capability = InertCapability;
        let interceptor: Arc<dyn RequestInterceptor> = Arc::new(NoopInterceptor);

        let decorated = capability.decorate_request_interceptor(Arc::clone(&interceptor));
        assert!(Arc::ptr_eq(&interceptor, &decorated));
    }
}
