//! Testing utilities for the quill workspace
//!
//! Shared fixtures: a no-op implementation of every extension kind, spy
//! wrappers that make decoration observable through downcasting, and the
//! [`InstrumentingCapability`] that wraps every kind in its spy.

#![allow(missing_docs)]

use quill_builder::extension::{
    CallContext, CompletionAdapter, ContextSupplier, Contract, DecodeError, Decoder, Encoder,
    ErrorDecoder, HeaderProvider, QueryEncoder, RequestInterceptor, RequestLogger,
    RequestTemplate, Response, ResponseInterceptor, RetryPolicy, TargetResolver, Transport,
    TransportError,
};
use quill_builder::{BuilderVariant, Capability, ClientBuilder, EnrichedBuilder};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// No-op fixtures, one per extension kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct NoopRequestInterceptor;

impl RequestInterceptor for NoopRequestInterceptor {
    fn apply(&self, _template: &mut RequestTemplate) {}
}

#[derive(Debug, Clone, Default)]
pub struct NoopResponseInterceptor;

impl ResponseInterceptor for NoopResponseInterceptor {
    fn intercept(&self, response: Response) -> Response {
        response
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentityEncoder;

impl Encoder for IdentityEncoder {
    fn encode(&self, payload: &[u8], template: &mut RequestTemplate) {
        template.body = Some(payload.to_vec());
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentityDecoder;

impl Decoder for IdentityDecoder {
    fn decode(&self, response: &Response) -> Result<Vec<u8>, DecodeError> {
        Ok(response.body.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusErrorDecoder;

impl ErrorDecoder for StatusErrorDecoder {
    fn decode(&self, _method_key: &str, response: &Response) -> DecodeError {
        DecodeError::Status(response.status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn backoff(&self, _attempt: u32) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct NullLogger;

impl RequestLogger for NullLogger {
    fn log(&self, _method_key: &str, _line: &str) {}
}

#[derive(Debug, Clone, Default)]
pub struct EmptyContract;

impl Contract for EmptyContract {
    fn parse(&self, _target: &str) -> Vec<RequestTemplate> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormQueryEncoder;

impl QueryEncoder for FormQueryEncoder {
    fn encode(&self, params: &[(String, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[derive(Debug, Clone, Default)]
pub struct BaseTargetResolver;

impl TargetResolver for BaseTargetResolver {
    fn resolve(&self, template: &RequestTemplate, base_url: &str) -> String {
        format!("{base_url}{}", template.path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmptyHeaderProvider;

impl HeaderProvider for EmptyHeaderProvider {
    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoopbackTransport;

impl Transport for LoopbackTransport {
    fn execute(&self, _template: &RequestTemplate) -> Result<Response, TransportError> {
        Ok(Response::new(200))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmptyContextSupplier;

impl ContextSupplier for EmptyContextSupplier {
    fn context(&self) -> CallContext {
        CallContext::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PassthroughCompletionAdapter;

impl CompletionAdapter for PassthroughCompletionAdapter {
    fn adapt(&self, _method_key: &str, response: Response) -> Response {
        response
    }
}

// ---------------------------------------------------------------------------
// Spy wrappers: decoration made observable
// ---------------------------------------------------------------------------

macro_rules! spy {
    ($spy:ident, $trait:ident) => {
        #[derive(Debug)]
        pub struct $spy {
            pub label: String,
            pub inner: Arc<dyn $trait>,
        }
    };
}

spy!(SpyRequestInterceptor, RequestInterceptor);
spy!(SpyResponseInterceptor, ResponseInterceptor);
spy!(SpyEncoder, Encoder);
spy!(SpyDecoder, Decoder);
spy!(SpyErrorDecoder, ErrorDecoder);
spy!(SpyRetryPolicy, RetryPolicy);
spy!(SpyRequestLogger, RequestLogger);
spy!(SpyContract, Contract);
spy!(SpyQueryEncoder, QueryEncoder);
spy!(SpyTargetResolver, TargetResolver);
spy!(SpyHeaderProvider, HeaderProvider);
spy!(SpyTransport, Transport);
spy!(SpyContextSupplier, ContextSupplier);
spy!(SpyCompletionAdapter, CompletionAdapter);

impl RequestInterceptor for SpyRequestInterceptor {
    fn apply(&self, template: &mut RequestTemplate) {
        self.inner.apply(template);
    }
}

impl ResponseInterceptor for SpyResponseInterceptor {
    fn intercept(&self, response: Response) -> Response {
        self.inner.intercept(response)
    }
}

impl Encoder for SpyEncoder {
    fn encode(&self, payload: &[u8], template: &mut RequestTemplate) {
        self.inner.encode(payload, template);
    }
}

impl Decoder for SpyDecoder {
    fn decode(&self, response: &Response) -> Result<Vec<u8>, DecodeError> {
        self.inner.decode(response)
    }
}

impl ErrorDecoder for SpyErrorDecoder {
    fn decode(&self, method_key: &str, response: &Response) -> DecodeError {
        self.inner.decode(method_key, response)
    }
}

impl RetryPolicy for SpyRetryPolicy {
    fn backoff(&self, attempt: u32) -> Option<Duration> {
        self.inner.backoff(attempt)
    }
}

impl RequestLogger for SpyRequestLogger {
    fn log(&self, method_key: &str, line: &str) {
        self.inner.log(method_key, line);
    }
}

impl Contract for SpyContract {
    fn parse(&self, target: &str) -> Vec<RequestTemplate> {
        self.inner.parse(target)
    }
}

impl QueryEncoder for SpyQueryEncoder {
    fn encode(&self, params: &[(String, String)]) -> String {
        self.inner.encode(params)
    }
}

impl TargetResolver for SpyTargetResolver {
    fn resolve(&self, template: &RequestTemplate, base_url: &str) -> String {
        self.inner.resolve(template, base_url)
    }
}

impl HeaderProvider for SpyHeaderProvider {
    fn headers(&self) -> Vec<(String, String)> {
        self.inner.headers()
    }
}

impl Transport for SpyTransport {
    fn execute(&self, template: &RequestTemplate) -> Result<Response, TransportError> {
        self.inner.execute(template)
    }
}

impl ContextSupplier for SpyContextSupplier {
    fn context(&self) -> CallContext {
        self.inner.context()
    }
}

impl CompletionAdapter for SpyCompletionAdapter {
    fn adapt(&self, method_key: &str, response: Response) -> Response {
        self.inner.adapt(method_key, response)
    }
}

// ---------------------------------------------------------------------------
// Instrumenting capability
// ---------------------------------------------------------------------------

/// Wraps every extension kind in its spy, tagged with a label. The quill
/// rendition of a mock-everything capability: after enrichment, every
/// populated slot downcasts to a spy carrying this label.
#[derive(Debug, Clone)]
pub struct InstrumentingCapability {
    pub label: String,
}

impl InstrumentingCapability {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Capability for InstrumentingCapability {
    fn decorate_request_interceptor(
        &self,
        interceptor: Arc<dyn RequestInterceptor>,
    ) -> Arc<dyn RequestInterceptor> {
        Arc::new(SpyRequestInterceptor {
            label: self.label.clone(),
            inner: interceptor,
        })
    }

    fn decorate_response_interceptor(
        &self,
        interceptor: Arc<dyn ResponseInterceptor>,
    ) -> Arc<dyn ResponseInterceptor> {
        Arc::new(SpyResponseInterceptor {
            label: self.label.clone(),
            inner: interceptor,
        })
    }

    fn decorate_encoder(&self, encoder: Arc<dyn Encoder>) -> Arc<dyn Encoder> {
        Arc::new(SpyEncoder {
            label: self.label.clone(),
            inner: encoder,
        })
    }

    fn decorate_decoder(&self, decoder: Arc<dyn Decoder>) -> Arc<dyn Decoder> {
        Arc::new(SpyDecoder {
            label: self.label.clone(),
            inner: decoder,
        })
    }

    fn decorate_error_decoder(&self, decoder: Arc<dyn ErrorDecoder>) -> Arc<dyn ErrorDecoder> {
        Arc::new(SpyErrorDecoder {
            label: self.label.clone(),
            inner: decoder,
        })
    }

    fn decorate_retry_policy(&self, policy: Arc<dyn RetryPolicy>) -> Arc<dyn RetryPolicy> {
        Arc::new(SpyRetryPolicy {
            label: self.label.clone(),
            inner: policy,
        })
    }

    fn decorate_request_logger(&self, logger: Arc<dyn RequestLogger>) -> Arc<dyn RequestLogger> {
        Arc::new(SpyRequestLogger {
            label: self.label.clone(),
            inner: logger,
        })
    }

    fn decorate_contract(&self, contract: Arc<dyn Contract>) -> Arc<dyn Contract> {
        Arc::new(SpyContract {
            label: self.label.clone(),
            inner: contract,
        })
    }

    fn decorate_query_encoder(&self, encoder: Arc<dyn QueryEncoder>) -> Arc<dyn QueryEncoder> {
        Arc::new(SpyQueryEncoder {
            label: self.label.clone(),
            inner: encoder,
        })
    }

    fn decorate_target_resolver(
        &self,
        resolver: Arc<dyn TargetResolver>,
    ) -> Arc<dyn TargetResolver> {
        Arc::new(SpyTargetResolver {
            label: self.label.clone(),
            inner: resolver,
        })
    }

    fn decorate_header_provider(
        &self,
        provider: Arc<dyn HeaderProvider>,
    ) -> Arc<dyn HeaderProvider> {
        Arc::new(SpyHeaderProvider {
            label: self.label.clone(),
            inner: provider,
        })
    }

    fn decorate_transport(&self, transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
        Arc::new(SpyTransport {
            label: self.label.clone(),
            inner: transport,
        })
    }

    fn decorate_context_supplier(
        &self,
        supplier: Arc<dyn ContextSupplier>,
    ) -> Arc<dyn ContextSupplier> {
        Arc::new(SpyContextSupplier {
            label: self.label.clone(),
            inner: supplier,
        })
    }

    fn decorate_completion_adapter(
        &self,
        adapter: Arc<dyn CompletionAdapter>,
    ) -> Arc<dyn CompletionAdapter> {
        Arc::new(SpyCompletionAdapter {
            label: self.label.clone(),
            inner: adapter,
        })
    }
}

// ---------------------------------------------------------------------------
// Builder helpers
// ---------------------------------------------------------------------------

/// Populate every enrichable slot of `builder` with a fixture value.
/// Sequence slots receive exactly one element.
pub fn populate_all_slots(builder: &ClientBuilder) {
    builder
        .request_interceptor(NoopRequestInterceptor)
        .response_interceptor(NoopResponseInterceptor)
        .encoder(IdentityEncoder)
        .decoder(IdentityDecoder)
        .error_decoder(StatusErrorDecoder)
        .retry_policy(NoRetry)
        .request_logger(NullLogger)
        .contract(EmptyContract)
        .query_encoder(FormQueryEncoder)
        .target_resolver(BaseTargetResolver)
        .header_provider(EmptyHeaderProvider)
        .transport(LoopbackTransport);

    if builder.variant() == BuilderVariant::Async {
        builder
            .context_supplier(EmptyContextSupplier)
            .expect("async builder accepts context_supplier");
        builder
            .completion_adapter(PassthroughCompletionAdapter)
            .expect("async builder accepts completion_adapter");
    }
}

macro_rules! assert_spy {
    ($value:expr, $spy:ty, $label:expr, $slot:literal) => {{
        let spy = $value
            .as_ref()
            .as_any()
            .downcast_ref::<$spy>()
            .unwrap_or_else(|| panic!("slot `{}` was not instrumented", $slot));
        assert_eq!(spy.label, $label, "wrong capability label on `{}`", $slot);
    }};
}

/// Assert that every slot of `enriched` is populated and that its outermost
/// wrapper is a spy carrying `label`.
///
/// # Panics
/// Panics when a slot is empty, undecorated, or carries another label.
pub fn assert_fully_instrumented(enriched: &EnrichedBuilder, label: &str) {
    assert!(
        !enriched.request_interceptors().is_empty(),
        "enriched request_interceptors is empty"
    );
    for interceptor in enriched.request_interceptors() {
        assert_spy!(interceptor, SpyRequestInterceptor, label, "request_interceptors");
    }

    assert!(
        !enriched.response_interceptors().is_empty(),
        "enriched response_interceptors is empty"
    );
    for interceptor in enriched.response_interceptors() {
        assert_spy!(interceptor, SpyResponseInterceptor, label, "response_interceptors");
    }

    assert_spy!(enriched.encoder().expect("encoder"), SpyEncoder, label, "encoder");
    assert_spy!(enriched.decoder().expect("decoder"), SpyDecoder, label, "decoder");
    assert_spy!(
        enriched.error_decoder().expect("error_decoder"),
        SpyErrorDecoder,
        label,
        "error_decoder"
    );
    assert_spy!(
        enriched.retry_policy().expect("retry_policy"),
        SpyRetryPolicy,
        label,
        "retry_policy"
    );
    assert_spy!(
        enriched.request_logger().expect("request_logger"),
        SpyRequestLogger,
        label,
        "request_logger"
    );
    assert_spy!(enriched.contract().expect("contract"), SpyContract, label, "contract");
    assert_spy!(
        enriched.query_encoder().expect("query_encoder"),
        SpyQueryEncoder,
        label,
        "query_encoder"
    );
    assert_spy!(
        enriched.target_resolver().expect("target_resolver"),
        SpyTargetResolver,
        label,
        "target_resolver"
    );
    assert_spy!(
        enriched.header_provider().expect("header_provider"),
        SpyHeaderProvider,
        label,
        "header_provider"
    );
    assert_spy!(enriched.transport().expect("transport"), SpyTransport, label, "transport");

    if enriched.variant() == BuilderVariant::Async {
        assert_spy!(
            enriched.context_supplier().expect("context_supplier"),
            SpyContextSupplier,
            label,
            "context_supplier"
        );
        assert_spy!(
            enriched.completion_adapter().expect("completion_adapter"),
            SpyCompletionAdapter,
            label,
            "completion_adapter"
        );
    }
}
