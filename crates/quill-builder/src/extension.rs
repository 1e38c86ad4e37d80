//! Extension-point contracts for the client builder
//!
//! One trait per pluggable extension kind. The builder core treats every
//! extension as an opaque value: it stores, clones, and decorates them but
//! never interprets their behavior. Method signatures here exist so values
//! are exercisable and observable, not to pin down wire semantics.

use std::any::Any;
use std::fmt;
use std::time::Duration;

/// Blanket downcast support for extension trait objects.
///
/// Decorators wrap extensions in new types; consumers (notably tests)
/// recover the concrete type through [`AsAny::as_any`].
pub trait AsAny: Any {
    /// View the value as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An outgoing request under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTemplate {
    /// HTTP-style method name.
    pub method: String,
    /// Request path, relative to the resolved target.
    pub path: String,
    /// Header pairs, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Query pairs, in insertion order.
    pub query: Vec<(String, String)>,
    /// Serialized request body, if any.
    pub body: Option<Vec<u8>>,
}

impl RequestTemplate {
    /// Create a template for `method` and `path` with no headers or body.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}

/// A received response, opaque to this core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Status code.
    pub status: u16,
    /// Header pairs, in arrival order.
    pub headers: Vec<(String, String)>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create an empty response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

/// Per-call context propagated to asynchronous executions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Context entries, in insertion order.
    pub entries: Vec<(String, String)>,
}

/// Failure while turning a response into a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The body could not be decoded.
    #[error("response body could not be decoded: {0}")]
    Body(String),

    /// The status code signals a failed call.
    #[error("unexpected response status {0}")]
    Status(u16),
}

/// Failure while executing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The target could not be reached.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The call did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Mutates outgoing request templates before execution.
pub trait RequestInterceptor: AsAny + Send + Sync + fmt::Debug {
    /// Apply this interceptor to `template`.
    fn apply(&self, template: &mut RequestTemplate);
}

/// Observes and possibly replaces incoming responses.
pub trait ResponseInterceptor: AsAny + Send + Sync + fmt::Debug {
    /// Intercept `response`, returning the response to pass downstream.
    fn intercept(&self, response: Response) -> Response;
}

/// Serializes a payload into a request template body.
pub trait Encoder: AsAny + Send + Sync + fmt::Debug {
    /// Encode `payload` into `template`.
    fn encode(&self, payload: &[u8], template: &mut RequestTemplate);
}

/// Parses a response body into a value.
pub trait Decoder: AsAny + Send + Sync + fmt::Debug {
    /// Decode the body of `response`.
    ///
    /// # Errors
    /// Returns [`DecodeError`] when the body cannot be interpreted.
    fn decode(&self, response: &Response) -> Result<Vec<u8>, DecodeError>;
}

/// Maps failed responses to decode errors.
pub trait ErrorDecoder: AsAny + Send + Sync + fmt::Debug {
    /// Produce the error for a failed call to `method_key`.
    fn decode(&self, method_key: &str, response: &Response) -> DecodeError;
}

/// Decides whether and when a failed call is retried.
pub trait RetryPolicy: AsAny + Send + Sync + fmt::Debug {
    /// Backoff before retry number `attempt`, or `None` to give up.
    fn backoff(&self, attempt: u32) -> Option<Duration>;
}

/// Receives per-call log lines.
pub trait RequestLogger: AsAny + Send + Sync + fmt::Debug {
    /// Record `line` for the call identified by `method_key`.
    fn log(&self, method_key: &str, line: &str);
}

/// Turns an interface description into request templates.
///
/// Parsing semantics live entirely behind this seam.
pub trait Contract: AsAny + Send + Sync + fmt::Debug {
    /// Parse the templates declared by `target`.
    fn parse(&self, target: &str) -> Vec<RequestTemplate>;
}

/// Serializes query parameter maps.
pub trait QueryEncoder: AsAny + Send + Sync + fmt::Debug {
    /// Encode `params` into a query string.
    fn encode(&self, params: &[(String, String)]) -> String;
}

/// Resolves a template against a logical target.
pub trait TargetResolver: AsAny + Send + Sync + fmt::Debug {
    /// Produce the absolute URL for `template` under `base_url`.
    fn resolve(&self, template: &RequestTemplate, base_url: &str) -> String;
}

/// Supplies headers attached to every outgoing request.
pub trait HeaderProvider: AsAny + Send + Sync + fmt::Debug {
    /// Header pairs to append, in order.
    fn headers(&self) -> Vec<(String, String)>;
}

/// Executes a finalized request. Execution itself is out of scope for this
/// core; the slot only carries the value.
pub trait Transport: AsAny + Send + Sync + fmt::Debug {
    /// Execute `template` and return the raw response.
    ///
    /// # Errors
    /// Returns [`TransportError`] when the call cannot complete.
    fn execute(&self, template: &RequestTemplate) -> Result<Response, TransportError>;
}

/// Supplies the per-call context for asynchronous executions.
///
/// Only present on the `Async` builder variant.
pub trait ContextSupplier: AsAny + Send + Sync + fmt::Debug {
    /// Produce a fresh context for one call.
    fn context(&self) -> CallContext;
}

/// Adapts completed responses for asynchronous consumers.
///
/// Only present on the `Async` builder variant.
pub trait CompletionAdapter: AsAny + Send + Sync + fmt::Debug {
    /// Adapt `response` for the call identified by `method_key`.
    fn adapt(&self, method_key: &str, response: Response) -> Response;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct UpcaseInterceptor;

    impl RequestInterceptor for UpcaseInterceptor {
        fn apply(&self, template: &mut RequestTemplate) {
            template.method = template.method.to_uppercase();
        }
    }

    #[test]
    fn request_template_new() {
        let template = RequestTemplate::new("get", "/users");
        assert_eq!(template.method, "get");
        assert_eq!(template.path, "/users");
        assert!(template.headers.is_empty());
        assert!(template.body.is_none());
    }

    #[test]
    fn interceptor_mutates_template() {
        let mut template = RequestTemplate::new("get", "/users");
        UpcaseInterceptor.apply(&mut template);
        assert_eq!(template.method, "GET");
    }

    #[test]
    fn as_any_downcasts_concrete_type() {
        let interceptor: std::sync::Arc<dyn RequestInterceptor> =
            std::sync::Arc::new(UpcaseInterceptor);
        // Call through the trait object; calling on the Arc itself would
        // downcast the Arc, not the interceptor.
        assert!(interceptor
            .as_ref()
            .as_any()
            .downcast_ref::<UpcaseInterceptor>()
            .is_some());
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::Status(503);
        assert_eq!(err.to_string(), "unexpected response status 503");
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::Connect("refused".to_string());
        assert_eq!(err.to_string(), "connect failed: refused");
    }
}
