use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::progress::ProgressSnapshot;

/// Caller hook invoked for every progress snapshot of a call
pub type ProgressCallback = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Join base URL, version segment and resource path.
///
/// Plain concatenation: `resource_path` is expected to start with `/` and
/// duplicate slashes are kept as given.
#[must_use]
pub fn build_url(base_url: &str, api_version: &str, resource_path: &str) -> String {
    format!("{base_url}/{api_version}{resource_path}")
}

/// One outgoing call: absolute URL, verb and optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    url: String,
    method: Method,
    body: Option<Value>,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn into_body(self) -> Option<Value> {
        self.body
    }
}

/// Per-call options: bearer token and progress hook.
///
/// Without a token (or with an empty one) the call is signed with OAuth 1.0a.
#[derive(Clone, Default)]
pub struct CallOptions {
    pub(crate) token: Option<String>,
    pub(crate) on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallOptions")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl CallOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate with a pre-issued bearer token instead of signing
    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressSnapshot) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
