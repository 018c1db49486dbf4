use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::Value;

use crate::error::{ClientError, TransportError};
use crate::progress::{ProgressRelay, ProgressSnapshot};

/// Fully prepared request handed to a [`Transport`]
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

/// Status, headers and decoded body of a completed exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` for an empty body
    pub body: Option<Value>,
}

/// Performs the network exchange for the dispatcher.
///
/// Implementations push progress through `progress` while the transfer is in
/// flight and report connection-level failures as [`TransportError`]; any
/// HTTP status, including errors, is a successful exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
        progress: &ProgressRelay,
    ) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    /// Returns `ClientError::BuildError` if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, ClientError> {
        Self::build(reqwest::Client::builder())
    }

    /// Transport with an overall per-request timeout
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` if the HTTP client cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ClientError> {
        Self::build(reqwest::Client::builder().timeout(timeout))
    }

    /// Wrap an already configured client
    #[must_use]
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self, ClientError> {
        let http_client = builder
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
        progress: &ProgressRelay,
    ) -> Result<TransportResponse, TransportError> {
        let mut req_builder = self
            .http_client
            .request(request.method, &request.url)
            .headers(request.headers)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Other(e.to_string()))?;
            req_builder = req_builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes);
        }

        let started = Instant::now();
        let resp = req_builder.send().await.map_err(classify_reqwest_error)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let total = resp.content_length();

        let mut buf = BytesMut::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(TransportError::Body)?;
            buf.extend_from_slice(&chunk);
            if progress.is_active() {
                let transferred = buf.len() as u64;
                progress.emit(&ProgressSnapshot::measure(
                    transferred,
                    total.map(|t| t.max(transferred)),
                    started.elapsed(),
                ));
            }
        }

        Ok(TransportResponse {
            status,
            headers,
            body: decode_body(&buf.freeze()),
        })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e)
    } else if e.is_connect() {
        TransportError::Connection(e)
    } else {
        TransportError::Reqwest(e)
    }
}

/// Empty bodies decode to `None`; text that is not JSON is kept as a string
fn decode_body(bytes: &Bytes) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}
