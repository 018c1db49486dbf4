use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of the network exchange itself; no HTTP response was classified.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Timeout: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Response body error: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Failure reported by a non-`reqwest` transport
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Underlying `reqwest` error, when the failure came from the HTTP client
    #[must_use]
    pub fn as_reqwest(&self) -> Option<&reqwest::Error> {
        match self {
            TransportError::Connection(e)
            | TransportError::Timeout(e)
            | TransportError::Body(e)
            | TransportError::Reqwest(e) => Some(e),
            TransportError::Other(_) => None,
        }
    }
}

/// HTTP response received with a status outside `200..300`.
///
/// `message` is already interpolated from the server's template when the body
/// carried one, otherwise it is `HTTP ERROR <status>`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    body: Option<Value>,
    message: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, body: Option<Value>, message: String) -> Self {
        Self {
            status,
            body,
            message,
        }
    }

    /// HTTP status returned by the server
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw decoded error body, if the server sent one
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Human-readable message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error returned by every dispatcher call
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Request build error: {0}")]
    BuildError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// True when the network exchange failed before any response was classified
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// True when the server answered with a non-2xx status
    #[must_use]
    pub fn is_api(&self) -> bool {
        matches!(self, ClientError::Api(_))
    }

    #[must_use]
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}
