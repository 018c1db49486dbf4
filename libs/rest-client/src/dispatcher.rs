use std::fmt;
use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{AuthDirective, select_auth};
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::interpolate::{MessageParameters, interpolate};
use crate::logger::DiagnosticLogger;
use crate::oauth1::{HmacSha1Signer, RequestSigner};
use crate::progress::ProgressRelay;
use crate::request::{CallOptions, RequestDescriptor, build_url};
use crate::transport::{ReqwestTransport, Transport, TransportRequest};

/// Resource that exchanges customer credentials for an access token
pub const CUSTOMER_TOKEN_PATH: &str = "/integration/customer/token";

/// Issues authenticated JSON calls against one versioned REST service.
///
/// Every call resolves with the decoded response body on a 2xx status and
/// fails with [`ClientError::Api`] otherwise. Network failures surface as
/// [`ClientError::Transport`] untouched. There are no retries.
pub struct RequestDispatcher {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    signer: Arc<dyn RequestSigner>,
    logger: DiagnosticLogger,
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("config", &self.config)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    /// Dispatcher using `reqwest`, HMAC-SHA1 signing and no diagnostics
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` if the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            signer: Arc::new(HmacSha1Signer::new()),
            logger: DiagnosticLogger::disabled(),
        }
    }

    #[must_use]
    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = signer;
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: DiagnosticLogger) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute, versioned URL for `resource_path`
    #[must_use]
    pub fn build_url(&self, resource_path: &str) -> String {
        build_url(
            self.config.base_url(),
            self.config.api_version(),
            resource_path,
        )
    }

    /// # Errors
    /// See [`RequestDispatcher::api_call`].
    pub async fn get(&self, resource_path: &str, options: CallOptions) -> Result<Value, ClientError> {
        let request = RequestDescriptor::new(Method::GET, self.build_url(resource_path));
        self.api_call(request, options).await
    }

    /// # Errors
    /// Fails with `ClientError::Serialization` if `body` cannot be turned into
    /// JSON, otherwise see [`RequestDispatcher::api_call`].
    pub async fn post<T>(
        &self,
        resource_path: &str,
        body: &T,
        options: CallOptions,
    ) -> Result<Value, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let request = RequestDescriptor::new(Method::POST, self.build_url(resource_path))
            .with_body(serde_json::to_value(body)?);
        self.api_call(request, options).await
    }

    /// # Errors
    /// Fails with `ClientError::Serialization` if `body` cannot be turned into
    /// JSON, otherwise see [`RequestDispatcher::api_call`].
    pub async fn put<T>(
        &self,
        resource_path: &str,
        body: &T,
        options: CallOptions,
    ) -> Result<Value, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let request = RequestDescriptor::new(Method::PUT, self.build_url(resource_path))
            .with_body(serde_json::to_value(body)?);
        self.api_call(request, options).await
    }

    /// # Errors
    /// See [`RequestDispatcher::api_call`].
    pub async fn delete(
        &self,
        resource_path: &str,
        options: CallOptions,
    ) -> Result<Value, ClientError> {
        let request = RequestDescriptor::new(Method::DELETE, self.build_url(resource_path));
        self.api_call(request, options).await
    }

    /// Exchange customer credentials for an access token.
    ///
    /// Always signed with OAuth 1.0a; a bearer token is never used here.
    ///
    /// # Errors
    /// Same as [`RequestDispatcher::post`].
    pub async fn consumer_token<T>(&self, login: &T) -> Result<Value, ClientError>
    where
        T: Serialize + ?Sized,
    {
        self.post(CUSTOMER_TOKEN_PATH, login, CallOptions::new()).await
    }

    /// Authenticate, send and classify one request.
    ///
    /// # Errors
    /// - `ClientError::Transport` when the exchange itself failed
    /// - `ClientError::Api` when the status is outside `200..300`
    /// - `ClientError::BuildError` when signing or header construction failed
    pub async fn api_call(
        &self,
        request: RequestDescriptor,
        options: CallOptions,
    ) -> Result<Value, ClientError> {
        let CallOptions { token, on_progress } = options;

        self.logger.debug(format_args!(
            "Calling API endpoint: {} {} bearer: {}",
            request.method(),
            request.url(),
            token.as_deref().is_some_and(|t| !t.is_empty()),
        ));

        let auth = select_auth(
            &request,
            token.as_deref(),
            self.signer.as_ref(),
            &self.config.oauth_credentials(),
        )?;
        let headers = request_headers(&auth)?;
        let trace_headers = headers.clone();

        self.logger.info(RequestTrace {
            method: request.method(),
            url: request.url(),
            headers: &trace_headers,
            has_body: request.body().is_some(),
        });

        let relay = ProgressRelay::new(on_progress);
        let transport_request = TransportRequest {
            method: request.method().clone(),
            url: request.url().to_owned(),
            headers,
            body: request.into_body(),
        };

        let response = match self.transport.send(transport_request, &relay).await {
            Ok(response) => response,
            Err(e) => {
                self.logger.error(format_args!("Error occurred: {e}"));
                return Err(e.into());
            }
        };
        self.logger.debug("Response received.");

        if response.status.is_success() {
            return Ok(response.body.unwrap_or(Value::Null));
        }

        let err = api_error(response.status, response.body);
        self.logger
            .error(format_args!("API call failed: {}", err.message()));
        Err(err.into())
    }
}

fn request_headers(auth: &AuthDirective) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth.to_header()?);
    Ok(headers)
}

/// Build the rejection for a non-2xx response.
///
/// A string `message` in the body is interpolated with the body's
/// `parameters`; otherwise the message is `HTTP ERROR <status>`.
pub(crate) fn api_error(status: StatusCode, body: Option<Value>) -> ApiError {
    let template = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str);

    let message = match template {
        Some(template) => {
            let parameters = body
                .as_ref()
                .and_then(|b| b.get("parameters"))
                .and_then(MessageParameters::from_json)
                .unwrap_or(MessageParameters::Named(Vec::new()));
            interpolate(template, Some(&parameters))
        }
        None => format!("HTTP ERROR {}", status.as_u16()),
    };

    ApiError::new(status, body, message)
}

/// Debug trace of an outgoing request with the credentials masked
struct RequestTrace<'a> {
    method: &'a Method,
    url: &'a str,
    headers: &'a HeaderMap,
    has_body: bool,
}

impl fmt::Display for RequestTrace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} headers={{", self.method, self.url)?;
        for (i, (name, value)) in self.headers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if value.is_sensitive() {
                write!(f, "{name}: [REDACTED]")?;
            } else {
                write!(f, "{name}: {}", value.to_str().unwrap_or("<binary>"))?;
            }
        }
        write!(f, "}} json=true body={}", if self.has_body { "present" } else { "none" })
    }
}
