//! Signed JSON REST client
//!
//! Issues calls against a versioned REST service (`{base_url}/{version}{path}`)
//! with one of two mutually exclusive authentication modes:
//!
//! - OAuth 1.0a request signing (HMAC-SHA1) with the configured consumer and
//!   access token pairs, used whenever no bearer token is supplied
//! - Bearer token passthrough, when the caller supplies a non-empty token
//!
//! Responses with a 2xx status resolve with the decoded JSON body. Any other
//! status becomes an [`ApiError`] whose message is rendered from the server's
//! `message`/`parameters` template; network failures surface unchanged as
//! [`TransportError`].
//!
//! # Examples
//!
//! ## Signed call
//!
//! ```no_run
//! use rest_client::{CallOptions, ClientConfig, RequestDispatcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(
//!     "https://shop.example.com/rest",
//!     "V1",
//!     "consumer-key",
//!     "consumer-secret",
//!     "access-token",
//!     "access-token-secret",
//! );
//! let client = RequestDispatcher::new(config)?;
//!
//! let product = client.get("/products/24-MB01", CallOptions::new()).await?;
//! println!("{}", product["name"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Bearer token with progress
//!
//! ```no_run
//! use rest_client::{CallOptions, ClientConfig, RequestDispatcher};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RequestDispatcher::new(ClientConfig::from_env()?)?;
//!
//! let token = client
//!     .consumer_token(&json!({"username": "jane@example.com", "password": "secret"}))
//!     .await?;
//!
//! let options = CallOptions::new()
//!     .bearer(token.as_str().unwrap_or_default())
//!     .on_progress(|p| println!("{:.0}%", p.percent * 100.0));
//! let orders = client.get("/orders/mine", options).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod dispatcher;
mod error;
mod interpolate;
mod logger;
mod oauth1;
mod progress;
mod request;
mod transport;

// Re-export public API
pub use auth::{AuthDirective, select_auth};
pub use config::ClientConfig;
pub use dispatcher::{CUSTOMER_TOKEN_PATH, RequestDispatcher};
pub use error::{ApiError, ClientError, TransportError};
pub use interpolate::{MessageParameters, interpolate};
pub use logger::DiagnosticLogger;
pub use oauth1::{HmacSha1Signer, OAuthCredentials, RequestSigner};
pub use progress::{ProgressRelay, ProgressSnapshot};
pub use request::{CallOptions, ProgressCallback, RequestDescriptor, build_url};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

// Re-export commonly used types from dependencies
pub use http::{HeaderMap, Method, StatusCode};
