use http::HeaderValue;

use crate::error::ClientError;
use crate::oauth1::{OAuthCredentials, RequestSigner};
use crate::request::RequestDescriptor;

/// How a single call authenticates; exactly one variant per call
#[derive(Clone, PartialEq, Eq)]
pub enum AuthDirective {
    /// Caller-supplied bearer token, sent as-is
    BearerToken(String),
    /// Signed `OAuth ...` header value
    OAuth1Header(String),
}

/// Intentionally does not print credentials.
impl std::fmt::Debug for AuthDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthDirective::BearerToken(_) => write!(f, "BearerToken([REDACTED])"),
            AuthDirective::OAuth1Header(_) => write!(f, "OAuth1Header([REDACTED])"),
        }
    }
}

impl AuthDirective {
    /// Value for the `Authorization` header
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            AuthDirective::BearerToken(token) => format!("Bearer {token}"),
            AuthDirective::OAuth1Header(value) => value.clone(),
        }
    }

    /// # Errors
    /// Returns `ClientError::BuildError` if the token contains bytes not allowed in a header.
    pub fn to_header(&self) -> Result<HeaderValue, ClientError> {
        let mut value = HeaderValue::from_str(&self.header_value())
            .map_err(|e| ClientError::BuildError(format!("Invalid header value: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }

    #[must_use]
    pub fn is_bearer(&self) -> bool {
        matches!(self, AuthDirective::BearerToken(_))
    }
}

/// Choose bearer passthrough when a non-empty token is supplied, otherwise sign.
///
/// The token is not validated here; a bad token surfaces later as an HTTP
/// failure. Signatures are never cached.
///
/// # Errors
/// Propagates signer failures (e.g. a URL that cannot be normalized).
pub fn select_auth(
    request: &RequestDescriptor,
    supplied_token: Option<&str>,
    signer: &dyn RequestSigner,
    credentials: &OAuthCredentials<'_>,
) -> Result<AuthDirective, ClientError> {
    match supplied_token {
        Some(token) if !token.is_empty() => Ok(AuthDirective::BearerToken(token.to_owned())),
        _ => signer
            .sign(request.method(), request.url(), request.body(), credentials)
            .map(AuthDirective::OAuth1Header),
    }
}
