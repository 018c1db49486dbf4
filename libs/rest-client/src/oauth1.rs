//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use hmac::{Hmac, Mac};
use http::Method;
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::Url;
use serde_json::Value;
use sha1::Sha1;

use crate::error::ClientError;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Consumer and token key pairs used to sign a request
#[derive(Clone, Copy)]
pub struct OAuthCredentials<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub token: &'a str,
    pub token_secret: &'a str,
}

/// Intentionally does not print the secrets.
impl std::fmt::Debug for OAuthCredentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Produces the `Authorization` header value for a signed request
pub trait RequestSigner: Send + Sync {
    /// Sign one request.
    ///
    /// Implementations generate their own nonce and timestamp, so repeated
    /// calls with identical input yield different values.
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` if the URL cannot be normalized.
    fn sign(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        credentials: &OAuthCredentials<'_>,
    ) -> Result<String, ClientError>;
}

/// HMAC-SHA1 OAuth 1.0a signer.
///
/// Only query parameters and the protocol parameters enter the signature base
/// string. JSON bodies are not form-encoded and are therefore not signed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Signer;

impl HmacSha1Signer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Deterministic signing with a caller-chosen nonce and timestamp.
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` if the URL cannot be normalized.
    pub fn sign_with(
        method: &Method,
        url: &str,
        credentials: &OAuthCredentials<'_>,
        nonce: &str,
        timestamp: u64,
    ) -> Result<String, ClientError> {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", credentials.consumer_key),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ];
        if !credentials.token.is_empty() {
            oauth_params.push(("oauth_token", credentials.token));
        }

        let base = signature_base_string(method, url, &oauth_params)?;
        let key = format!(
            "{}&{}",
            encode(credentials.consumer_secret),
            encode(credentials.token_secret)
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| ClientError::BuildError(format!("Failed to create HMAC: {e}")))?;
        mac.update(base.as_bytes());
        let signature =
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        oauth_params.push(("oauth_signature", signature.as_str()));
        oauth_params.sort_unstable_by_key(|(k, _)| *k);
        let fields: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{k}=\"{}\"", encode(v)))
            .collect();
        Ok(format!("OAuth {}", fields.join(", ")))
    }
}

impl RequestSigner for HmacSha1Signer {
    fn sign(
        &self,
        method: &Method,
        url: &str,
        _body: Option<&Value>,
        credentials: &OAuthCredentials<'_>,
    ) -> Result<String, ClientError> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::sign_with(method, url, credentials, &nonce, timestamp)
    }
}

/// RFC 3986 unreserved characters pass through, everything else is `%XX`
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn signature_base_string(
    method: &Method,
    url: &str,
    oauth_params: &[(&str, &str)],
) -> Result<String, ClientError> {
    let parsed =
        Url::parse(url).map_err(|e| ClientError::BuildError(format!("Invalid URL {url}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ClientError::BuildError(format!("URL has no host: {url}")))?;

    let mut base_uri = format!("{}://{host}", parsed.scheme());
    if let Some(port) = parsed.port() {
        base_uri.push(':');
        base_uri.push_str(&port.to_string());
    }
    base_uri.push_str(parsed.path());

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    params.sort();
    let normalized: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();

    Ok(format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        encode(&base_uri),
        encode(&normalized.join("&"))
    ))
}
