use secrecy::{ExposeSecret, SecretString};

use crate::error::ClientError;
use crate::oauth1::OAuthCredentials;

const DEFAULT_API_VERSION: &str = "V1";

/// Connection and credential settings for a [`RequestDispatcher`](crate::RequestDispatcher).
///
/// Read-only once built; the dispatcher owns it for its whole lifetime.
#[derive(Debug)]
pub struct ClientConfig {
    base_url: String,
    api_version: String,
    consumer_key: String,
    consumer_secret: SecretString,
    access_token: String,
    access_token_secret: SecretString,
}

impl ClientConfig {
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: api_version.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::from(consumer_secret.into()),
            access_token: access_token.into(),
            access_token_secret: SecretString::from(access_token_secret.into()),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expects:
    /// - `REST_CLIENT_BASE_URL`: service root, e.g. `https://shop.example.com/rest` (required)
    /// - `REST_CLIENT_API_VERSION`: version segment (default: "V1")
    /// - `REST_CLIENT_CONSUMER_KEY`, `REST_CLIENT_CONSUMER_SECRET` (required)
    /// - `REST_CLIENT_ACCESS_TOKEN`, `REST_CLIENT_ACCESS_TOKEN_SECRET` (required)
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` naming the first missing variable.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_version = std::env::var("REST_CLIENT_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_owned());

        Ok(Self::new(
            required_var("REST_CLIENT_BASE_URL")?,
            api_version,
            required_var("REST_CLIENT_CONSUMER_KEY")?,
            required_var("REST_CLIENT_CONSUMER_SECRET")?,
            required_var("REST_CLIENT_ACCESS_TOKEN")?,
            required_var("REST_CLIENT_ACCESS_TOKEN_SECRET")?,
        ))
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Borrow the four OAuth values in the shape the signer expects
    pub(crate) fn oauth_credentials(&self) -> OAuthCredentials<'_> {
        OAuthCredentials {
            consumer_key: &self.consumer_key,
            consumer_secret: self.consumer_secret.expose_secret(),
            token: &self.access_token,
            token_secret: self.access_token_secret.expose_secret(),
        }
    }
}

fn required_var(name: &str) -> Result<String, ClientError> {
    std::env::var(name).map_err(|_| ClientError::BuildError(format!("{name} not set")))
}
