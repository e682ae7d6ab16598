//! Credentials attached to outgoing requests.
//!
//! Basic credentials are rendered into an `Authorization` header by the
//! core. OAuth1 signatures depend on the final URL, nonce and clock, so
//! OAuth credentials ride along on `HttpRequest::oauth` and the transport
//! signs the request it actually sends.

use base64::{prelude::BASE64_STANDARD, Engine};

use crate::http::HttpRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    OAuth(OAuthCredentials),
}

/// OAuth1 key material, plus the one-shot protocol parameters used during
/// the token handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: Option<String>,
    pub token_secret: Option<String>,
    /// `oauth_callback`, only sent when requesting a request token.
    pub callback: Option<String>,
    /// `oauth_verifier`, only sent when exchanging for an access token.
    pub verifier: Option<String>,
}

impl OAuthCredentials {
    /// Consumer-only credentials, the starting point of the handshake.
    pub fn consumer(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            consumer_key: key.into(),
            consumer_secret: secret.into(),
            ..Self::default()
        }
    }

    /// Consumer credentials plus an access token pair.
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            token: Some(token.into()),
            token_secret: Some(token_secret.into()),
            ..Self::consumer(consumer_key, consumer_secret)
        }
    }

    /// The same consumer with the token fields and handshake parameters
    /// cleared.
    pub fn consumer_only(&self) -> Self {
        Self::consumer(self.consumer_key.clone(), self.consumer_secret.clone())
    }
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn apply(&self, request: &mut HttpRequest) {
        match self {
            Credentials::Basic { username, password } => {
                let token = BASE64_STANDARD.encode(format!("{username}:{password}"));
                request
                    .headers
                    .push(("Authorization".to_string(), format!("Basic {token}")));
            }
            Credentials::OAuth(oauth) => request.oauth = Some(oauth.clone()),
        }
    }
}
