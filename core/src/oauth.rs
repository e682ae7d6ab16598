//! OAuth1 three-legged handshake against Hatena.
//!
//! 1. `build_oauth_initiate` with consumer credentials, then
//!    `parse_token_response` yields a request token.
//! 2. Send the user to `authorize_url(&request_token)`; they come back with
//!    a verifier code.
//! 3. `build_oauth_token` with the request token and verifier, then
//!    `parse_token_response` yields the access token pair.
//!
//! The transport signs each request with `HttpRequest::oauth`.

use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded;

use crate::auth::OAuthCredentials;
use crate::client::{check_status, encode, HaikuClient};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::serialize::Param;

pub const INITIATE_URL: &str = "https://www.hatena.com/oauth/initiate";
pub const AUTHORIZE_URL: &str = "https://www.hatena.ne.jp/oauth/authorize";
pub const TOKEN_URL: &str = "https://www.hatena.com/oauth/token";

/// Callback value for clients that cannot receive a redirect.
pub const OUT_OF_BAND: &str = "oob";

/// A token and its secret, as returned by the initiate and token endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

impl TokenPair {
    /// Full credentials for `consumer` using this pair as the token.
    pub fn into_credentials(self, consumer: &OAuthCredentials) -> OAuthCredentials {
        OAuthCredentials::new(
            consumer.consumer_key.clone(),
            consumer.consumer_secret.clone(),
            self.oauth_token,
            self.oauth_token_secret,
        )
    }
}

/// Where the user approves the request token.
pub fn authorize_url(request_token: &str) -> String {
    let token: String = form_urlencoded::byte_serialize(request_token.as_bytes()).collect();
    format!("{AUTHORIZE_URL}?oauth_token={token}")
}

impl HaikuClient {
    /// Request a request token for `scope` (e.g. `read_public`,
    /// `write_public`). `callback` defaults to out-of-band.
    pub fn build_oauth_initiate(
        &self,
        consumer: &OAuthCredentials,
        scope: &[&str],
        callback: Option<&str>,
    ) -> Result<HttpRequest> {
        let mut oauth = consumer.consumer_only();
        oauth.callback = Some(callback.unwrap_or(OUT_OF_BAND).to_string());
        let mut req = self.oauth_request(INITIATE_URL, oauth);
        let scope: Param = scope.iter().copied().collect();
        req.form = encode(vec![("scope", Some(scope))])?;
        Ok(req)
    }

    /// Exchange an approved request token for an access token.
    pub fn build_oauth_token(
        &self,
        consumer: &OAuthCredentials,
        request_token: &TokenPair,
        verifier: &str,
    ) -> Result<HttpRequest> {
        let mut oauth = request_token.clone().into_credentials(consumer);
        oauth.verifier = Some(verifier.to_string());
        Ok(self.oauth_request(TOKEN_URL, oauth))
    }

    /// Parse the form-encoded body of the initiate or token endpoint.
    pub fn parse_token_response(&self, response: HttpResponse) -> Result<TokenPair> {
        check_status(&response)?;
        let pair: TokenPair = serde_html_form::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        debug!("received oauth token");
        Ok(pair)
    }

    fn oauth_request(&self, url: &str, oauth: OAuthCredentials) -> HttpRequest {
        let mut req = HttpRequest::new(HttpMethod::Post, url.to_string());
        req.headers
            .push(("User-Agent".to_string(), self.user_agent().to_string()));
        req.oauth = Some(oauth);
        req
    }
}
