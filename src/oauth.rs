//! OAuth 1.0a request signing (HMAC-SHA1) for the Twitter REST API.

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// The four credentials of an OAuth 1.0a user-context app.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

/// Percent-encode per RFC 3986 (only unreserved characters pass through).
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl OAuthCredentials {
    /// Build an `Authorization` header for a request with a fresh nonce and
    /// the current timestamp.
    ///
    /// `params` are the query (and form body) parameters of the request;
    /// `url` must not contain a query string.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().to_string();

        self.sign(method, url, params, &nonce, &timestamp)
    }

    /// Deterministic signing with a caller-chosen nonce and timestamp.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let oauth_params = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut encoded: Vec<(String, String)> = params
            .iter()
            .chain(oauth_params.iter())
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        encoded.sort();

        let parameter_string = encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(url),
            encode(&parameter_string)
        );
        let signing_key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
            .map_err(|e| anyhow!("Invalid OAuth signing key: {}", e))?;
        mac.update(base_string.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let header = oauth_params
            .iter()
            .map(|(k, v)| (*k, *v))
            .chain(std::iter::once(("oauth_signature", signature.as_str())))
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }
}
