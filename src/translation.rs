use crate::config::Config;
use crate::language::LanguageTag;
use crate::retry::{is_retryable, with_retry_if, HttpStatusError, RetryConfig};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Translates text into English.
///
/// Implementations own their retry policy; an `Err` is final.
pub trait Translator {
    fn translate(&self, text: &str, source: &LanguageTag) -> impl Future<Output = Result<String>> + Send;
}

/// Google Cloud Translation v2 request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Contents of the credential file pointed to by `GOOGLE_APPLICATION_CREDENTIALS`.
///
/// Normally a service-account key as downloaded from the Cloud console. An
/// API key or an already-minted OAuth access token are accepted too.
#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    client_email: Option<String>,
    #[serde(default)]
    private_key: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TRANSLATE_SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for minted tokens (the maximum Google allows).
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the cached token expires.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Service-account identity used to mint access tokens (RS256 JWT-bearer grant).
#[derive(Clone)]
struct ServiceAccount {
    client_email: String,
    token_uri: String,
    key: EncodingKey,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl ServiceAccount {
    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: TRANSLATE_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .context("Failed to sign service account assertion")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum Auth {
    ApiKey(String),
    Bearer(String),
    ServiceAccount(ServiceAccount),
}

fn load_auth(path: &Path) -> Result<Auth> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read translation credentials {}", path.display()))?;
    let file: CredentialFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse translation credentials {}", path.display()))?;

    if let Some(key) = file.api_key.filter(|k| !k.is_empty()) {
        return Ok(Auth::ApiKey(key));
    }
    if let Some(token) = file.access_token.filter(|t| !t.is_empty()) {
        return Ok(Auth::Bearer(token));
    }

    match (file.client_email, file.private_key) {
        (Some(client_email), Some(private_key)) => {
            let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).with_context(|| {
                format!("Invalid private key in translation credentials {}", path.display())
            })?;
            Ok(Auth::ServiceAccount(ServiceAccount {
                client_email,
                token_uri: file
                    .token_uri
                    .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
                key,
            }))
        }
        _ => bail!(
            "Translation credentials {} contain no service account key, \"api_key\" or \"access_token\"",
            path.display()
        ),
    }
}

/// Translator backed by the Google Cloud Translation v2 REST API. The target
/// language is always English.
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
    auth: Auth,
    token: Mutex<Option<CachedToken>>,
    retry: RetryConfig,
}

impl GoogleTranslator {
    /// Build from config; fails when no credential file is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let path = config
            .translation_credentials
            .as_deref()
            .context("GOOGLE_APPLICATION_CREDENTIALS not set")?;

        Self::from_credentials_file(path, &config.translate_api_url, config.http_timeout_secs)
    }

    pub fn from_credentials_file(path: &Path, api_url: &str, timeout_secs: u64) -> Result<Self> {
        let auth = load_auth(path)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            auth,
            token: Mutex::new(None),
            retry: RetryConfig::translation(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Return a cached access token, minting a new one when it is missing or
    /// about to expire.
    async fn access_token(&self, account: &ServiceAccount) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let assertion = account.assertion(now)?;
        let response = self
            .client
            .post(&account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("Failed to request access token")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(anyhow::Error::new(HttpStatusError {
                service: "OAuth token",
                status,
                body,
            }));
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse access token response")?;
        let lifetime = token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);
        debug!("Minted access token for {} ({}s)", account.client_email, lifetime);

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + chrono::Duration::seconds(lifetime),
        });
        Ok(token.access_token)
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &LanguageTag) -> Result<String> {
        // Nothing to do for English or for text the normalizer emptied.
        if source.is_english() || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = TranslateRequest {
            q: text,
            source: source.code(),
            target: "en",
            format: "text",
        };

        with_retry_if(
            &self.retry,
            &format!("Translation from {}", source),
            || async {
                let mut builder = self.client.post(&self.api_url).json(&request);
                builder = match &self.auth {
                    Auth::ApiKey(key) => builder.query(&[("key", key.as_str())]),
                    Auth::Bearer(token) => builder.bearer_auth(token),
                    Auth::ServiceAccount(account) => {
                        builder.bearer_auth(self.access_token(account).await?)
                    }
                };

                let response = builder
                    .send()
                    .await
                    .context("Failed to send request to translation API")?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    return Err(anyhow::Error::new(HttpStatusError {
                        service: "Translation",
                        status,
                        body,
                    }));
                }

                let parsed: TranslateResponse = response
                    .json()
                    .await
                    .context("Failed to parse translation response")?;

                let translated = parsed
                    .data
                    .translations
                    .into_iter()
                    .next()
                    .map(|t| t.translated_text)
                    .context("Translation response contained no translations")?;

                debug!("Translated {} chars from {}", text.len(), source);
                Ok(translated)
            },
            is_retryable,
        )
        .await
    }
}
