use crate::collection::PostId;
use crate::config::Config;
use crate::oauth::OAuthCredentials;
use crate::retry::{is_retryable, with_retry_if, HttpStatusError, RetryConfig};
use anyhow::{Context, Result};
use chrono::DateTime;
use indexmap::IndexMap;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// `statuses/lookup` accepts at most this many ids per request.
pub const LOOKUP_BATCH_SIZE: usize = 100;

/// Resolves post identifiers to their text.
///
/// Ids that cannot be resolved (deleted, protected, malformed) are simply
/// missing from the returned map. An `Err` means the source itself failed.
pub trait PostSource {
    fn lookup(&self, ids: &[PostId]) -> impl Future<Output = Result<IndexMap<PostId, String>>> + Send;
}

#[derive(Debug, Deserialize)]
struct Status {
    id_str: String,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl Status {
    fn into_entry(self) -> Option<(PostId, String)> {
        let text = self.full_text.or(self.text)?;
        Some((self.id_str, text))
    }
}

/// Twitter REST v1.1 client for `statuses/lookup`.
pub struct TwitterClient {
    client: reqwest::Client,
    base_url: String,
    credentials: OAuthCredentials,
    retry: RetryConfig,
}

impl TwitterClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.twitter_api_url.trim_end_matches('/').to_string(),
            credentials: OAuthCredentials {
                consumer_key: config.twitter_api_key.clone(),
                consumer_secret: config.twitter_api_secret.clone(),
                token: config.twitter_access_token.clone(),
                token_secret: config.twitter_access_token_secret.clone(),
            },
            retry: RetryConfig::twitter_lookup(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn lookup_url(&self) -> String {
        format!("{}/1.1/statuses/lookup.json", self.base_url)
    }

    async fn lookup_batch(&self, ids: &[PostId]) -> Result<Vec<Status>> {
        let url = self.lookup_url();
        let joined = ids.join(",");
        let params = [
            ("id", joined.as_str()),
            ("tweet_mode", "extended"),
            ("include_entities", "false"),
        ];

        with_retry_if(
            &self.retry,
            &format!("Twitter lookup ({} ids)", ids.len()),
            || async {
                let authorization = self
                    .credentials
                    .authorization_header("GET", &url, &params)?;

                let response = self
                    .client
                    .get(&url)
                    .query(&params)
                    .header("Authorization", authorization)
                    .send()
                    .await
                    .context("Failed to send request to Twitter API")?;

                log_rate_limit(&response);

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    return Err(anyhow::Error::new(HttpStatusError {
                        service: "Twitter",
                        status,
                        body,
                    }));
                }

                let statuses = response
                    .json::<Vec<Status>>()
                    .await
                    .context("Failed to parse Twitter response")?;

                Ok(statuses)
            },
            is_retryable,
        )
        .await
    }
}

impl PostSource for TwitterClient {
    async fn lookup(&self, ids: &[PostId]) -> Result<IndexMap<PostId, String>> {
        let mut resolved = IndexMap::with_capacity(ids.len());

        for (index, batch) in ids.chunks(LOOKUP_BATCH_SIZE).enumerate() {
            debug!("Looking up batch {} ({} ids)", index + 1, batch.len());
            let statuses = self.lookup_batch(batch).await?;
            resolved.extend(statuses.into_iter().filter_map(Status::into_entry));
        }

        info!("Resolved {}/{} tweets", resolved.len(), ids.len());
        Ok(resolved)
    }
}

fn log_rate_limit(response: &reqwest::Response) {
    if let Some(remaining) = response.headers().get("x-rate-limit-remaining") {
        let limit = response
            .headers()
            .get("x-rate-limit-limit")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("?");
        let reset = response
            .headers()
            .get("x-rate-limit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|ts| ts.parse::<i64>().ok())
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "?".to_string());

        info!(
            "Twitter API rate limit: {}/{} remaining (resets at {})",
            remaining.to_str().unwrap_or("?"),
            limit,
            reset
        );
    }
}
