use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Twitter (OAuth 1.0a user context)
    pub twitter_api_key: String,
    pub twitter_api_secret: String,
    pub twitter_access_token: String,
    pub twitter_access_token_secret: String,
    pub twitter_api_url: String,

    // Google Cloud Translation (optional capability)
    pub translation_credentials: Option<PathBuf>,
    pub translate_api_url: String,

    // Corpus
    pub language: String,
    pub output_path: PathBuf,

    // HTTP
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            twitter_api_key: std::env::var("TWITTER_API_KEY")
                .context("TWITTER_API_KEY not set")?,
            twitter_api_secret: std::env::var("TWITTER_API_SECRET")
                .context("TWITTER_API_SECRET not set")?,
            twitter_access_token: std::env::var("TWITTER_ACCESS_TOKEN_KEY")
                .context("TWITTER_ACCESS_TOKEN_KEY not set")?,
            twitter_access_token_secret: std::env::var("TWITTER_ACCESS_TOKEN_SECRET")
                .context("TWITTER_ACCESS_TOKEN_SECRET not set")?,
            twitter_api_url: std::env::var("TWITTER_API_URL")
                .unwrap_or_else(|_| "https://api.twitter.com".to_string()),

            translation_credentials: std::env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            translate_api_url: std::env::var("TRANSLATE_API_URL").unwrap_or_else(|_| {
                "https://translation.googleapis.com/language/translate/v2".to_string()
            }),

            language: std::env::var("CORPUS_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            output_path: std::env::var("CORPUS_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/tweets")),

            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Translation is only available when a credential file is configured.
    pub fn translation_enabled(&self) -> bool {
        self.translation_credentials.is_some()
    }
}
