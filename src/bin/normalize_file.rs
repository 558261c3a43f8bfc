//! Normalize an already saved corpus file without touching any remote API.
//!
//! Usage:
//!   cargo run --bin normalize -- <input> [language] [output]
//!
//! `language` defaults to CORPUS_LANGUAGE or "en"; `output` defaults to
//! overwriting `input`. A ".json" suffix is appended to paths lacking one.

use anyhow::{Context, Result};
use tracing::info;
use tweet_corpus::{Collection, JsonFileStore, LanguageTag, LoadMode, Normalizer};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tweet_corpus=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("Usage: normalize <input> [language] [output]")?;
    let language = args
        .next()
        .or_else(|| std::env::var("CORPUS_LANGUAGE").ok())
        .unwrap_or_else(|| "en".to_string());
    let output = args.next().unwrap_or_else(|| input.clone());

    let language = LanguageTag::parse(&language)?;
    let source = JsonFileStore::new(&input);
    let target = JsonFileStore::new(&output);

    let mut collection = Collection::new();
    collection.load(&source, LoadMode::Replace)?;
    collection.normalize_all(&Normalizer::new(), &language)?;
    let path = collection.save(&target)?;

    info!("✓ Normalized {} posts into {}", collection.len(), path.display());
    Ok(())
}
