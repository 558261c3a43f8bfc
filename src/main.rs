//! Fetch tweets by id, normalize them and save the corpus as JSON.
//!
//! Usage:
//!   cargo run -- [--merge] [--raw] [--translate] <tweet id>...
//!
//! Flags:
//! - `--merge`      keep the posts already in the output file
//! - `--raw`        skip normalization
//! - `--translate`  translate the corpus to English (needs GOOGLE_APPLICATION_CREDENTIALS)
//!
//! Required environment variables:
//! - TWITTER_API_KEY, TWITTER_API_SECRET
//! - TWITTER_ACCESS_TOKEN_KEY, TWITTER_ACCESS_TOKEN_SECRET
//!
//! Optional:
//! - CORPUS_LANGUAGE (defaults to en)
//! - CORPUS_OUTPUT (defaults to data/tweets, ".json" is appended)
//! - GOOGLE_APPLICATION_CREDENTIALS, TRANSLATE_API_URL

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tweet_corpus::config::Config;
use tweet_corpus::{
    Collection, GoogleTranslator, JsonFileStore, LanguageRegistry, LanguageTag, LoadMode,
    Normalizer, PostId, PostSource, Translator, TwitterClient,
};

#[derive(Debug, Default)]
struct Args {
    merge: bool,
    raw: bool,
    translate: bool,
    ids: Vec<PostId>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    for arg in args {
        match arg.as_str() {
            "--merge" => parsed.merge = true,
            "--raw" => parsed.raw = true,
            "--translate" => parsed.translate = true,
            flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
            id => parsed.ids.push(id.to_string()),
        }
    }
    Ok(parsed)
}

/// Fetch `args.ids`, run the requested passes over those posts only, then lay
/// them over `snapshot` when one is given. Saved posts were processed by an
/// earlier run and are never normalized or translated again.
async fn build_corpus<S: PostSource, T: Translator>(
    args: &Args,
    source: &S,
    translator: Option<&T>,
    language: &LanguageTag,
    snapshot: Option<&JsonFileStore>,
) -> Result<Collection> {
    // Step 1: Fetch tweets
    info!("Fetching {} tweets", args.ids.len());
    let mut fresh = Collection::new();
    let added = fresh.add(source, &args.ids).await?;
    if added < args.ids.len() {
        warn!("{} tweets could not be fetched", args.ids.len() - added);
    }

    // Step 2: Normalize
    if !args.raw {
        info!("Normalizing {} new posts ({})", fresh.len(), language);
        fresh.normalize_all(&Normalizer::new(), language)?;
    }

    // Step 3: Translate (optional capability)
    if let Some(translator) = translator {
        info!("Translating {} new posts from {} to en", fresh.len(), language);
        fresh
            .translate_all(translator, LanguageRegistry::get(), language)
            .await?;
    }

    // Step 4: Merge with the saved corpus
    let Some(store) = snapshot else {
        return Ok(fresh);
    };
    let mut corpus = Collection::new();
    let loaded = corpus.load(store, LoadMode::Replace)?;
    info!("Loaded {} existing posts from {}", loaded, store.path().display());
    corpus.merge(fresh);
    Ok(corpus)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tweet_corpus=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.ids.is_empty() {
        bail!("No tweet ids given. Usage: tweet-corpus [--merge] [--raw] [--translate] <id>...");
    }

    let config = Config::from_env()?;
    let language = LanguageTag::parse(&config.language).context("Invalid CORPUS_LANGUAGE")?;
    let store = JsonFileStore::new(&config.output_path);

    let twitter = TwitterClient::new(&config)?;
    let translator = if args.translate {
        if !config.translation_enabled() {
            bail!("--translate requires GOOGLE_APPLICATION_CREDENTIALS");
        }
        Some(GoogleTranslator::new(&config)?)
    } else {
        None
    };
    let snapshot = (args.merge && store.path().exists()).then_some(&store);

    let corpus = build_corpus(&args, &twitter, translator.as_ref(), &language, snapshot).await?;

    // Step 5: Save
    let path = corpus.save(&store)?;
    info!("✓ Saved {} posts to {}", corpus.len(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FakeSource;

    impl PostSource for FakeSource {
        async fn lookup(&self, ids: &[PostId]) -> Result<IndexMap<PostId, String>> {
            Ok(ids
                .iter()
                .map(|id| (id.clone(), format!("Bonjour les amis numero {}", id)))
                .collect())
        }
    }

    /// Uppercases text and counts calls.
    #[derive(Default)]
    struct CountingTranslator {
        calls: AtomicUsize,
    }

    impl Translator for CountingTranslator {
        async fn translate(&self, text: &str, _source: &LanguageTag) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.to_uppercase())
        }
    }

    fn args(raw: &[&str]) -> Result<Args> {
        parse_args(raw.iter().map(|s| s.to_string()))
    }

    fn fr() -> LanguageTag {
        LanguageTag::parse("fr").unwrap()
    }

    fn keys(collection: &Collection) -> Vec<&str> {
        collection.iter().map(String::as_str).collect()
    }

    // ==================== Argument Tests ====================

    #[test]
    fn test_parse_args_ids_and_flags() {
        let parsed = args(&["--translate", "1344871397026361345", "--merge", "42"]).unwrap();
        assert!(parsed.translate);
        assert!(parsed.merge);
        assert!(!parsed.raw);
        assert_eq!(parsed.ids, vec!["1344871397026361345", "42"]);
    }

    #[test]
    fn test_parse_args_unknown_flag() {
        let err = args(&["--fast", "1"]).unwrap_err();
        assert!(err.to_string().contains("--fast"));
    }

    #[test]
    fn test_parse_args_empty() {
        let parsed = args(&[]).unwrap();
        assert!(parsed.ids.is_empty());
    }

    // ==================== Corpus Flow Tests ====================

    #[tokio::test]
    async fn test_build_corpus_processes_fresh_posts() {
        let parsed = args(&["--translate", "7"]).unwrap();
        let translator = CountingTranslator::default();

        let corpus = build_corpus(&parsed, &FakeSource, Some(&translator), &fr(), None)
            .await
            .unwrap();

        assert_eq!(corpus.get("7").unwrap(), "BONJOUR AMIS NUMERO");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_build_corpus_merge_leaves_saved_posts_alone() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("tweets"));

        let mut saved = Collection::new();
        saved.insert("1", "already translated pq");
        saved.insert("2", "stale text");
        saved.save(&store).unwrap();

        let parsed = args(&["--merge", "--translate", "2", "3"]).unwrap();
        let translator = CountingTranslator::default();

        let corpus = build_corpus(&parsed, &FakeSource, Some(&translator), &fr(), Some(&store))
            .await
            .unwrap();

        assert_eq!(keys(&corpus), vec!["1", "2", "3"]);
        assert_eq!(corpus.get("1").unwrap(), "already translated pq");
        assert_eq!(corpus.get("2").unwrap(), "BONJOUR AMIS NUMERO");
        assert_eq!(corpus.get("3").unwrap(), "BONJOUR AMIS NUMERO");
        // Only the two fetched posts reached the translator.
        assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_build_corpus_raw_skips_normalization() {
        let parsed = args(&["--raw", "5"]).unwrap();

        let corpus = build_corpus(&parsed, &FakeSource, None::<&CountingTranslator>, &fr(), None)
            .await
            .unwrap();

        assert_eq!(corpus.get("5").unwrap(), "Bonjour les amis numero 5");
    }
}
