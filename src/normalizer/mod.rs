//! Text normalization for tweets.
//!
//! Turns raw tweet text into a space-separated string of lowercase content
//! tokens. The stages run in a fixed order and every stage sees the output of
//! the previous one, so reordering them changes results:
//!
//! 1. strip character entities (`&amp;`)
//! 2. strip tickers (`$TSLA`)
//! 3. strip hyperlinks of the shape `http(s)://.../word`
//! 4. strip hashtags
//! 5. replace ASCII punctuation (except `@`) with a space
//! 6. drop words of one or two characters
//! 7. collapse whitespace runs and strip leading spaces
//! 8. drop characters outside the Basic Multilingual Plane
//! 9. tokenize (lowercase, reduce lengthening, strip handles)
//! 10. drop stopwords of the given language
//! 11. join with single spaces

mod tokenizer;

pub use tokenizer::{reduce_lengthening, remove_handles, TweetTokenizer};

use crate::error::CorpusError;
use crate::language::{LanguageRegistry, LanguageTag};
use regex::Regex;
use std::sync::OnceLock;

static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static TICKER_REGEX: OnceLock<Regex> = OnceLock::new();
static HYPERLINK_REGEX: OnceLock<Regex> = OnceLock::new();
static HASHTAG_REGEX: OnceLock<Regex> = OnceLock::new();
static PUNCTUATION_REGEX: OnceLock<Regex> = OnceLock::new();
static SHORT_WORD_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

const MAX_BMP: char = '\u{FFFF}';

#[derive(Clone, Copy)]
pub struct Normalizer<'a> {
    registry: &'a LanguageRegistry,
    tokenizer: TweetTokenizer,
}

impl Normalizer<'static> {
    /// Normalizer backed by the process-wide language registry.
    pub fn new() -> Self {
        Self::with_registry(LanguageRegistry::get())
    }
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Normalizer<'a> {
    pub fn with_registry(registry: &'a LanguageRegistry) -> Self {
        Self {
            registry,
            tokenizer: TweetTokenizer::for_normalization(),
        }
    }

    /// Fail with `UnsupportedLanguage` unless `language` has a stopword set.
    pub fn check_language(&self, language: &LanguageTag) -> Result<(), CorpusError> {
        self.registry.stopwords(language).map(|_| ())
    }

    /// Run the full pipeline over `text`.
    ///
    /// Total over any input: text with nothing left after filtering yields an
    /// empty string. The language is validated before any work is done.
    pub fn normalize(&self, text: &str, language: &LanguageTag) -> Result<String, CorpusError> {
        let stopwords = self.registry.stopwords(language)?;

        let cleaned = strip_noise(text);
        let tokens: Vec<String> = self
            .tokenizer
            .tokenize(&cleaned)
            .into_iter()
            .filter(|token| !stopwords.contains(token))
            .collect();

        Ok(tokens.join(" "))
    }
}

fn cached<'r>(cell: &'r OnceLock<Regex>, pattern: &str) -> &'r Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Stages 1-8: the language-independent cleanup before tokenization.
pub fn strip_noise(text: &str) -> String {
    let text = cached(&ENTITY_REGEX, r"&\w*;").replace_all(text, "");
    let text = cached(&TICKER_REGEX, r"\$\w*").replace_all(&text, "");
    // Deliberately narrow: only links ending in "/word" are removed.
    let text = cached(&HYPERLINK_REGEX, r"https?://.*/\w*").replace_all(&text, "");
    let text = cached(&HASHTAG_REGEX, r"#\w*").replace_all(&text, "");
    let text = cached(
        &PUNCTUATION_REGEX,
        r##"[!"#$%&'()*+,\-./:;<=>?\[\\\]^_`{|}~]+"##,
    )
    .replace_all(&text, " ");
    let text = cached(&SHORT_WORD_REGEX, r"\b\w{1,2}\b").replace_all(&text, "");
    let text = cached(&WHITESPACE_REGEX, r"\s\s+").replace_all(&text, " ");

    text.trim_start_matches(' ')
        .chars()
        .filter(|&c| c <= MAX_BMP)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{LanguageConfig, StopwordSet};
    use proptest::prelude::*;

    const SAMPLE: &str = "    RT @Amila #Test\nTom's newly listed Co. &amp; Mary's unlisted     Group to supply tech for nlTK.\nh.. $TSLA $AAPL https://t.co/x34afsfQsh";

    fn en() -> LanguageTag {
        LanguageTag::english()
    }

    // ==================== Full Pipeline Tests ====================

    #[test]
    fn test_normalize_sample_tweet() {
        let out = Normalizer::new().normalize(SAMPLE, &en()).expect("Should normalize");

        assert!(!out.contains("&amp;"));
        assert!(!out.contains("$TSLA"));
        assert!(!out.contains("tsla"));
        assert!(!out.contains("#Test"));
        assert!(!out.contains("@Amila"));
        assert!(!out.contains("amila"));
        assert!(!out.contains("x34afsfqsh"));
        assert_eq!(out, "tom newly listed mary unlisted group supply tech nltk");
    }

    #[test]
    fn test_normalize_is_idempotent_on_clean_text() {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize(SAMPLE, &en()).unwrap();
        let twice = normalizer.normalize(&once, &en()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_unsupported_language() {
        let tag = LanguageTag::parse("it").unwrap();
        let err = Normalizer::new().normalize(SAMPLE, &tag).unwrap_err();
        assert!(matches!(err, CorpusError::UnsupportedLanguage(code) if code == "it"));
    }

    #[test]
    fn test_normalize_empty_and_punctuation_only() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("", &en()).unwrap(), "");
        assert_eq!(normalizer.normalize("!!! ... ???", &en()).unwrap(), "");
        assert_eq!(normalizer.normalize("the and of", &en()).unwrap(), "");
    }

    #[test]
    fn test_normalize_reduces_lengthening() {
        let out = Normalizer::new().normalize("waaaaayyyy cool", &en()).unwrap();
        assert_eq!(out, "waaayyy cool");
    }

    #[test]
    fn test_normalize_drops_emoji() {
        let out = Normalizer::new().normalize("party time 🎉🎉 tonight", &en()).unwrap();
        assert_eq!(out, "party time tonight");
    }

    #[test]
    fn test_normalize_french_stopwords() {
        let fr = LanguageTag::parse("fr").unwrap();
        let out = Normalizer::new()
            .normalize("Nous sommes dans la maison avec les enfants", &fr)
            .unwrap();
        assert_eq!(out, "maison enfants");
    }

    #[test]
    fn test_normalize_spanish_stopwords() {
        let es = LanguageTag::parse("es").unwrap();
        let out = Normalizer::new()
            .normalize("También tenemos noticias para todos", &es)
            .unwrap();
        assert_eq!(out, "noticias");
    }

    #[test]
    fn test_normalize_splits_emoticon_from_word() {
        let out = Normalizer::new().normalize("meeting 8pm tonight", &en()).unwrap();
        assert_eq!(out, "meeting 8p tonight");
    }

    #[test]
    fn test_normalize_splits_long_digit_run() {
        let out = Normalizer::new().normalize("call 5551234567890 now", &en()).unwrap();
        assert_eq!(out, "call 5551234567 890");
    }

    #[test]
    fn test_normalize_with_custom_registry() {
        let registry = LanguageRegistry::new(vec![LanguageConfig::new(
            "en",
            "English",
            StopwordSet::from_lines("rust"),
        )]);
        let out = Normalizer::with_registry(&registry)
            .normalize("Rust makes systems fun", &en())
            .unwrap();
        assert_eq!(out, "makes systems fun");
    }

    // ==================== Stage Tests ====================

    #[test]
    fn test_strip_noise_entities_and_tickers() {
        assert_eq!(strip_noise("cats &amp; dogs $AAPL rally"), "cats dogs rally");
    }

    #[test]
    fn test_strip_noise_link_without_path_is_kept_as_words() {
        // No "/word" tail, so the hyperlink stage leaves it and punctuation
        // splitting turns it into plain words.
        assert_eq!(strip_noise("see https://example.com now"), "see https example com now");
    }

    #[test]
    fn test_strip_noise_link_match_is_greedy_within_line() {
        let text = "read https://t.co/abc more https://x.io/y end\nnext line";
        assert_eq!(strip_noise(text), "read end\nnext line");
    }

    #[test]
    fn test_strip_noise_keeps_at_sign() {
        assert_eq!(strip_noise("hey, @someone!"), "hey @someone ");
    }

    #[test]
    fn test_strip_noise_removes_short_words() {
        assert_eq!(strip_noise("I am on it now"), "now");
    }

    #[test]
    fn test_strip_noise_strips_all_leading_spaces() {
        assert_eq!(strip_noise("   \n  hello"), "hello");
    }

    #[test]
    fn test_strip_noise_drops_supplementary_plane() {
        assert_eq!(strip_noise("math 𝔸𝔹ℂ done"), "math ℂ done");
    }

    // ==================== Properties ====================

    proptest! {
        #[test]
        fn prop_normalize_is_total_and_deterministic(text in any::<String>()) {
            let normalizer = Normalizer::new();
            let first = normalizer.normalize(&text, &en()).unwrap();
            let second = normalizer.normalize(&text, &en()).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.contains("  "));
            prop_assert!(!first.starts_with(' ') && !first.ends_with(' '));
            prop_assert!(!first.chars().any(|c| c.is_ascii_punctuation() && c != '@'));
        }
    }
}
