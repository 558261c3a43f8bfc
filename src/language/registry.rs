//! Language registry: the languages the corpus pipeline can work with.
//!
//! Each registered language carries its stopword set. The default registry is
//! built once on first access from lists embedded in the binary and is never
//! mutated afterwards, so it can be shared freely without locking.

use crate::error::CorpusError;
use crate::language::LanguageTag;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Immutable set of words dropped by the normalizer for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// Build a set from one word per line. Blank lines are ignored.
    pub fn from_lines(list: &str) -> Self {
        list.lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .collect()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for StopwordSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        StopwordSet {
            words: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

/// A registered language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "fr")
    pub code: String,

    /// English name of the language (e.g., "English", "French")
    pub name: String,

    pub stopwords: StopwordSet,
}

impl LanguageConfig {
    pub fn new(code: &str, name: &str, stopwords: StopwordSet) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            stopwords,
        }
    }
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// The process-wide registry holding the built-in languages.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry::new(default_languages()))
    }

    /// Build a standalone registry, e.g. to inject custom stopword lists.
    pub fn new(languages: Vec<LanguageConfig>) -> Self {
        Self { languages }
    }

    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Look up a tag, failing with `UnsupportedLanguage` when it is not registered.
    pub fn require(&self, tag: &LanguageTag) -> Result<&LanguageConfig, CorpusError> {
        self.get_by_code(tag.code())
            .ok_or_else(|| CorpusError::UnsupportedLanguage(tag.code().to_string()))
    }

    pub fn stopwords(&self, tag: &LanguageTag) -> Result<&StopwordSet, CorpusError> {
        self.require(tag).map(|config| &config.stopwords)
    }

    pub fn is_supported(&self, tag: &LanguageTag) -> bool {
        self.get_by_code(tag.code()).is_some()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.languages.iter().map(|lang| lang.code.as_str()).collect()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig::new(
            "en",
            "English",
            StopwordSet::from_lines(include_str!("stopwords/english.txt")),
        ),
        LanguageConfig::new(
            "fr",
            "French",
            StopwordSet::from_lines(include_str!("stopwords/french.txt")),
        ),
        LanguageConfig::new(
            "de",
            "German",
            StopwordSet::from_lines(include_str!("stopwords/german.txt")),
        ),
        LanguageConfig::new(
            "es",
            "Spanish",
            StopwordSet::from_lines(include_str!("stopwords/spanish.txt")),
        ),
    ]
}
