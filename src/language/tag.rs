//! Language tag: the caller-supplied language of a batch of posts.
//!
//! A tag is only a lowercase code. Whether anything can be done with it is
//! decided by the [`LanguageRegistry`](crate::language::LanguageRegistry).

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 639-1 style language code (e.g. "en", "fr").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parse a tag, folding it to lowercase.
    ///
    /// Accepts 2-8 ASCII letters. Unregistered codes such as "it" parse fine;
    /// they are rejected later by the operations that need a registered
    /// resource.
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() < 2 || code.len() > 8 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("Invalid language code: '{}'", code);
        }
        Ok(LanguageTag(code.to_ascii_lowercase()))
    }

    pub fn english() -> Self {
        LanguageTag("en".to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        LanguageTag::parse(s)
    }
}

impl TryFrom<String> for LanguageTag {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        LanguageTag::parse(&value)
    }
}

impl From<LanguageTag> for String {
    fn from(tag: LanguageTag) -> Self {
        tag.0
    }
}
