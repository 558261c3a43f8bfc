//! The tweet collection: an insertion-ordered map from post id to text.
//!
//! Text is replaced in place by the normalize and translate passes; ids never
//! change. Absence of an id only means the post was never fetched or has been
//! removed.

use crate::error::CorpusError;
use crate::language::{LanguageRegistry, LanguageTag};
use crate::normalizer::Normalizer;
use crate::store::{self, CorpusStore};
use crate::translation::Translator;
use crate::twitter::PostSource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Opaque post identifier, kept as the decimal string Twitter returns in `id_str`.
pub type PostId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub text: String,
}

/// How loaded records combine with what is already in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Drop current entries first.
    Replace,
    /// Keep current entries; loaded records overwrite entries with the same id.
    #[default]
    Merge,
}

#[derive(Debug, Clone, Default)]
pub struct Collection {
    posts: IndexMap<PostId, String>,
}

/// Equal when both hold the same entries in the same order.
impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.posts.len() == other.posts.len() && self.posts.iter().eq(other.posts.iter())
    }
}

impl Eq for Collection {}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.posts.contains_key(id)
    }

    /// Ids in insertion order. Call again to restart.
    pub fn iter(&self) -> impl Iterator<Item = &PostId> + '_ {
        self.posts.keys()
    }

    /// `(id, text)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&PostId, &String)> + '_ {
        self.posts.iter()
    }

    pub fn records(&self) -> Vec<PostRecord> {
        self.entries()
            .map(|(id, text)| PostRecord {
                id: id.clone(),
                text: text.clone(),
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<&str, CorpusError> {
        self.posts
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| CorpusError::NotFound(id.to_string()))
    }

    /// Insert or overwrite a single entry. An existing id keeps its position.
    pub fn insert(&mut self, id: impl Into<PostId>, text: impl Into<String>) {
        self.posts.insert(id.into(), text.into());
    }

    /// Fetch `ids` from `source` and store every id it resolves.
    ///
    /// Unresolved ids are left out without error. Returns how many entries
    /// were written.
    pub async fn add<S: PostSource>(
        &mut self,
        source: &S,
        ids: &[PostId],
    ) -> Result<usize, CorpusError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let resolved = source
            .lookup(ids)
            .await
            .map_err(|e| CorpusError::Ingestion(e.into()))?;

        let missing = ids.iter().filter(|id| !resolved.contains_key(*id)).count();
        if missing > 0 {
            debug!("{} of {} requested posts could not be resolved", missing, ids.len());
        }

        let added = resolved.len();
        self.posts.extend(resolved);
        info!("Added {} posts ({} total)", added, self.len());
        Ok(added)
    }

    /// Remove `ids`; ids that are not present are ignored. Remaining entries
    /// keep their relative order. Returns how many entries were removed.
    pub fn remove<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for id in ids {
            if self.posts.shift_remove(id.as_ref()).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn reset(&mut self) {
        self.posts.clear();
    }

    /// Move every entry of `other` into this collection. Shared ids take the
    /// text from `other` and keep their current position; new ids are appended.
    pub fn merge(&mut self, other: Collection) {
        self.posts.extend(other.posts);
    }

    /// Replace every text with its normalized form.
    ///
    /// The language is checked before anything is touched, so an unsupported
    /// tag leaves the collection unchanged.
    pub fn normalize_all(
        &mut self,
        normalizer: &Normalizer<'_>,
        language: &LanguageTag,
    ) -> Result<(), CorpusError> {
        normalizer.check_language(language)?;

        for text in self.posts.values_mut() {
            *text = normalizer.normalize(text, language)?;
        }

        info!("Normalized {} posts ({})", self.len(), language);
        Ok(())
    }

    /// Translate every text from `language` into English.
    ///
    /// `language` must be registered in `registry`. All-or-nothing:
    /// translations are staged and only written back once every entry
    /// succeeded. The first failure aborts the batch and leaves the
    /// collection exactly as it was.
    pub async fn translate_all<T: Translator>(
        &mut self,
        translator: &T,
        registry: &LanguageRegistry,
        language: &LanguageTag,
    ) -> Result<(), CorpusError> {
        registry.require(language)?;

        let mut staged = Vec::with_capacity(self.len());
        for (id, text) in &self.posts {
            match translator.translate(text, language).await {
                Ok(translated) => staged.push(translated),
                Err(e) => {
                    warn!(
                        "Translation of post {} failed, discarding {} staged translations",
                        id,
                        staged.len()
                    );
                    return Err(CorpusError::Translation {
                        id: id.clone(),
                        source: e.into(),
                    });
                }
            }
        }

        for (text, translated) in self.posts.values_mut().zip(staged) {
            *text = translated;
        }

        info!("Translated {} posts from {} to en", self.len(), language);
        Ok(())
    }

    /// Serialize to the on-disk JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        store::encode(self)
    }

    pub fn save<S: CorpusStore>(&self, store: &S) -> Result<PathBuf, CorpusError> {
        store.save(self)
    }

    /// Load a snapshot from `store`. Returns the number of records read.
    pub fn load<S: CorpusStore>(&mut self, store: &S, mode: LoadMode) -> Result<usize, CorpusError> {
        let records = store.load()?;
        let count = records.len();

        if mode == LoadMode::Replace {
            self.reset();
        }
        self.posts
            .extend(records.into_iter().map(|record| (record.id, record.text)));

        Ok(count)
    }
}

impl FromIterator<PostRecord> for Collection {
    fn from_iter<I: IntoIterator<Item = PostRecord>>(iter: I) -> Self {
        Self {
            posts: iter.into_iter().map(|r| (r.id, r.text)).collect(),
        }
    }
}
