pub mod collection;
pub mod config;
pub mod error;
pub mod language;
pub mod normalizer;
pub mod oauth;
pub mod retry;
pub mod store;
pub mod translation;
pub mod twitter;

pub use collection::{Collection, LoadMode, PostId, PostRecord};
pub use error::CorpusError;
pub use language::{LanguageRegistry, LanguageTag};
pub use normalizer::Normalizer;
pub use store::{CorpusStore, JsonFileStore};
pub use translation::{GoogleTranslator, Translator};
pub use twitter::{PostSource, TwitterClient};
