//! Languages the pipeline understands.
//!
//! - `tag`: the caller-supplied language code
//! - `registry`: process-wide registry of supported languages and their
//!   stopword sets

mod registry;
mod tag;

pub use registry::{LanguageConfig, LanguageRegistry, StopwordSet};
pub use tag::LanguageTag;
