use std::future::Future;

use crate::core::GameError;

pub mod api;
pub mod builtin;
pub mod cache;
pub mod sets;
pub mod types;

pub use api::{
    KanjiApiClient,
    DEFAULT_API_BASE_URL,
};
pub use builtin::BuiltinDictionary;
pub use cache::WordCache;
pub use sets::KanjiSet;
pub use types::{
    KanjiDetail,
    WordEntry,
    WordMeaning,
    WordVariant,
};

/// Source of kanji lists, kanji metadata and vocabulary.
pub trait DictionaryService: Send + Sync + 'static {
    /// Glyphs in the named set. An empty set is an error.
    fn list_kanji(
        &self,
        set_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, GameError>> + Send;

    fn get_kanji_detail(
        &self,
        glyph: &str,
    ) -> impl Future<Output = Result<KanjiDetail, GameError>> + Send;

    /// Words containing the glyph. "Not found" is an empty list, not an error.
    fn get_words(&self, glyph: &str) -> impl Future<Output = Result<Vec<WordEntry>, GameError>> + Send;
}
