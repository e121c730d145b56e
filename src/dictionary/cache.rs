use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        PoisonError,
    },
};

use futures::{
    future::{
        BoxFuture,
        Shared,
    },
    FutureExt,
};

use super::{
    types::WordEntry,
    DictionaryService,
};

type SharedWords = Shared<BoxFuture<'static, Arc<Vec<WordEntry>>>>;

/// Per-kanji word lists with at most one outstanding fetch per kanji.
///
/// The first caller for a kanji starts the fetch; every later caller, whether
/// it arrives while the fetch is in flight or after it finished, awaits the
/// same shared future and receives the same `Arc`. Fetch failures resolve to
/// an empty list and are never retried.
pub struct WordCache<D: DictionaryService> {
    dictionary: Arc<D>,
    entries: Mutex<HashMap<String, SharedWords>>,
}

impl<D: DictionaryService> WordCache<D> {
    pub fn new(dictionary: Arc<D>) -> Self {
        Self { dictionary, entries: Mutex::new(HashMap::new()) }
    }

    pub async fn get(&self, kanji: &str) -> Arc<Vec<WordEntry>> {
        let fetch = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(kanji.to_string())
                .or_insert_with(|| {
                    log::debug!("Word cache miss for {}", kanji);
                    self.fetch(kanji.to_string())
                })
                .clone()
        };

        fetch.await
    }

    /// The cached word list, if a fetch for `kanji` has completed.
    pub fn cached(&self, kanji: &str) -> Option<Arc<Vec<WordEntry>>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(kanji).and_then(|fetch| fetch.peek().cloned())
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn fetch(&self, kanji: String) -> SharedWords {
        let dictionary = self.dictionary.clone();

        async move {
            match dictionary.get_words(&kanji).await {
                Ok(words) => {
                    log::debug!("Fetched {} words for {}", words.len(), kanji);
                    Arc::new(words)
                }
                Err(e) => {
                    log::warn!("{}; showing no entries", e);
                    Arc::new(Vec::new())
                }
            }
        }
        .boxed()
        .shared()
    }
}
