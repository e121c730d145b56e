use std::time::Duration;

use reqwest::Client;

use super::{
    types::{
        KanjiDetail,
        WordEntry,
    },
    DictionaryService,
};
use crate::core::{
    http::{
        self,
        Fetched,
    },
    GameError,
};

pub const DEFAULT_API_BASE_URL: &str = "https://kanjiapi.dev/v1";

/// Dictionary service backed by the kanjiapi.dev REST API.
#[derive(Debug, Clone)]
pub struct KanjiApiClient {
    client: Client,
    base_url: String,
}

impl KanjiApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GameError> {
        Ok(Self {
            client: http::http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl DictionaryService for KanjiApiClient {
    async fn list_kanji(&self, set_id: &str) -> Result<Vec<String>, GameError> {
        let data_load = |reason: String| GameError::DataLoad { set: set_id.to_string(), reason };

        let resp = match http::get(&self.client, &self.url(&format!("kanji/{set_id}"))).await {
            Ok(Fetched::Found(resp)) => resp,
            Ok(Fetched::NotFound) => return Err(data_load("HTTP error 404".to_string())),
            Err(e) => return Err(data_load(e)),
        };

        let kanji: Vec<String> = resp.json().await.map_err(|e| data_load(e.to_string()))?;
        if kanji.is_empty() {
            return Err(data_load("API returned an empty list of kanji for this set".to_string()));
        }

        log::info!("Loaded {} kanji for set '{}'", kanji.len(), set_id);
        Ok(kanji)
    }

    async fn get_kanji_detail(&self, glyph: &str) -> Result<KanjiDetail, GameError> {
        let resp = match http::get(&self.client, &self.url(&format!("kanji/{glyph}"))).await {
            Ok(Fetched::Found(resp)) => resp,
            Ok(Fetched::NotFound) => {
                return Err(GameError::DetailFetch(format!("Failed to fetch details for {glyph}")))
            }
            Err(e) => return Err(GameError::DetailFetch(e)),
        };

        resp.json::<KanjiDetail>()
            .await
            .map_err(|e| GameError::DetailFetch(format!("Invalid details for {glyph}: {e}")))
    }

    async fn get_words(&self, glyph: &str) -> Result<Vec<WordEntry>, GameError> {
        let word_fetch = |reason: String| GameError::WordFetch { kanji: glyph.to_string(), reason };

        match http::get(&self.client, &self.url(&format!("words/{glyph}"))).await {
            Ok(Fetched::Found(resp)) => resp.json().await.map_err(|e| word_fetch(e.to_string())),
            Ok(Fetched::NotFound) => Ok(Vec::new()),
            Err(e) => Err(word_fetch(e)),
        }
    }
}
