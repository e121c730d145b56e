use std::{
    fmt,
    sync::Arc,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::utils::{
        join_or_dash,
        RomajiReading,
        EMPTY_FIELD,
    },
    dictionary::{
        KanjiDetail,
        WordEntry,
    },
};

/// Position of a tile on the board, row-major.
pub type TileIndex = usize;
/// Shared by the two tiles of one kanji.
pub type PairId = usize;
/// Stable identity of a physical tile, independent of its position.
pub type CardId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Immutable content printed on both tiles of a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct KanjiPayload {
    pub kanji: String,
    pub meaning: String,
    pub kun: String,
    pub on: String,
    pub kun_romaji: String,
    pub on_romaji: String,
    pub name_readings: String,
    pub stroke_count: Option<u32>,
    pub grade: Option<u32>,
    pub jlpt: Option<u32>,
    pub heisig_keyword: String,
    pub frequency_rank: Option<u32>,
    pub unicode: String,
    pub compatibility_variant: Option<String>,
    pub notes: Vec<String>,
}

impl From<KanjiDetail> for KanjiPayload {
    fn from(detail: KanjiDetail) -> Self {
        let kun = join_or_dash(&detail.kun_readings);
        let on = join_or_dash(&detail.on_readings);

        Self {
            kun_romaji: kun.reading_romaji(),
            on_romaji: on.reading_romaji(),
            kanji: detail.kanji,
            meaning: join_or_dash(&detail.meanings),
            kun,
            on,
            name_readings: join_or_dash(&detail.name_readings),
            stroke_count: detail.stroke_count,
            grade: detail.grade,
            jlpt: detail.jlpt,
            heisig_keyword: detail.heisig_en.unwrap_or_else(|| EMPTY_FIELD.to_string()),
            frequency_rank: detail.freq_mainichi_shinbun,
            unicode: detail.unicode,
            compatibility_variant: detail.unihan_cjk_compatibility_variant,
            notes: detail.notes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    pub pair_id: PairId,
    pub payload: Arc<KanjiPayload>,
    /// Filled once, on demand, from the word cache.
    pub words: Option<Arc<Vec<WordEntry>>>,
}

impl Card {
    pub fn kanji(&self) -> &str {
        &self.payload.kanji
    }
}
