use serde::{
    Deserialize,
    Serialize,
};

/// Kanji metadata as served by `/kanji/{glyph}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanjiDetail {
    pub kanji: String,
    #[serde(default)]
    pub meanings: Vec<String>,
    #[serde(default)]
    pub kun_readings: Vec<String>,
    #[serde(default)]
    pub on_readings: Vec<String>,
    #[serde(default)]
    pub name_readings: Vec<String>,
    pub stroke_count: Option<u32>,
    pub grade: Option<u32>,
    pub jlpt: Option<u32>,
    pub heisig_en: Option<String>,
    pub freq_mainichi_shinbun: Option<u32>,
    #[serde(default)]
    pub unicode: String,
    pub unihan_cjk_compatibility_variant: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordVariant {
    pub written: String,
    pub pronounced: String,
    #[serde(default)]
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMeaning {
    #[serde(default)]
    pub glosses: Vec<String>,
}

/// One dictionary word containing a kanji, as served by `/words/{glyph}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(default)]
    pub variants: Vec<WordVariant>,
    #[serde(default)]
    pub meanings: Vec<WordMeaning>,
}

impl WordEntry {
    pub fn headword(&self) -> Option<&WordVariant> {
        self.variants.first()
    }

    pub fn glosses(&self) -> Vec<&str> {
        self.meanings.iter().flat_map(|m| m.glosses.iter().map(String::as_str)).collect()
    }
}
