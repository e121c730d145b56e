use super::{
    types::{
        KanjiDetail,
        WordEntry,
    },
    DictionaryService,
};
use crate::core::{
    utils::codepoint_hex,
    GameError,
};

// (kanji, meanings, on-yomi, kun-yomi, strokes, grade)
const BUILTIN_KANJI: &[(&str, &str, &str, &str, u32, u32)] = &[
    ("一", "one", "イチ,イツ", "ひと-,ひと.つ", 1, 1),
    ("二", "two", "ニ,ジ", "ふた,ふた.つ", 2, 1),
    ("三", "three", "サン,ゾウ", "み,み.つ,みっ.つ", 3, 1),
    ("四", "four", "シ", "よ,よ.つ,よっ.つ,よん", 5, 1),
    ("五", "five", "ゴ", "いつ,いつ.つ", 4, 1),
    ("六", "six", "ロク,リク", "む,む.つ,むっ.つ,むい", 4, 1),
    ("七", "seven", "シチ", "なな,なな.つ,なの", 2, 1),
    ("八", "eight", "ハチ", "や,や.つ,やっ.つ,よう", 2, 1),
    ("九", "nine", "キュウ,ク", "ここの,ここの.つ", 2, 1),
    ("十", "ten", "ジュウ,ジッ,ジュッ", "とお,と", 2, 1),
    ("百", "hundred", "ヒャク,ビャク", "もも", 6, 1),
    ("千", "thousand", "セン", "ち", 3, 1),
    ("日", "day,sun,Japan", "ニチ,ジツ", "ひ,-び,-か", 4, 1),
    ("月", "month,moon", "ゲツ,ガツ", "つき", 4, 1),
    ("火", "fire", "カ", "ひ,-び,ほ-", 4, 1),
    ("水", "water", "スイ", "みず,みず-", 4, 1),
    ("木", "tree,wood", "ボク,モク", "き,こ-", 4, 1),
    ("金", "gold,money", "キン,コン,ゴン", "かね,かな-,-がね", 8, 1),
    ("土", "soil,earth", "ド,ト", "つち", 3, 1),
    ("山", "mountain", "サン,セン", "やま", 3, 1),
    ("川", "river,stream", "セン", "かわ", 3, 1),
    ("口", "mouth", "コウ,ク", "くち", 3, 1),
    ("目", "eye", "モク,ボク", "め,-め,ま-", 5, 1),
    ("耳", "ear", "ジ", "みみ", 6, 1),
    ("手", "hand", "シュ,ズ", "て,て-,-て,た-", 4, 1),
    ("足", "leg,foot,be sufficient", "ソク", "あし,た.りる,た.る,た.す", 7, 1),
    ("人", "person", "ジン,ニン", "ひと,-り,-と", 2, 1),
    ("子", "child", "シ,ス,ツ", "こ,-こ,ね", 3, 1),
    ("女", "woman,female", "ジョ,ニョ,ニョウ", "おんな,め", 3, 1),
    ("男", "male", "ダン,ナン", "おとこ,お", 7, 1),
    ("天", "heavens,sky", "テン", "あまつ,あめ,あま-", 4, 1),
    ("空", "sky,empty", "クウ", "そら,あ.く,あ.き,あ.ける,から", 8, 1),
    ("雨", "rain", "ウ", "あめ,あま-,-さめ", 8, 1),
    ("花", "flower", "カ,ケ", "はな", 7, 1),
    ("犬", "dog", "ケン", "いぬ,いぬ-", 4, 1),
    ("猫", "cat", "ビョウ", "ねこ", 11, 8),
];

/// Offline dictionary over a small fixed set of common kanji. Every set id
/// lists the same glyphs and no words are known.
#[derive(Debug, Clone, Default)]
pub struct BuiltinDictionary;

impl BuiltinDictionary {
    pub fn new() -> Self {
        Self
    }

    pub fn glyphs() -> Vec<String> {
        BUILTIN_KANJI.iter().map(|(kanji, ..)| kanji.to_string()).collect()
    }

    pub fn detail(glyph: &str) -> Option<KanjiDetail> {
        let split = |s: &str| s.split(',').map(str::to_string).collect::<Vec<_>>();

        BUILTIN_KANJI.iter().find(|(kanji, ..)| *kanji == glyph).map(
            |(kanji, meanings, on, kun, strokes, grade)| KanjiDetail {
                kanji: kanji.to_string(),
                meanings: split(meanings),
                kun_readings: split(kun),
                on_readings: split(on),
                name_readings: Vec::new(),
                stroke_count: Some(*strokes),
                grade: Some(*grade),
                jlpt: None,
                heisig_en: Some(split(meanings).remove(0)),
                freq_mainichi_shinbun: None,
                unicode: codepoint_hex(kanji),
                unihan_cjk_compatibility_variant: None,
                notes: Vec::new(),
            },
        )
    }
}

impl DictionaryService for BuiltinDictionary {
    async fn list_kanji(&self, _set_id: &str) -> Result<Vec<String>, GameError> {
        Ok(Self::glyphs())
    }

    async fn get_kanji_detail(&self, glyph: &str) -> Result<KanjiDetail, GameError> {
        Self::detail(glyph)
            .ok_or_else(|| GameError::DetailFetch(format!("Failed to fetch details for {glyph}")))
    }

    async fn get_words(&self, _glyph: &str) -> Result<Vec<WordEntry>, GameError> {
        Ok(Vec::new())
    }
}
