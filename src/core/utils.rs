use wana_kana::ConvertJapanese;

/// Placeholder used wherever a reading or meaning list is empty.
pub const EMPTY_FIELD: &str = "—";

pub trait RomajiReading {
    fn reading_romaji(&self) -> String;
}

// ひと.つ -> hitotsu, -び -> bi
impl RomajiReading for str {
    fn reading_romaji(&self) -> String {
        if self == EMPTY_FIELD {
            return EMPTY_FIELD.to_string();
        }

        let cleaned: String = self.chars().filter(|c| *c != '.' && *c != '-').collect();
        cleaned.to_romaji()
    }
}

impl RomajiReading for String {
    fn reading_romaji(&self) -> String {
        self.as_str().reading_romaji()
    }
}

pub fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        EMPTY_FIELD.to_string()
    } else {
        items.join(", ")
    }
}

/// Hex codepoint of the first character, lowercase and without the `U+` prefix.
pub fn codepoint_hex(glyph: &str) -> String {
    glyph.chars().next().map(|c| format!("{:x}", c as u32)).unwrap_or_default()
}
