use serde::Serialize;

use super::{
    card::{
        KanjiPayload,
        Player,
        TileIndex,
    },
    visibility::{
        CardRole,
        ContentField,
        Face,
        TileView,
    },
};

/// Shown in place of the glyph on a face-up tile whose glyph is hidden.
pub const HIDDEN_GLYPH: &str = "?";

/// What the presentation layer draws for one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileRender {
    pub index: TileIndex,
    pub face: Face,
    pub matched: bool,
    pub role: Option<CardRole>,
    pub owner: Option<Player>,
    /// The kanji, the placeholder, or `None` when face-down.
    pub glyph: Option<String>,
    pub lines: Vec<String>,
    /// Debug overlay: the bot has this face-down tile in memory.
    pub bot_known: bool,
}

impl TileRender {
    pub fn new(index: TileIndex, view: &TileView, payload: &KanjiPayload, bot_known: bool) -> Self {
        let glyph = match view.face {
            Face::Back => None,
            Face::Front if view.shows(ContentField::Kanji) => Some(payload.kanji.clone()),
            Face::Front => Some(HIDDEN_GLYPH.to_string()),
        };

        let lines = view
            .visible
            .iter()
            .filter_map(|&field| content_line(field, payload))
            .collect();

        Self {
            index,
            face: view.face,
            matched: view.matched,
            role: view.role,
            owner: view.owner,
            glyph,
            lines,
            bot_known: bot_known && view.face == Face::Back,
        }
    }
}

/// Auxiliary text for one field. The glyph itself is not a line.
pub fn content_line(field: ContentField, payload: &KanjiPayload) -> Option<String> {
    let line = match field {
        ContentField::Kanji => return None,
        ContentField::Frequency => match payload.frequency_rank {
            Some(rank) => format!("Freq: #{}", rank),
            None => "Freq: N/A".to_string(),
        },
        ContentField::Meaning => payload.meaning.clone(),
        ContentField::Heisig => format!("Heisig: {}", payload.heisig_keyword),
        ContentField::On => format!("On: {}", payload.on),
        ContentField::Kun => format!("Kun: {}", payload.kun),
        ContentField::KunRomaji => format!("Kun (R): {}", payload.kun_romaji),
        ContentField::OnRomaji => format!("On (R): {}", payload.on_romaji),
        ContentField::StrokeCount => match payload.stroke_count {
            Some(count) => format!("Strokes: {}", count),
            None => "Strokes: —".to_string(),
        },
        ContentField::Unicode => format!("U+{}", payload.unicode),
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::sample_payloads;

    fn view(face: Face, visible: Vec<ContentField>) -> TileView {
        TileView { face, matched: false, role: None, owner: None, visible }
    }

    #[test]
    fn test_hidden_glyph_placeholder() {
        let payload = &sample_payloads(1)[0];

        let render = TileRender::new(0, &view(Face::Front, vec![ContentField::Meaning]), payload, false);
        assert_eq!(render.glyph.as_deref(), Some(HIDDEN_GLYPH));
        assert_eq!(render.lines, vec![payload.meaning.clone()]);

        let render = TileRender::new(0, &view(Face::Back, Vec::new()), payload, true);
        assert_eq!(render.glyph, None);
        assert!(render.lines.is_empty());
        assert!(render.bot_known);
    }

    #[test]
    fn test_content_lines() {
        let mut payload = sample_payloads(1).remove(0);
        payload.frequency_rank = None;
        payload.stroke_count = Some(3);
        payload.unicode = "5c71".to_string();

        assert_eq!(content_line(ContentField::Frequency, &payload).as_deref(), Some("Freq: N/A"));
        payload.frequency_rank = Some(131);
        assert_eq!(content_line(ContentField::Frequency, &payload).as_deref(), Some("Freq: #131"));
        assert_eq!(content_line(ContentField::StrokeCount, &payload).as_deref(), Some("Strokes: 3"));
        assert_eq!(content_line(ContentField::Unicode, &payload).as_deref(), Some("U+5c71"));
        assert_eq!(content_line(ContentField::Kanji, &payload), None);
    }

    #[test]
    fn test_bot_known_only_on_face_down_tiles() {
        let payload = &sample_payloads(1)[0];
        let render = TileRender::new(0, &view(Face::Front, vec![ContentField::Kanji]), payload, true);
        assert!(!render.bot_known);
        assert_eq!(render.glyph.as_deref(), Some(payload.kanji.as_str()));
    }
}
