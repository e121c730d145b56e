use std::collections::{
    BTreeMap,
    HashMap,
};

use rand::{
    seq::SliceRandom,
    Rng,
};
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    board::Board,
    card::{
        CardId,
        Player,
        TileIndex,
    },
    turn::{
        FlipSet,
        Matches,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityLevel {
    Never,
    Both,
    FirstOnly,
    SecondOnly,
}

impl VisibilityLevel {
    pub const ALL: [VisibilityLevel; 4] = [
        VisibilityLevel::Never,
        VisibilityLevel::Both,
        VisibilityLevel::FirstOnly,
        VisibilityLevel::SecondOnly,
    ];

    pub fn next(&self) -> VisibilityLevel {
        match self {
            VisibilityLevel::Never => VisibilityLevel::Both,
            VisibilityLevel::Both => VisibilityLevel::FirstOnly,
            VisibilityLevel::FirstOnly => VisibilityLevel::SecondOnly,
            VisibilityLevel::SecondOnly => VisibilityLevel::Never,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisibilityLevel::Never => "Never",
            VisibilityLevel::Both => "Both",
            VisibilityLevel::FirstOnly => "1st only",
            VisibilityLevel::SecondOnly => "2nd only",
        }
    }

    fn allows(&self, role: Option<CardRole>) -> bool {
        match self {
            VisibilityLevel::Never => false,
            VisibilityLevel::Both => true,
            VisibilityLevel::FirstOnly => role == Some(CardRole::First),
            VisibilityLevel::SecondOnly => role == Some(CardRole::Second),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentField {
    Kanji,
    Frequency,
    Meaning,
    Heisig,
    On,
    Kun,
    KunRomaji,
    OnRomaji,
    StrokeCount,
    Unicode,
}

impl ContentField {
    /// Display order of the auxiliary lines, glyph first.
    pub const ALL: [ContentField; 10] = [
        ContentField::Kanji,
        ContentField::Frequency,
        ContentField::Meaning,
        ContentField::Heisig,
        ContentField::On,
        ContentField::Kun,
        ContentField::KunRomaji,
        ContentField::OnRomaji,
        ContentField::StrokeCount,
        ContentField::Unicode,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContentField::Kanji => "Kanji Character",
            ContentField::Frequency => "Frequency Rank",
            ContentField::Meaning => "Meaning",
            ContentField::Heisig => "Heisig Keyword",
            ContentField::On => "On-Yomi",
            ContentField::Kun => "Kun-Yomi",
            ContentField::KunRomaji => "Kun-Yomi (Romaji)",
            ContentField::OnRomaji => "On-Yomi (Romaji)",
            ContentField::StrokeCount => "Stroke Count",
            ContentField::Unicode => "Unicode",
        }
    }

    pub fn from_key(key: &str) -> Option<ContentField> {
        ContentField::ALL.into_iter().find(|f| {
            f.label().eq_ignore_ascii_case(key) || format!("{:?}", f).eq_ignore_ascii_case(key)
        })
    }

    fn default_visibility(&self) -> FieldVisibility {
        use VisibilityLevel::*;

        match self {
            ContentField::Kanji => FieldVisibility { matched: Both, flipped: Both },
            ContentField::Meaning => FieldVisibility { matched: Both, flipped: Never },
            ContentField::On => FieldVisibility { matched: FirstOnly, flipped: Never },
            ContentField::Kun => FieldVisibility { matched: SecondOnly, flipped: Never },
            _ => FieldVisibility { matched: Never, flipped: Never },
        }
    }
}

/// Which of a field's two settings is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityContext {
    Matched,
    Flipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldVisibility {
    pub matched: VisibilityLevel,
    pub flipped: VisibilityLevel,
}

/// Per-field visibility settings. Fields absent from a loaded settings file
/// keep their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentVisibility {
    overrides: BTreeMap<ContentField, FieldVisibility>,
}

impl ContentVisibility {
    pub fn get(&self, field: ContentField) -> FieldVisibility {
        self.overrides.get(&field).copied().unwrap_or_else(|| field.default_visibility())
    }

    pub fn level(&self, field: ContentField, context: VisibilityContext) -> VisibilityLevel {
        let visibility = self.get(field);
        match context {
            VisibilityContext::Matched => visibility.matched,
            VisibilityContext::Flipped => visibility.flipped,
        }
    }

    pub fn set(&mut self, field: ContentField, context: VisibilityContext, level: VisibilityLevel) {
        let mut visibility = self.get(field);
        match context {
            VisibilityContext::Matched => visibility.matched = level,
            VisibilityContext::Flipped => visibility.flipped = level,
        }
        self.overrides.insert(field, visibility);
    }

    /// Advances one setting to the next level and returns it.
    pub fn cycle(&mut self, field: ContentField, context: VisibilityContext) -> VisibilityLevel {
        let next = self.level(field, context).next();
        self.set(field, context, next);
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardOrderMode {
    /// Role follows the current flip order; persisted only for matched pairs.
    #[default]
    FlipOrder,
    /// Role is fixed the first time a tile is flipped.
    FirstFlipSticky,
    /// One random tile of each pair is first.
    RandomPerPair,
    /// A random half of all tiles is first, regardless of pairs.
    RandomGlobal,
}

impl CardOrderMode {
    pub const ALL: [CardOrderMode; 4] = [
        CardOrderMode::FlipOrder,
        CardOrderMode::FirstFlipSticky,
        CardOrderMode::RandomPerPair,
        CardOrderMode::RandomGlobal,
    ];

    pub fn is_precomputed(&self) -> bool {
        matches!(self, CardOrderMode::RandomPerPair | CardOrderMode::RandomGlobal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardOrderMode::FlipOrder => "Flip order (resets each turn)",
            CardOrderMode::FirstFlipSticky => "First flip is sticky",
            CardOrderMode::RandomPerPair => "Random per pair",
            CardOrderMode::RandomGlobal => "Random global",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardRole {
    First,
    Second,
}

impl CardRole {
    /// Role of the tile at `position` in the flip set.
    pub fn from_position(position: usize) -> CardRole {
        if position == 0 {
            CardRole::First
        } else {
            CardRole::Second
        }
    }
}

/// Stored roles, keyed by card id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderAssignments {
    roles: HashMap<CardId, CardRole>,
}

impl OrderAssignments {
    /// One-time assignment for the precomputed modes; empty for the others.
    pub fn precompute<R: Rng + ?Sized>(mode: CardOrderMode, board: &Board, rng: &mut R) -> Self {
        let mut roles = HashMap::new();

        match mode {
            CardOrderMode::RandomPerPair => {
                for pair_id in 0..board.pair_count() {
                    let mut pair = board.cards().iter().filter(|c| c.pair_id == pair_id);
                    if let (Some(a), Some(b)) = (pair.next(), pair.next()) {
                        let (first, second) = if rng.random_bool(0.5) { (a, b) } else { (b, a) };
                        roles.insert(first.id, CardRole::First);
                        roles.insert(second.id, CardRole::Second);
                    }
                }
            }
            CardOrderMode::RandomGlobal => {
                let mut order: Vec<TileIndex> = (0..board.len()).collect();
                order.shuffle(rng);
                let half = order.len() / 2;

                for (i, tile) in order.into_iter().enumerate() {
                    let role = if i < half { CardRole::First } else { CardRole::Second };
                    roles.insert(board.cards()[tile].id, role);
                }
            }
            CardOrderMode::FlipOrder | CardOrderMode::FirstFlipSticky => {}
        }

        Self { roles }
    }

    pub fn get(&self, card_id: CardId) -> Option<CardRole> {
        self.roles.get(&card_id).copied()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Stores a role unless the card already has one.
    pub fn record_sticky(&mut self, card_id: CardId, role: CardRole) -> CardRole {
        *self.roles.entry(card_id).or_insert(role)
    }

    /// Keeps the flip order of a matched pair for display after the match.
    pub fn persist_match(&mut self, first: CardId, second: CardId) {
        self.roles.insert(first, CardRole::First);
        self.roles.insert(second, CardRole::Second);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Face {
    Back,
    Front,
}

/// Resolved visibility of one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileView {
    pub face: Face,
    pub matched: bool,
    pub role: Option<CardRole>,
    pub owner: Option<Player>,
    pub visible: Vec<ContentField>,
}

impl TileView {
    pub fn shows(&self, field: ContentField) -> bool {
        self.visible.contains(&field)
    }
}

/// Read-only view of the state that decides what a tile shows. Resolution
/// is a pure function of these inputs.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityPolicy<'a> {
    pub board: &'a Board,
    pub flips: &'a FlipSet,
    pub matches: &'a Matches,
    pub content: &'a ContentVisibility,
    pub assignments: &'a OrderAssignments,
    pub mode: CardOrderMode,
}

impl<'a> VisibilityPolicy<'a> {
    fn is_matched(&self, tile: TileIndex) -> bool {
        self.board.pair_id(tile).map(|p| self.matches.is_matched(p)).unwrap_or(false)
    }

    fn flip_position(&self, tile: TileIndex) -> Option<usize> {
        self.flips.tiles().iter().position(|&t| t == tile)
    }

    /// Role of a face-up tile under the active mode. Face-down tiles have none.
    pub fn role(&self, tile: TileIndex) -> Option<CardRole> {
        let card = self.board.card(tile)?;
        let position = self.flip_position(tile);
        if position.is_none() && !self.is_matched(tile) {
            return None;
        }

        match self.mode {
            CardOrderMode::FlipOrder => {
                position.map(CardRole::from_position).or_else(|| self.assignments.get(card.id))
            }
            CardOrderMode::FirstFlipSticky => {
                self.assignments.get(card.id).or_else(|| position.map(CardRole::from_position))
            }
            CardOrderMode::RandomPerPair | CardOrderMode::RandomGlobal => {
                self.assignments.get(card.id)
            }
        }
    }

    pub fn field_visible(&self, tile: TileIndex, field: ContentField) -> bool {
        if self.is_matched(tile) {
            return self.content.level(field, VisibilityContext::Matched) != VisibilityLevel::Never;
        }
        if self.flips.contains(tile) {
            return self.content.level(field, VisibilityContext::Flipped).allows(self.role(tile));
        }
        false
    }

    pub fn view(&self, tile: TileIndex) -> TileView {
        let matched = self.is_matched(tile);
        let face_up = matched || self.flips.contains(tile);

        TileView {
            face: if face_up { Face::Front } else { Face::Back },
            matched,
            role: self.role(tile),
            owner: self.board.pair_id(tile).and_then(|p| self.matches.owner(p)),
            visible: ContentField::ALL
                .into_iter()
                .filter(|&field| self.field_visible(tile, field))
                .collect(),
        }
    }
}
