pub mod board;
pub mod card;
pub mod controller;
pub mod render;
pub mod session;
pub mod turn;
pub mod visibility;

#[cfg(test)]
mod controller_tests;

pub use board::Board;
pub use card::{
    Card,
    CardId,
    KanjiPayload,
    PairId,
    Player,
    TileIndex,
};
pub use controller::{
    KanjiDetailView,
    SessionController,
    SessionEvent,
    StartOptions,
    TileAction,
};
pub use render::TileRender;
pub use session::{
    GameSession,
    SessionSnapshot,
};
pub use turn::{
    FlipOutcome,
    GameResult,
    Resolution,
    Scores,
    TurnPhase,
};
pub use visibility::{
    CardOrderMode,
    CardRole,
    ContentField,
    ContentVisibility,
    Face,
    VisibilityContext,
    VisibilityLevel,
};

/// Payloads for the first `n` built-in kanji.
#[cfg(test)]
pub(crate) fn sample_payloads(n: usize) -> Vec<KanjiPayload> {
    use crate::dictionary::BuiltinDictionary;

    BuiltinDictionary::glyphs()
        .iter()
        .take(n)
        .filter_map(|glyph| BuiltinDictionary::detail(glyph))
        .map(KanjiPayload::from)
        .collect()
}
