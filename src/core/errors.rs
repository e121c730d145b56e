use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Failed to load kanji set '{set}': {reason}")]
    DataLoad { set: String, reason: String },

    #[error("Failed to fetch detailed kanji data: {0}")]
    DetailFetch(String),

    #[error("Failed to fetch dictionary words for {kanji}: {reason}")]
    WordFetch { kanji: String, reason: String },

    #[error(
        "Cannot create a {grid_size}x{grid_size} grid. Need {required} unique kanji, but the available library only has {available}"
    )]
    InsufficientKanji { grid_size: usize, required: usize, available: usize },

    #[error("Grid size must be an even number between 4 and 8, got {0}")]
    InvalidGridSize(usize),

    #[error("Cannot build a board from an empty kanji selection")]
    EmptySelection,

    #[error("Invalid bot configuration: {0}")]
    InvalidBotConfig(String),

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GameError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for GameError {
    fn from(error: std::io::Error) -> Self {
        GameError::Io(Box::new(error))
    }
}

/// Why a flip intent was ignored. These are expected during play and are
/// never surfaced as failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipRejected {
    #[error("no game is in progress")]
    NoSession,

    #[error("the game is over")]
    GameOver,

    #[error("a pair is being resolved")]
    Processing,

    #[error("kanji details are loading")]
    DetailsLoading,

    #[error("it is not this player's turn")]
    NotYourTurn,

    #[error("tile {0} is not on the board")]
    OutOfRange(usize),

    #[error("tile is already matched")]
    AlreadyMatched,

    #[error("tile is already face-up")]
    AlreadyFlipped,
}
