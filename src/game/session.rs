use rand::Rng;
use serde::Serialize;

use super::{
    board::Board,
    card::{
        KanjiPayload,
        Player,
        TileIndex,
    },
    render::TileRender,
    turn::{
        FlipOutcome,
        FlipSet,
        GameResult,
        Matches,
        Resolution,
        Scores,
        TurnPhase,
    },
    visibility::{
        CardOrderMode,
        CardRole,
        ContentVisibility,
        OrderAssignments,
        TileView,
        VisibilityPolicy,
    },
};
use crate::{
    bot::{
        BotConfig,
        BotMemory,
        FirstChoice,
        OpponentEngine,
        OpponentType,
    },
    core::{
        FlipRejected,
        GameError,
    },
};

pub const MIN_GRID_SIZE: usize = 4;
pub const MAX_GRID_SIZE: usize = 8;

/// Number of pairs on a `grid_size` x `grid_size` board.
pub fn pairs_needed(grid_size: usize) -> Result<usize, GameError> {
    if grid_size % 2 != 0 || !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
        return Err(GameError::InvalidGridSize(grid_size));
    }
    Ok(grid_size * grid_size / 2)
}

/// All mutable state of one game. Owned by the controller; every transition
/// goes through `&mut self`.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    grid_size: usize,
    flips: FlipSet,
    matches: Matches,
    scores: Scores,
    current_player: Player,
    memory: BotMemory,
    assignments: OrderAssignments,
    mode: CardOrderMode,
    opponent: OpponentType,
    /// Opponent switch held back until the face-up cards resolve.
    pending_opponent: Option<OpponentType>,
    content: ContentVisibility,
    processing: bool,
    details_loading: bool,
    /// Difficulty for the bot turn in progress.
    active_bot: Option<BotConfig>,
}

impl GameSession {
    /// Builds a fresh session from the first `grid_size² / 2` payloads.
    pub fn start<R: Rng + ?Sized>(
        mut payloads: Vec<KanjiPayload>,
        grid_size: usize,
        opponent: OpponentType,
        mode: CardOrderMode,
        content: ContentVisibility,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let required = pairs_needed(grid_size)?;
        if payloads.len() < required {
            return Err(GameError::InsufficientKanji { grid_size, required, available: payloads.len() });
        }
        payloads.truncate(required);

        let board = Board::build(payloads, rng)?;
        let assignments = OrderAssignments::precompute(mode, &board, rng);

        log::info!(
            "Started {}x{} session: {} pairs vs {}, card order {:?}",
            grid_size,
            grid_size,
            board.pair_count(),
            opponent.label(),
            mode
        );

        Ok(Self::from_board(board, grid_size, opponent, mode, content, assignments))
    }

    fn from_board(
        board: Board,
        grid_size: usize,
        opponent: OpponentType,
        mode: CardOrderMode,
        content: ContentVisibility,
        assignments: OrderAssignments,
    ) -> Self {
        Self {
            board,
            grid_size,
            flips: FlipSet::default(),
            matches: Matches::default(),
            scores: Scores::default(),
            current_player: Player::One,
            memory: BotMemory::default(),
            assignments,
            mode,
            opponent,
            pending_opponent: None,
            content,
            processing: false,
            details_loading: false,
            active_bot: None,
        }
    }

    /// Session over a fixed board layout.
    #[cfg(test)]
    pub(crate) fn with_board(board: Board, opponent: OpponentType, mode: CardOrderMode) -> Self {
        let grid_size = (board.len() as f64).sqrt() as usize;
        Self::from_board(
            board,
            grid_size,
            opponent,
            mode,
            ContentVisibility::default(),
            OrderAssignments::default(),
        )
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn flips(&self) -> &FlipSet {
        &self.flips
    }

    pub fn matches(&self) -> &Matches {
        &self.matches
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn memory(&self) -> &BotMemory {
        &self.memory
    }

    pub fn assignments(&self) -> &OrderAssignments {
        &self.assignments
    }

    pub fn card_order_mode(&self) -> CardOrderMode {
        self.mode
    }

    pub fn opponent(&self) -> OpponentType {
        self.opponent
    }

    /// Applies at once between turns. With cards face-up the switch waits
    /// until they are resolved, so the player who opened them finishes.
    pub fn set_opponent(&mut self, opponent: OpponentType) {
        if self.flips.is_empty() {
            self.opponent = opponent;
            self.pending_opponent = None;
        } else {
            self.pending_opponent = Some(opponent);
        }
    }

    pub fn pending_opponent(&self) -> Option<OpponentType> {
        self.pending_opponent
    }

    fn clear_flips(&mut self) {
        self.flips.clear();
        if let Some(opponent) = self.pending_opponent.take() {
            log::info!("Opponent is now {}", opponent.label());
            self.opponent = opponent;
        }
    }

    pub fn content(&self) -> &ContentVisibility {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut ContentVisibility {
        &mut self.content
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_details_loading(&self) -> bool {
        self.details_loading
    }

    pub fn set_details_loading(&mut self, loading: bool) {
        self.details_loading = loading;
    }

    pub fn is_matched(&self, pair_id: usize) -> bool {
        self.matches.is_matched(pair_id)
    }

    pub fn is_flipped(&self, tile: TileIndex) -> bool {
        self.flips.contains(tile)
    }

    pub fn is_tile_matched(&self, tile: TileIndex) -> bool {
        self.board.pair_id(tile).map(|p| self.matches.is_matched(p)).unwrap_or(false)
    }

    pub fn phase(&self) -> TurnPhase {
        match self.flips.len() {
            0 => TurnPhase::Idle,
            1 => TurnPhase::OneFlipped,
            _ => TurnPhase::Resolving,
        }
    }

    pub fn is_game_over(&self) -> bool {
        let pairs = self.board.pair_count();
        pairs > 0 && self.matches.len() == pairs
    }

    pub fn result(&self) -> Option<GameResult> {
        if !self.is_game_over() {
            return None;
        }
        Some(match self.scores.leader() {
            Some(player) => GameResult::Winner(player),
            None => GameResult::Tie,
        })
    }

    pub fn is_bot_turn(&self) -> bool {
        self.opponent.is_bot() && self.current_player == Player::Two
    }

    /// The player a local click acts for: always Player 1 against a bot.
    pub fn human_actor(&self) -> Player {
        if self.opponent.is_bot() {
            Player::One
        } else {
            self.current_player
        }
    }

    /// Whether the bot may start a turn right now.
    pub fn bot_may_move(&self) -> bool {
        self.is_bot_turn()
            && self.flips.is_empty()
            && !self.processing
            && !self.details_loading
            && !self.is_game_over()
    }

    pub fn flip(&mut self, tile: TileIndex, actor: Player) -> Result<FlipOutcome, FlipRejected> {
        if self.is_game_over() {
            return Err(FlipRejected::GameOver);
        }
        if self.processing {
            return Err(FlipRejected::Processing);
        }
        if self.details_loading {
            return Err(FlipRejected::DetailsLoading);
        }
        if actor != self.current_player {
            return Err(FlipRejected::NotYourTurn);
        }
        let pair_id = self.board.pair_id(tile).ok_or(FlipRejected::OutOfRange(tile))?;
        if self.matches.is_matched(pair_id) {
            return Err(FlipRejected::AlreadyMatched);
        }
        if self.flips.contains(tile) {
            return Err(FlipRejected::AlreadyFlipped);
        }

        Ok(self.place(tile))
    }

    fn place(&mut self, tile: TileIndex) -> FlipOutcome {
        let first_of_turn = self.flips.is_empty();
        self.flips.push(tile);

        // The bot sees every first card of a turn, including the human's.
        if first_of_turn && self.opponent.is_bot() {
            if let Some(pair_id) = self.board.pair_id(tile) {
                self.memory.record(tile, pair_id);
            }
        }

        if self.mode == CardOrderMode::FirstFlipSticky {
            if let Some(card) = self.board.card(tile) {
                let role = CardRole::from_position(self.flips.len() - 1);
                self.assignments.record_sticky(card.id, role);
            }
        }

        match (self.flips.first(), self.flips.second()) {
            (Some(first), Some(second)) => {
                self.processing = true;
                FlipOutcome::PairReady(first, second)
            }
            _ => FlipOutcome::FirstFlipped(tile),
        }
    }

    /// Resolves the two face-up tiles after the reveal delay. A match releases
    /// the lock at once; a mismatch keeps it until [`Self::finish_mismatch`].
    pub fn evaluate_pair(&mut self) -> Option<Resolution> {
        let (Some(first), Some(second)) = (self.flips.first(), self.flips.second()) else {
            self.clear_flips();
            self.processing = false;
            return None;
        };
        let (Some(a), Some(b)) = (self.board.card(first), self.board.card(second)) else {
            self.clear_flips();
            self.processing = false;
            return None;
        };
        let (first_id, second_id, first_pair, second_pair) = (a.id, b.id, a.pair_id, b.pair_id);

        if first_pair == second_pair {
            let player = self.current_player;
            self.matches.insert(first_pair, player);
            self.scores.award(player);
            if self.mode == CardOrderMode::FlipOrder {
                self.assignments.persist_match(first_id, second_id);
            }
            self.clear_flips();
            self.processing = false;

            log::info!(
                "{} matched {} ({} / {})",
                player,
                self.board.card(first).map(|c| c.kanji()).unwrap_or_default(),
                self.scores.player1,
                self.scores.player2
            );
            Some(Resolution::Match { pair_id: first_pair, player })
        } else {
            if self.opponent.is_bot() {
                self.memory.record(second, second_pair);
            }
            log::debug!("{} missed: tiles {} and {}", self.current_player, first, second);
            Some(Resolution::Mismatch { first, second })
        }
    }

    /// Flips a mismatched pair back and passes the turn.
    pub fn finish_mismatch(&mut self) -> Player {
        self.clear_flips();
        self.current_player = self.current_player.other();
        self.processing = false;
        self.current_player
    }

    /// Stage one of a bot turn: takes the lock and shows the first card.
    /// `None` when the bot may not move or has nothing left to flip.
    pub fn begin_bot_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<FirstChoice> {
        if !self.bot_may_move() || !self.flips.is_empty() {
            return None;
        }
        let config = self.opponent.bot_config()?;
        self.processing = true;
        self.active_bot = Some(config);

        let choice = OpponentEngine {
            board: &self.board,
            matches: &self.matches,
            flips: &self.flips,
            memory: &self.memory,
            config: &config,
        }
        .choose_first(rng);

        let Some(choice) = choice else {
            log::debug!("Bot found no tile to flip");
            self.processing = false;
            self.active_bot = None;
            return None;
        };

        log::debug!("Bot opens tile {} ({:?})", choice.tile, choice.action);
        self.place(choice.tile);
        Some(choice)
    }

    /// Stage two: picks and shows the second card. Abandons the turn, clearing
    /// the face-up card and releasing the lock, when nothing valid remains.
    ///
    /// The difficulty chosen when the turn began is kept even if the opponent
    /// changed in between.
    pub fn finish_bot_turn<R: Rng + ?Sized>(&mut self, first: TileIndex, rng: &mut R) -> Option<FlipOutcome> {
        if self.flips.tiles() != [first].as_slice() {
            return None;
        }
        let config = self.active_bot.take()?;

        let choice = OpponentEngine {
            board: &self.board,
            matches: &self.matches,
            flips: &self.flips,
            memory: &self.memory,
            config: &config,
        }
        .choose_second(first, rng);

        let Some(choice) = choice else {
            log::debug!("Bot abandoned its turn after tile {}", first);
            self.clear_flips();
            self.processing = false;
            return None;
        };

        log::debug!(
            "Bot picks tile {} ({:?}{})",
            choice.tile,
            choice.action,
            if choice.fallback { ", fallback" } else { "" }
        );
        Some(self.place(choice.tile))
    }

    pub fn policy(&self) -> VisibilityPolicy<'_> {
        VisibilityPolicy {
            board: &self.board,
            flips: &self.flips,
            matches: &self.matches,
            content: &self.content,
            assignments: &self.assignments,
            mode: self.mode,
        }
    }

    pub fn view(&self, tile: TileIndex) -> TileView {
        self.policy().view(tile)
    }

    /// Render data for every tile. `debug_memory` flags face-down tiles the
    /// bot remembers.
    pub fn render(&self, debug_memory: bool) -> Vec<TileRender> {
        let policy = self.policy();
        let show_memory = debug_memory && self.opponent.is_bot() && self.opponent != OpponentType::Randomizer;

        self.board
            .cards()
            .iter()
            .enumerate()
            .map(|(tile, card)| {
                let bot_known = show_memory && self.memory.knows(tile);
                TileRender::new(tile, &policy.view(tile), &card.payload, bot_known)
            })
            .collect()
    }

    pub fn snapshot(&self, debug_memory: bool) -> SessionSnapshot {
        SessionSnapshot {
            grid_size: self.grid_size,
            tiles: self.render(debug_memory),
            scores: self.scores,
            current_player: self.current_player,
            phase: self.phase(),
            processing: self.processing,
            details_loading: self.details_loading,
            game_over: self.is_game_over(),
            result: self.result(),
        }
    }
}

/// Everything a presentation layer needs to draw the board.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub grid_size: usize,
    pub tiles: Vec<TileRender>,
    pub scores: Scores,
    pub current_player: Player,
    pub phase: TurnPhase,
    pub processing: bool,
    pub details_loading: bool,
    pub game_over: bool,
    pub result: Option<GameResult>,
}
