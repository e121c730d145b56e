use std::sync::Arc;

use futures::future::try_join_all;
use rand::{
    rngs::StdRng,
    seq::IndexedRandom,
    SeedableRng,
};

use super::{
    card::{
        KanjiPayload,
        Player,
        TileIndex,
    },
    session::{
        pairs_needed,
        GameSession,
        SessionSnapshot,
    },
    turn::{
        FlipOutcome,
        GameResult,
        Resolution,
    },
    visibility::{
        CardOrderMode,
        ContentField,
        VisibilityContext,
        VisibilityLevel,
    },
};
use crate::{
    bot::OpponentType,
    config::GameSettings,
    core::{
        tasks::{
            Scheduler,
            TimerEvent,
            TimerKind,
            TimerSlot,
        },
        FlipRejected,
        GameError,
    },
    dictionary::{
        DictionaryService,
        KanjiSet,
        WordCache,
        WordEntry,
    },
};

pub const WORDS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Overrides the configured grid size.
    pub grid_size: Option<usize>,
    /// Replay the previous session's kanji when there are enough of them.
    pub reuse_previous: bool,
}

/// Details of a matched kanji, with its dictionary words.
#[derive(Debug, Clone)]
pub struct KanjiDetailView {
    pub tile: TileIndex,
    pub payload: Arc<KanjiPayload>,
    pub owner: Option<Player>,
    pub words: Arc<Vec<WordEntry>>,
}

impl KanjiDetailView {
    pub fn page_count(&self) -> usize {
        self.words.len().div_ceil(WORDS_PER_PAGE).max(1)
    }

    /// Words on a zero-based page. Out-of-range pages are empty.
    pub fn page(&self, page: usize) -> &[WordEntry] {
        let start = page.saturating_mul(WORDS_PER_PAGE).min(self.words.len());
        let end = (start + WORDS_PER_PAGE).min(self.words.len());
        &self.words[start..end]
    }
}

#[derive(Debug, Clone)]
pub enum TileAction {
    Flipped(FlipOutcome),
    Details(KanjiDetailView),
}

/// What a processed timer did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Resolved(Resolution),
    TurnPassed(Player),
    BotOpened(TileIndex),
    PairFlipped(TileIndex, TileIndex),
    /// The bot could not or may not move.
    BotIdle,
    GameOver(GameResult),
    Ignored,
}

/// Drives one game at a time: builds sessions from the dictionary, applies
/// player intents and runs the timed continuations of the turn loop.
pub struct SessionController<D: DictionaryService> {
    dictionary: Arc<D>,
    settings: GameSettings,
    library: Vec<String>,
    library_set: Option<KanjiSet>,
    previous: Vec<KanjiPayload>,
    words: Arc<WordCache<D>>,
    scheduler: Scheduler,
    rng: StdRng,
    session: Option<GameSession>,
}

impl<D: DictionaryService> SessionController<D> {
    pub fn new(dictionary: Arc<D>, settings: GameSettings) -> Self {
        Self::with_rng(dictionary, settings, StdRng::from_os_rng())
    }

    pub fn with_rng(dictionary: Arc<D>, settings: GameSettings, rng: StdRng) -> Self {
        Self {
            words: Arc::new(WordCache::new(dictionary.clone())),
            dictionary,
            settings,
            library: Vec::new(),
            library_set: None,
            previous: Vec::new(),
            scheduler: Scheduler::new(),
            rng,
            session: None,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn library(&self) -> &[String] {
        &self.library
    }

    /// Shared word cache, for fetching outside the controller.
    pub fn word_cache(&self) -> Arc<WordCache<D>> {
        self.words.clone()
    }

    fn in_progress(&self) -> bool {
        self.session.as_ref().map(|s| !s.is_game_over()).unwrap_or(false)
    }

    /// Replaces the kanji library with the glyphs of `set`.
    pub async fn load_kanji_set(&mut self, set: KanjiSet) -> Result<usize, GameError> {
        if self.in_progress() {
            return Err(GameError::Custom("Cannot change the kanji set during a game".to_string()));
        }

        let glyphs = self.dictionary.list_kanji(set.endpoint()).await?;
        if glyphs.is_empty() {
            return Err(GameError::DataLoad {
                set: set.endpoint().to_string(),
                reason: "API returned an empty list of kanji for this set".to_string(),
            });
        }

        self.library = glyphs;
        self.library_set = Some(set);
        self.settings.kanji_set = set;
        Ok(self.library.len())
    }

    /// Starts a new session. On failure the previous state is left untouched.
    pub async fn start_session(&mut self, options: StartOptions) -> Result<(), GameError> {
        let grid_size = options.grid_size.unwrap_or(self.settings.grid_size);
        let required = pairs_needed(grid_size)?;

        let payloads = if options.reuse_previous && self.previous.len() >= required {
            log::info!("Reusing {} kanji from the previous session", required);
            self.previous[..required].to_vec()
        } else {
            self.draw_payloads(grid_size, required).await?
        };

        let session = GameSession::start(
            payloads,
            grid_size,
            self.settings.opponent,
            self.settings.card_order_mode,
            self.settings.content_visibility.clone(),
            &mut self.rng,
        )?;

        self.scheduler.cancel_all();
        self.previous = session.board().payloads();
        self.settings.grid_size = grid_size;
        self.session = Some(session);
        self.maybe_schedule_bot();
        Ok(())
    }

    async fn draw_payloads(&mut self, grid_size: usize, required: usize) -> Result<Vec<KanjiPayload>, GameError> {
        if self.library_set != Some(self.settings.kanji_set) {
            let set = self.settings.kanji_set;
            let glyphs = self.dictionary.list_kanji(set.endpoint()).await?;
            self.library = glyphs;
            self.library_set = Some(set);
        }

        if self.library.len() < required {
            return Err(GameError::InsufficientKanji { grid_size, required, available: self.library.len() });
        }

        let glyphs: Vec<String> = self.library.choose_multiple(&mut self.rng, required).cloned().collect();
        let dictionary = &self.dictionary;
        let details = try_join_all(glyphs.iter().map(|glyph| dictionary.get_kanji_detail(glyph)))
            .await
            .map_err(|e| match e {
                GameError::DetailFetch(_) => e,
                other => GameError::DetailFetch(other.to_string()),
            })?;

        Ok(details.into_iter().map(KanjiPayload::from).collect())
    }

    /// Tears down the current session and cancels every pending timer.
    pub fn reset_session(&mut self) {
        self.scheduler.cancel_all();
        if self.session.take().is_some() {
            log::info!("Session reset");
        }
    }

    /// A click on a tile: details for a matched tile when no pair is open,
    /// otherwise a flip.
    pub async fn click_tile(&mut self, tile: TileIndex) -> Result<TileAction, FlipRejected> {
        let session = self.session.as_ref().ok_or(FlipRejected::NoSession)?;
        if session.is_processing() {
            return Err(FlipRejected::Processing);
        }
        if session.is_details_loading() {
            return Err(FlipRejected::DetailsLoading);
        }

        if session.is_tile_matched(tile) && session.flips().is_empty() {
            return self.open_kanji_details(tile).await.map(TileAction::Details);
        }
        self.flip_tile(tile).map(TileAction::Flipped)
    }

    /// Flips a tile for the local player.
    pub fn flip_tile(&mut self, tile: TileIndex) -> Result<FlipOutcome, FlipRejected> {
        let session = self.session.as_mut().ok_or(FlipRejected::NoSession)?;
        let actor = session.human_actor();
        let outcome = session.flip(tile, actor)?;

        if let FlipOutcome::PairReady(..) = outcome {
            self.scheduler.schedule(TimerKind::Reveal, self.settings.timings.reveal());
        }
        Ok(outcome)
    }

    async fn open_kanji_details(&mut self, tile: TileIndex) -> Result<KanjiDetailView, FlipRejected> {
        let session = self.session.as_mut().ok_or(FlipRejected::NoSession)?;
        let card = session.board().card(tile).ok_or(FlipRejected::OutOfRange(tile))?;
        let payload = card.payload.clone();
        let owner = session.matches().owner(card.pair_id);

        let words = match card.words.clone() {
            Some(words) => words,
            None => {
                session.set_details_loading(true);
                let words = self.words.get(&payload.kanji).await;
                if let Some(session) = self.session.as_mut() {
                    session.board_mut().attach_word_data(&payload.kanji, words.clone());
                    session.set_details_loading(false);
                }
                self.maybe_schedule_bot();
                words
            }
        };

        Ok(KanjiDetailView { tile, payload, owner, words })
    }

    /// Waits for the next timer and applies it.
    pub async fn next_timer(&mut self) -> Option<SessionEvent> {
        let event = self.scheduler.next_event().await?;
        Some(self.handle_timer(event))
    }

    /// Applies every timer that has already fired.
    pub fn poll_timers(&mut self) -> Vec<SessionEvent> {
        self.scheduler.poll_events().into_iter().map(|event| self.handle_timer(event)).collect()
    }

    pub fn has_pending_timers(&self) -> bool {
        self.scheduler.has_pending()
    }

    pub fn handle_timer(&mut self, event: TimerEvent) -> SessionEvent {
        if event.epoch != self.scheduler.epoch() {
            return SessionEvent::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return SessionEvent::Ignored;
        };
        let timings = &self.settings.timings;

        let outcome = match event.kind {
            TimerKind::Reveal => match session.evaluate_pair() {
                Some(resolution @ Resolution::Match { .. }) => match session.result() {
                    Some(result) => {
                        log::info!("Game over: {:?}", result);
                        SessionEvent::GameOver(result)
                    }
                    None => SessionEvent::Resolved(resolution),
                },
                Some(resolution @ Resolution::Mismatch { .. }) => {
                    self.scheduler.schedule(TimerKind::MismatchFlipBack, timings.mismatch_display());
                    SessionEvent::Resolved(resolution)
                }
                None => SessionEvent::Ignored,
            },
            TimerKind::MismatchFlipBack => SessionEvent::TurnPassed(session.finish_mismatch()),
            TimerKind::BotTrigger => match session.begin_bot_turn(&mut self.rng) {
                Some(choice) => {
                    self.scheduler.schedule(TimerKind::BotThink { first: choice.tile }, timings.bot_think());
                    SessionEvent::BotOpened(choice.tile)
                }
                None => SessionEvent::BotIdle,
            },
            TimerKind::BotThink { first } => match session.finish_bot_turn(first, &mut self.rng) {
                Some(FlipOutcome::PairReady(a, b)) => {
                    self.scheduler.schedule(TimerKind::Reveal, timings.reveal());
                    SessionEvent::PairFlipped(a, b)
                }
                Some(FlipOutcome::FirstFlipped(_)) => SessionEvent::Ignored,
                None => SessionEvent::BotIdle,
            },
        };

        self.maybe_schedule_bot();
        outcome
    }

    /// Arms the bot trigger once when the bot is free to move.
    fn maybe_schedule_bot(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if session.bot_may_move() && !self.scheduler.is_pending(TimerSlot::BotTrigger) {
            self.scheduler.schedule(TimerKind::BotTrigger, self.settings.timings.bot_trigger());
        }
    }

    pub fn change_content_visibility(
        &mut self,
        field: ContentField,
        context: VisibilityContext,
        level: VisibilityLevel,
    ) {
        self.settings.content_visibility.set(field, context, level);
        if let Some(session) = self.session.as_mut() {
            session.content_mut().set(field, context, level);
        }
    }

    pub fn cycle_content_visibility(&mut self, field: ContentField, context: VisibilityContext) -> VisibilityLevel {
        let level = self.settings.content_visibility.level(field, context).next();
        self.change_content_visibility(field, context, level);
        level
    }

    /// Recorded now, applied when the next session starts.
    pub fn change_card_order_mode(&mut self, mode: CardOrderMode) {
        self.settings.card_order_mode = mode;
    }

    /// Applies from the next turn. Cards already face-up are resolved by the
    /// player who opened them, and a bot turn under way keeps its difficulty.
    pub fn change_opponent_type(&mut self, opponent: OpponentType) {
        self.settings.opponent = opponent;
        if let Some(session) = self.session.as_mut() {
            session.set_opponent(opponent);
        }
        if !opponent.is_bot() {
            self.scheduler.cancel(TimerSlot::BotTrigger);
        }
        self.maybe_schedule_bot();
    }

    pub fn set_mismatch_duration(&mut self, millis: u64) -> Result<(), GameError> {
        if millis == 0 {
            return Err(GameError::Custom("Mismatch display duration must be non-zero".to_string()));
        }
        self.settings.timings.mismatch_display_ms = millis;
        Ok(())
    }

    pub fn set_show_bot_memory(&mut self, show: bool) {
        self.settings.show_bot_memory = show;
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(|s| s.snapshot(self.settings.show_bot_memory))
    }
}
