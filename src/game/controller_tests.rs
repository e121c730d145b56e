use std::{
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
    time::Duration,
};

use rand::{
    rngs::StdRng,
    SeedableRng,
};
use tokio::time::Instant;

use super::{
    controller::{
        SessionController,
        SessionEvent,
        StartOptions,
        TileAction,
    },
    ContentField,
    Face,
    FlipOutcome,
    Player,
    Resolution,
    VisibilityContext,
    VisibilityLevel,
};
use crate::{
    bot::OpponentType,
    config::GameSettings,
    core::{
        FlipRejected,
        GameError,
    },
    dictionary::{
        BuiltinDictionary,
        DictionaryService,
        KanjiDetail,
        KanjiSet,
        WordEntry,
        WordMeaning,
        WordVariant,
    },
};

/// Built-in data behind call counters, with an optional size cap and failing
/// detail lookups.
#[derive(Default)]
struct CountingDictionary {
    library_size: Option<usize>,
    fail_details: bool,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    word_calls: AtomicUsize,
}

impl DictionaryService for CountingDictionary {
    async fn list_kanji(&self, _set_id: &str) -> Result<Vec<String>, GameError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut glyphs = BuiltinDictionary::glyphs();
        if let Some(size) = self.library_size {
            glyphs.truncate(size);
        }
        Ok(glyphs)
    }

    async fn get_kanji_detail(&self, glyph: &str) -> Result<KanjiDetail, GameError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        if self.fail_details {
            return Err(GameError::DetailFetch(format!("Failed to fetch details for {glyph}")));
        }
        BuiltinDictionary::detail(glyph).ok_or_else(|| GameError::DetailFetch(glyph.to_string()))
    }

    async fn get_words(&self, glyph: &str) -> Result<Vec<WordEntry>, GameError> {
        self.word_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok((0..23)
            .map(|i| WordEntry {
                variants: vec![WordVariant {
                    written: format!("{glyph}{i}"),
                    pronounced: String::new(),
                    priorities: Vec::new(),
                }],
                meanings: vec![WordMeaning { glosses: vec![format!("word {i}")] }],
            })
            .collect())
    }
}

fn settings(opponent: OpponentType, grid_size: usize) -> GameSettings {
    GameSettings { opponent, grid_size, ..GameSettings::default() }
}

fn controller(
    dictionary: CountingDictionary,
    opponent: OpponentType,
    grid_size: usize,
) -> (SessionController<CountingDictionary>, Arc<CountingDictionary>) {
    let dictionary = Arc::new(dictionary);
    let controller = SessionController::with_rng(
        dictionary.clone(),
        settings(opponent, grid_size),
        StdRng::seed_from_u64(2024),
    );
    (controller, dictionary)
}

/// Index of a tile holding the same kanji as `tile`, and of one that does not.
fn partner_and_stranger(controller: &SessionController<CountingDictionary>, tile: usize) -> (usize, usize) {
    let board = controller.session().expect("session running").board();
    let partner = board.partner(tile).expect("every tile has a partner");
    let stranger = (0..board.len())
        .find(|&t| t != tile && t != partner)
        .expect("more than one pair");
    (partner, stranger)
}

#[tokio::test(start_paused = true)]
async fn test_insufficient_kanji_fails_before_detail_fetch() {
    let (mut controller, dictionary) = controller(
        CountingDictionary { library_size: Some(10), ..Default::default() },
        OpponentType::Casual,
        6,
    );

    let result = controller.start_session(StartOptions::default()).await;

    assert!(matches!(
        result,
        Err(GameError::InsufficientKanji { grid_size: 6, required: 18, available: 10 })
    ));
    assert_eq!(dictionary.detail_calls.load(Ordering::SeqCst), 0);
    assert!(controller.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_start_fetches_every_detail() {
    let (mut controller, dictionary) = controller(CountingDictionary::default(), OpponentType::Player2, 4);

    controller.start_session(StartOptions::default()).await.expect("session starts");

    let session = controller.session().expect("session running");
    assert_eq!(session.board().len(), 16);
    assert_eq!(dictionary.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(dictionary.detail_calls.load(Ordering::SeqCst), 8);
    assert_eq!(controller.library().len(), BuiltinDictionary::glyphs().len());
}

#[tokio::test(start_paused = true)]
async fn test_detail_failure_aborts_start() {
    let (mut controller, _) = controller(
        CountingDictionary { fail_details: true, ..Default::default() },
        OpponentType::Casual,
        4,
    );

    let result = controller.start_session(StartOptions::default()).await;
    assert!(matches!(result, Err(GameError::DetailFetch(_))));
    assert!(controller.session().is_none());
    assert!(!controller.has_pending_timers());
}

#[tokio::test(start_paused = true)]
async fn test_reuse_previous_skips_network() {
    let (mut controller, dictionary) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let mut first: Vec<String> =
        controller.session().expect("session").board().payloads().into_iter().map(|p| p.kanji).collect();

    controller.reset_session();
    controller
        .start_session(StartOptions { reuse_previous: true, ..Default::default() })
        .await
        .expect("session restarts");

    let mut second: Vec<String> =
        controller.session().expect("session").board().payloads().into_iter().map(|p| p.kanji).collect();
    first.sort();
    second.sort();
    assert_eq!(first, second);
    assert_eq!(dictionary.detail_calls.load(Ordering::SeqCst), 8);

    // A larger grid has too few previous kanji and draws afresh.
    controller.reset_session();
    controller
        .start_session(StartOptions { grid_size: Some(6), reuse_previous: true })
        .await
        .expect("session restarts");
    assert_eq!(dictionary.detail_calls.load(Ordering::SeqCst), 8 + 18);
}

#[tokio::test(start_paused = true)]
async fn test_match_resolves_after_reveal_without_mismatch_delay() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let (partner, _) = partner_and_stranger(&controller, 0);

    assert_eq!(controller.flip_tile(0), Ok(FlipOutcome::FirstFlipped(0)));
    assert_eq!(controller.flip_tile(partner), Ok(FlipOutcome::PairReady(0, partner)));
    assert_eq!(controller.flip_tile(5), Err(FlipRejected::Processing));

    let started = Instant::now();
    let event = controller.next_timer().await.expect("reveal fires");
    assert!(started.elapsed() >= Duration::from_millis(1000));

    let session = controller.session().expect("session running");
    let pair_id = session.board().pair_id(0).expect("tile 0 exists");
    assert_eq!(event, SessionEvent::Resolved(Resolution::Match { pair_id, player: Player::One }));
    assert!(session.is_matched(pair_id));
    assert_eq!(session.scores().player1, 1);
    assert_eq!(session.current_player(), Player::One);
    assert!(session.flips().is_empty());
    assert!(!session.is_processing());
    assert!(!controller.has_pending_timers());
}

#[tokio::test(start_paused = true)]
async fn test_mismatch_flips_back_and_passes_turn() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    controller.set_mismatch_duration(2000).expect("valid duration");
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let (_, stranger) = partner_and_stranger(&controller, 0);

    controller.flip_tile(0).expect("first flip");
    controller.flip_tile(stranger).expect("second flip");

    let event = controller.next_timer().await.expect("reveal fires");
    assert_eq!(event, SessionEvent::Resolved(Resolution::Mismatch { first: 0, second: stranger }));
    let snapshot = controller.snapshot().expect("session running");
    assert_eq!(snapshot.tiles[0].face, Face::Front);
    assert_eq!(snapshot.tiles[stranger].face, Face::Front);
    assert!(snapshot.processing);

    let started = Instant::now();
    let event = controller.next_timer().await.expect("flip back fires");
    assert!(started.elapsed() >= Duration::from_millis(2000));
    assert_eq!(event, SessionEvent::TurnPassed(Player::Two));

    let snapshot = controller.snapshot().expect("session running");
    assert_eq!(snapshot.tiles[0].face, Face::Back);
    assert_eq!(snapshot.tiles[stranger].face, Face::Back);
    assert_eq!(snapshot.current_player, Player::Two);
    assert_eq!(snapshot.scores.player1 + snapshot.scores.player2, 0);
    assert!(!snapshot.processing);

    // A local second player now acts.
    assert!(controller.flip_tile(0).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_timers() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let (_, stranger) = partner_and_stranger(&controller, 0);
    controller.flip_tile(0).expect("first flip");
    controller.flip_tile(stranger).expect("second flip");
    assert!(controller.has_pending_timers());

    controller.reset_session();
    assert!(!controller.has_pending_timers());
    assert!(controller.session().is_none());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(controller.poll_timers().is_empty());
    assert_eq!(controller.flip_tile(0), Err(FlipRejected::NoSession));
}

#[tokio::test(start_paused = true)]
async fn test_bot_game_runs_to_completion() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Master, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");

    let mut bot_pairs = 0;
    for _ in 0..10_000 {
        let session = controller.session().expect("session running");
        if session.is_game_over() {
            break;
        }

        if session.current_player() == Player::One && !session.is_processing() {
            let tile = (0..session.board().len())
                .find(|&t| !session.is_tile_matched(t) && !session.is_flipped(t))
                .expect("an open tile remains");
            controller.flip_tile(tile).expect("human flip accepted");
            continue;
        }

        assert!(controller.has_pending_timers(), "turn loop stalled");
        if let Some(SessionEvent::PairFlipped(a, b)) = controller.next_timer().await {
            assert_ne!(a, b);
            bot_pairs += 1;
        }
    }

    let snapshot = controller.snapshot().expect("session running");
    assert!(snapshot.game_over);
    assert!(snapshot.result.is_some());
    assert_eq!(snapshot.scores.player1 + snapshot.scores.player2, 8);
    assert!(snapshot.tiles.iter().all(|t| t.matched && t.owner.is_some()));
    assert!(bot_pairs > 0);
    assert!(!controller.has_pending_timers());
}

#[tokio::test(start_paused = true)]
async fn test_bot_trigger_is_scheduled_once_after_mismatch() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Randomizer, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let (_, stranger) = partner_and_stranger(&controller, 0);
    controller.flip_tile(0).expect("first flip");
    controller.flip_tile(stranger).expect("second flip");

    controller.next_timer().await.expect("reveal");
    assert_eq!(controller.next_timer().await, Some(SessionEvent::TurnPassed(Player::Two)));
    assert_eq!(controller.flip_tile(1), Err(FlipRejected::NotYourTurn));

    let started = Instant::now();
    match controller.next_timer().await {
        Some(SessionEvent::BotOpened(_)) => {}
        other => panic!("expected the bot to open a tile, got {:?}", other),
    }
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(controller.session().expect("session").is_processing());

    match controller.next_timer().await {
        Some(SessionEvent::PairFlipped(..)) => {}
        other => panic!("expected the bot's second card, got {:?}", other),
    }
    assert_eq!(controller.session().expect("session").flips().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_switching_to_human_cancels_bot_trigger() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Casual, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let (_, stranger) = partner_and_stranger(&controller, 0);
    controller.flip_tile(0).expect("first flip");
    controller.flip_tile(stranger).expect("second flip");
    controller.next_timer().await.expect("reveal");
    controller.next_timer().await.expect("flip back");
    assert!(controller.has_pending_timers());

    controller.change_opponent_type(OpponentType::Player2);
    assert!(!controller.has_pending_timers());
    assert_eq!(controller.flip_tile(0), Ok(FlipOutcome::FirstFlipped(0)));
    assert_eq!(controller.settings().opponent, OpponentType::Player2);
}

#[tokio::test(start_paused = true)]
async fn test_bot_takes_over_after_open_human_turn() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let (partner, stranger) = partner_and_stranger(&controller, 0);
    controller.flip_tile(0).expect("first flip");
    controller.flip_tile(stranger).expect("second flip");
    controller.next_timer().await.expect("reveal");
    assert_eq!(controller.next_timer().await, Some(SessionEvent::TurnPassed(Player::Two)));

    // Player 2 has a card up when the bot is chosen.
    controller.flip_tile(0).expect("player 2 opens a card");
    controller.change_opponent_type(OpponentType::Casual);
    assert!(!controller.has_pending_timers());
    let session = controller.session().expect("session running");
    assert_eq!(session.opponent(), OpponentType::Player2);
    assert_eq!(session.pending_opponent(), Some(OpponentType::Casual));

    // The open turn is finished by Player 2.
    assert_eq!(controller.flip_tile(partner), Ok(FlipOutcome::PairReady(0, partner)));
    match controller.next_timer().await {
        Some(SessionEvent::Resolved(Resolution::Match { player: Player::Two, .. })) => {}
        other => panic!("expected a match for player 2, got {:?}", other),
    }
    let session = controller.session().expect("session running");
    assert_eq!(session.opponent(), OpponentType::Casual);
    assert_eq!(session.pending_opponent(), None);

    // The bot now plays Player 2's next turn.
    match controller.next_timer().await {
        Some(SessionEvent::BotOpened(_)) => {}
        other => panic!("expected the bot to open a tile, got {:?}", other),
    }
    match controller.next_timer().await {
        Some(SessionEvent::PairFlipped(..)) => {}
        other => panic!("expected the bot's second card, got {:?}", other),
    }
    assert_eq!(controller.session().expect("session").flips().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_matched_tile_opens_details_once() {
    let (mut controller, dictionary) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");
    let (partner, _) = partner_and_stranger(&controller, 0);
    controller.flip_tile(0).expect("first flip");
    controller.flip_tile(partner).expect("second flip");
    controller.next_timer().await.expect("reveal");

    let view = match controller.click_tile(partner).await {
        Ok(TileAction::Details(view)) => view,
        other => panic!("expected details, got {:?}", other),
    };
    assert_eq!(view.owner, Some(Player::One));
    assert_eq!(view.words.len(), 23);
    assert_eq!(view.page_count(), 3);
    assert_eq!(view.page(0).len(), 10);
    assert_eq!(view.page(2).len(), 3);
    assert!(view.page(3).is_empty());
    assert!(view.page(usize::MAX).is_empty());
    assert!(!controller.session().expect("session").is_details_loading());

    let again = match controller.click_tile(0).await {
        Ok(TileAction::Details(view)) => view,
        other => panic!("expected details, got {:?}", other),
    };
    assert!(Arc::ptr_eq(&view.words, &again.words));
    assert_eq!(dictionary.word_calls.load(Ordering::SeqCst), 1);

    let card = &controller.session().expect("session").board().cards()[0];
    assert!(card.words.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_word_requests_share_one_fetch() {
    let (controller, dictionary) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    let cache = controller.word_cache();

    let (a, b) = tokio::join!(cache.get("水"), cache.get("水"));

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(dictionary.word_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_settings_changes() {
    let (mut controller, _) = controller(CountingDictionary::default(), OpponentType::Player2, 4);
    controller.start_session(StartOptions::default()).await.expect("session starts");

    controller.change_content_visibility(ContentField::Unicode, VisibilityContext::Flipped, VisibilityLevel::Both);
    controller.flip_tile(0).expect("first flip");
    let snapshot = controller.snapshot().expect("session running");
    assert!(snapshot.tiles[0].lines.iter().any(|l| l.starts_with("U+")));

    assert_eq!(
        controller.cycle_content_visibility(ContentField::Unicode, VisibilityContext::Flipped),
        VisibilityLevel::FirstOnly
    );
    assert!(controller.set_mismatch_duration(0).is_err());

    // Set changes wait for the game to end.
    assert!(controller.load_kanji_set(KanjiSet::JlptN5).await.is_err());
    controller.reset_session();
    assert!(controller.load_kanji_set(KanjiSet::JlptN5).await.is_ok());
    assert_eq!(controller.settings().kanji_set, KanjiSet::JlptN5);
}
