use std::{
    env,
    process,
    sync::Arc,
};

use env_logger::{
    Builder,
    Env,
};
use kanji_memory::{
    bot::OpponentType,
    config::{
        self,
        GameSettings,
    },
    core::GameError,
    dictionary::{
        BuiltinDictionary,
        DictionaryService,
        KanjiApiClient,
        KanjiSet,
    },
    game::{
        CardOrderMode,
        ContentField,
        Face,
        GameResult,
        KanjiDetailView,
        Player,
        Resolution,
        SessionController,
        SessionEvent,
        StartOptions,
        TileAction,
        VisibilityContext,
        VisibilityLevel,
    },
};
use serde::de::DeserializeOwned;
use tokio::io::{
    AsyncBufReadExt,
    BufReader,
};

const HELP: &str = "\
Commands:
  <n>                     click tile n (flip, or open details of a matched tile)
  more                    next page of words in the open details
  new [size] [reuse]      start a new game, optionally replaying the last kanji
  reset                   abandon the current game
  set <id>                load a kanji set (joyo, grade-1, jlpt-5, ...)
  opp <name>              opponent: human, randomizer, novice, casual, shrewd, master, elite
  mode <name>             card order: flip_order, first_flip_sticky, random_per_pair, random_global
  vis <field> <matched|flipped> [level]
                          set or cycle a content field's visibility
  delay <ms>              mismatch display duration
  debug                   toggle the bot memory overlay
  help                    show this text
  q                       quit";

#[tokio::main]
async fn main() {
    Builder::from_env(Env::default().default_filter_or("warn")).init();

    let settings = config::load_settings();
    let offline = env::args().skip(1).any(|arg| arg == "--offline");

    let result = if offline {
        run(Arc::new(BuiltinDictionary::new()), settings).await
    } else {
        match KanjiApiClient::new(&settings.api_base_url, settings.request_timeout()) {
            Ok(client) => run(Arc::new(client), settings).await,
            Err(e) => Err(e),
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Word-list pager state for the open detail view.
struct OpenDetails {
    view: KanjiDetailView,
    page: usize,
}

async fn run<D: DictionaryService>(dictionary: Arc<D>, settings: GameSettings) -> Result<(), GameError> {
    let mut controller = SessionController::new(dictionary, settings);
    let mut details: Option<OpenDetails> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", HELP);
    start(&mut controller, StartOptions::default()).await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle_command(&mut controller, &mut details, line.trim()).await {
                    break;
                }
            }
            Some(event) = controller.next_timer() => {
                if report_event(&controller, &event) {
                    print_board(&controller);
                }
            }
        }
    }

    Ok(())
}

async fn start<D: DictionaryService>(controller: &mut SessionController<D>, options: StartOptions) {
    println!("Loading kanji from {}...", controller.settings().kanji_set.label());
    match controller.start_session(options).await {
        Ok(()) => print_board(controller),
        Err(e @ GameError::DataLoad { .. }) => eprintln!("{}\nType `new` to retry.", e),
        Err(e) => eprintln!("{}", e),
    }
}

/// Returns false when the player quits.
async fn handle_command<D: DictionaryService>(
    controller: &mut SessionController<D>,
    details: &mut Option<OpenDetails>,
    line: &str,
) -> bool {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return true;
    };
    let args: Vec<&str> = parts.collect();

    if let Ok(number) = command.parse::<usize>() {
        click(controller, details, number).await;
        return true;
    }

    match command {
        "q" | "quit" | "exit" => return false,
        "help" | "h" | "?" => println!("{}", HELP),
        "more" | "m" => match details.as_mut() {
            Some(open) if open.page + 1 < open.view.page_count() => {
                open.page += 1;
                print_details(open);
            }
            Some(_) => println!("No more words."),
            None => println!("No kanji details are open."),
        },
        "new" | "n" => {
            let mut options = StartOptions::default();
            for arg in &args {
                match arg.parse::<usize>() {
                    Ok(size) => options.grid_size = Some(size),
                    Err(_) if matches!(*arg, "reuse" | "r") => options.reuse_previous = true,
                    Err(_) => println!("Ignoring unknown option '{}'", arg),
                }
            }
            *details = None;
            start(controller, options).await;
        }
        "reset" => {
            controller.reset_session();
            *details = None;
            println!("Game abandoned. Type `new` to start another.");
        }
        "set" => match args.first().and_then(|id| KanjiSet::from_endpoint(id)) {
            Some(set) => match controller.load_kanji_set(set).await {
                Ok(count) => println!("Loaded {} ({} kanji).", set.label(), count),
                Err(e) => eprintln!("{}", e),
            },
            None => {
                let ids: Vec<&str> = KanjiSet::ALL.iter().map(|s| s.endpoint()).collect();
                println!("Known sets: {}", ids.join(", "));
            }
        },
        "opp" | "opponent" => match args.first().and_then(|name| OpponentType::from_name(name)) {
            Some(opponent) => {
                controller.change_opponent_type(opponent);
                println!("Opponent: {}", opponent.label());
            }
            None => println!("Unknown opponent."),
        },
        "mode" => match args.first().and_then(|name| parse_screaming::<CardOrderMode>(name)) {
            Some(mode) => {
                controller.change_card_order_mode(mode);
                println!("Card order: {} (from the next game)", mode.label());
            }
            None => println!("Unknown card order mode."),
        },
        "vis" => change_visibility(controller, &args),
        "delay" => match args.first().and_then(|ms| ms.parse::<u64>().ok()) {
            Some(ms) => match controller.set_mismatch_duration(ms) {
                Ok(()) => println!("Mismatch display: {} ms", ms),
                Err(e) => eprintln!("{}", e),
            },
            None => println!("Usage: delay <ms>"),
        },
        "debug" => {
            let show = !controller.settings().show_bot_memory;
            controller.set_show_bot_memory(show);
            println!("Bot memory overlay {}", if show { "on" } else { "off" });
            print_board(controller);
        }
        other => println!("Unknown command '{}'. Type `help`.", other),
    }

    true
}

async fn click<D: DictionaryService>(
    controller: &mut SessionController<D>,
    details: &mut Option<OpenDetails>,
    number: usize,
) {
    let Some(tile) = number.checked_sub(1) else {
        println!("Tiles are numbered from 1.");
        return;
    };

    match controller.click_tile(tile).await {
        Ok(TileAction::Flipped(_)) => print_board(controller),
        Ok(TileAction::Details(view)) => {
            let open = OpenDetails { view, page: 0 };
            print_details(&open);
            *details = Some(open);
        }
        Err(rejected) => println!("Ignored: {}", rejected),
    }
}

fn change_visibility<D: DictionaryService>(controller: &mut SessionController<D>, args: &[&str]) {
    let field = args.first().and_then(|key| ContentField::from_key(key));
    let context = args.get(1).and_then(|name| parse_lower::<VisibilityContext>(name));

    let (Some(field), Some(context)) = (field, context) else {
        let keys: Vec<String> = ContentField::ALL.iter().map(|f| format!("{:?}", f)).collect();
        println!("Usage: vis <{}> <matched|flipped> [never|both|first_only|second_only]", keys.join("|"));
        return;
    };

    let level = match args.get(2) {
        Some(name) => match parse_screaming::<VisibilityLevel>(name) {
            Some(level) => {
                controller.change_content_visibility(field, context, level);
                level
            }
            None => {
                println!("Unknown level '{}'", name);
                return;
            }
        },
        None => controller.cycle_content_visibility(field, context),
    };

    println!("{} ({:?}): {}", field.label(), context, level.label());
    print_board(controller);
}

fn parse_screaming<T: DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(name.to_ascii_uppercase())).ok()
}

fn parse_lower<T: DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(name.to_ascii_lowercase())).ok()
}

fn player_name<D: DictionaryService>(controller: &SessionController<D>, player: Player) -> String {
    let opponent = controller.session().map(|s| s.opponent()).unwrap_or(controller.settings().opponent);
    match player {
        Player::Two if opponent.is_bot() => opponent.label().to_string(),
        _ => player.to_string(),
    }
}

/// Prints what a timer did. Returns true when the board changed.
fn report_event<D: DictionaryService>(controller: &SessionController<D>, event: &SessionEvent) -> bool {
    match event {
        SessionEvent::Resolved(Resolution::Match { player, .. }) => {
            println!("Match for {}!", player_name(controller, *player));
        }
        SessionEvent::Resolved(Resolution::Mismatch { .. }) => println!("No match."),
        SessionEvent::TurnPassed(player) => println!("{}'s turn.", player_name(controller, *player)),
        SessionEvent::BotOpened(tile) => println!("Bot flips tile {}.", tile + 1),
        SessionEvent::PairFlipped(_, second) => println!("Bot flips tile {}.", second + 1),
        SessionEvent::GameOver(result) => {
            match result {
                GameResult::Winner(player) => println!("Game over: {} wins!", player_name(controller, *player)),
                GameResult::Tie => println!("Game over: it's a tie!"),
            }
            println!("Click a matched tile for its details, or type `new`.");
        }
        SessionEvent::BotIdle | SessionEvent::Ignored => return false,
    }
    true
}

fn print_board<D: DictionaryService>(controller: &SessionController<D>) {
    let Some(snapshot) = controller.snapshot() else {
        return;
    };

    println!();
    for row in snapshot.tiles.chunks(snapshot.grid_size.max(1)) {
        let cells: Vec<String> = row
            .iter()
            .map(|tile| {
                let face = match (&tile.glyph, tile.bot_known) {
                    (Some(glyph), _) => glyph.clone(),
                    (None, true) => "**".to_string(),
                    (None, false) => "··".to_string(),
                };
                let marker = match tile.owner {
                    Some(owner) => char::from(b'0' + owner.number()),
                    None => ' ',
                };
                format!("{:>2}:{}{}", tile.index + 1, face, marker)
            })
            .collect();
        println!("  {}", cells.join("  "));
    }

    for tile in snapshot.tiles.iter().filter(|t| t.face == Face::Front && !t.lines.is_empty()) {
        let role = tile.role.map(|r| format!(" [{:?}]", r)).unwrap_or_default();
        println!("  #{}{}: {}", tile.index + 1, role, tile.lines.join(" | "));
    }

    println!(
        "\n  {}: {}   {}: {}",
        player_name(controller, Player::One),
        snapshot.scores.player1,
        player_name(controller, Player::Two),
        snapshot.scores.player2,
    );
    if !snapshot.game_over {
        println!("  Turn: {}", player_name(controller, snapshot.current_player));
    }
}

fn print_details(open: &OpenDetails) {
    let payload = &open.view.payload;

    if open.page == 0 {
        println!("\n  {}  {}", payload.kanji, payload.meaning);
        println!("  On: {}   Kun: {}", payload.on, payload.kun);
        println!("  Romaji: {} / {}", payload.on_romaji, payload.kun_romaji);
        println!("  Name readings: {}", payload.name_readings);
        if let Some(strokes) = payload.stroke_count {
            println!("  Strokes: {}", strokes);
        }
        if let Some(rank) = payload.frequency_rank {
            println!("  Frequency: #{}", rank);
        }
        if let Some(owner) = open.view.owner {
            println!("  Matched by {}", owner);
        }
    }

    if open.view.words.is_empty() {
        println!("  No dictionary words found.");
        return;
    }

    println!("  Words (page {}/{}):", open.page + 1, open.view.page_count());
    for word in open.view.page(open.page) {
        let Some(head) = word.headword() else {
            continue;
        };
        println!("    {} [{}] {}", head.written, head.pronounced, word.glosses().join("; "));
    }
    if open.page + 1 < open.view.page_count() {
        println!("  Type `more` for the next page.");
    }
}
