use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    bot::OpponentType,
    core::GameError,
    dictionary::{
        KanjiSet,
        DEFAULT_API_BASE_URL,
    },
    game::{
        session::pairs_needed,
        CardOrderMode,
        ContentVisibility,
    },
};

const APP_NAME: &str = "kanji-memory";
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub reveal_ms: u64,
    pub mismatch_display_ms: u64,
    pub bot_think_ms: u64,
    pub bot_trigger_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self { reveal_ms: 1000, mismatch_display_ms: 1500, bot_think_ms: 1000, bot_trigger_ms: 500 }
    }
}

impl Timings {
    pub fn reveal(&self) -> Duration {
        Duration::from_millis(self.reveal_ms)
    }

    pub fn mismatch_display(&self) -> Duration {
        Duration::from_millis(self.mismatch_display_ms)
    }

    pub fn bot_think(&self) -> Duration {
        Duration::from_millis(self.bot_think_ms)
    }

    pub fn bot_trigger(&self) -> Duration {
        Duration::from_millis(self.bot_trigger_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub grid_size: usize,
    pub opponent: OpponentType,
    pub card_order_mode: CardOrderMode,
    pub kanji_set: KanjiSet,
    pub content_visibility: ContentVisibility,
    /// Marks face-down tiles the bot remembers.
    pub show_bot_memory: bool,
    pub timings: Timings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 15,
            grid_size: 6,
            opponent: OpponentType::default(),
            card_order_mode: CardOrderMode::default(),
            kanji_set: KanjiSet::default(),
            content_visibility: ContentVisibility::default(),
            show_bot_memory: false,
            timings: Timings::default(),
        }
    }
}

impl GameSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        pairs_needed(self.grid_size)?;

        let t = &self.timings;
        if [t.reveal_ms, t.mismatch_display_ms, t.bot_think_ms, t.bot_trigger_ms].contains(&0) {
            return Err(GameError::Custom("Timings must be non-zero".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(GameError::Custom("Request timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

pub fn get_config_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_NAME),
        None => PathBuf::from("."),
    }
}

pub fn get_settings_path() -> PathBuf {
    get_config_dir().join(SETTINGS_FILE)
}

pub fn load_settings_from(path: &Path) -> Result<GameSettings, GameError> {
    if !path.exists() {
        return Ok(GameSettings::default());
    }

    let json = fs::read_to_string(path)?;
    let settings: GameSettings = serde_json::from_str(&json)?;
    settings.validate()?;
    log::info!("Settings loaded from: {}", path.display());
    Ok(settings)
}

pub fn load_settings_or_default(path: &Path) -> GameSettings {
    match load_settings_from(path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
            GameSettings::default()
        }
    }
}

pub fn load_settings() -> GameSettings {
    load_settings_or_default(&get_settings_path())
}
