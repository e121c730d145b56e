use serde::{
    Deserialize,
    Serialize,
};

use crate::core::GameError;

/// Twelve-slot difficulty configuration. Slot order is fixed; see
/// [`BotConfig::slots`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Percent chance to play a fully known pair.
    pub known_pair_chance: f64,
    pub first_known: f64,
    pub first_new: f64,
    pub first_random: f64,
    pub second_unknown_known: f64,
    pub second_unknown_new: f64,
    pub second_unknown_random: f64,
    pub second_known_match: f64,
    pub second_known_random_close: f64,
    pub second_known_random: f64,
    pub second_known_new: f64,
    pub second_known_known: f64,
}

impl BotConfig {
    const fn tier(s: [f64; 12]) -> Self {
        Self {
            known_pair_chance: s[0],
            first_known: s[1],
            first_new: s[2],
            first_random: s[3],
            second_unknown_known: s[4],
            second_unknown_new: s[5],
            second_unknown_random: s[6],
            second_known_match: s[7],
            second_known_random_close: s[8],
            second_known_random: s[9],
            second_known_new: s[10],
            second_known_known: s[11],
        }
    }

    /// Builds a configuration from slot values. Every slot must be a finite,
    /// non-negative number.
    pub fn from_slots(slots: [f64; 12]) -> Result<Self, GameError> {
        if let Some((i, value)) = slots.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(GameError::InvalidBotConfig(format!("slot {} is {}", i, value)));
        }
        Ok(Self::tier(slots))
    }

    pub fn slots(&self) -> [f64; 12] {
        [
            self.known_pair_chance,
            self.first_known,
            self.first_new,
            self.first_random,
            self.second_unknown_known,
            self.second_unknown_new,
            self.second_unknown_random,
            self.second_known_match,
            self.second_known_random_close,
            self.second_known_random,
            self.second_known_new,
            self.second_known_known,
        ]
    }
}

const RANDOMIZER: BotConfig = BotConfig::tier([0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 100.0, 0.0, 0.0, 100.0, 0.0, 0.0]);
const NOVICE: BotConfig = BotConfig::tier([0.0, 5.0, 90.0, 5.0, 0.0, 0.0, 100.0, 20.0, 0.0, 80.0, 0.0, 0.0]);
const CASUAL: BotConfig = BotConfig::tier([0.0, 20.0, 70.0, 10.0, 25.0, 75.0, 0.0, 30.0, 0.0, 70.0, 0.0, 0.0]);
const SHREWD: BotConfig = BotConfig::tier([50.0, 20.0, 80.0, 0.0, 25.0, 75.0, 0.0, 40.0, 0.0, 0.0, 30.0, 30.0]);
const MASTER: BotConfig = BotConfig::tier([75.0, 30.0, 60.0, 10.0, 25.0, 75.0, 0.0, 70.0, 0.0, 0.0, 5.0, 25.0]);
const ELITE: BotConfig = BotConfig::tier([100.0, 5.0, 95.0, 0.0, 25.0, 75.0, 0.0, 80.0, 0.0, 20.0, 0.0, 0.0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpponentType {
    /// A second human at the same screen.
    #[serde(rename = "PLAYER2")]
    Player2,
    Randomizer,
    Novice,
    #[default]
    Casual,
    Shrewd,
    Master,
    Elite,
}

impl OpponentType {
    pub const ALL: [OpponentType; 7] = [
        OpponentType::Player2,
        OpponentType::Randomizer,
        OpponentType::Novice,
        OpponentType::Casual,
        OpponentType::Shrewd,
        OpponentType::Master,
        OpponentType::Elite,
    ];

    pub fn is_bot(&self) -> bool {
        !matches!(self, OpponentType::Player2)
    }

    pub fn bot_config(&self) -> Option<BotConfig> {
        match self {
            OpponentType::Player2 => None,
            OpponentType::Randomizer => Some(RANDOMIZER),
            OpponentType::Novice => Some(NOVICE),
            OpponentType::Casual => Some(CASUAL),
            OpponentType::Shrewd => Some(SHREWD),
            OpponentType::Master => Some(MASTER),
            OpponentType::Elite => Some(ELITE),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OpponentType::Player2 => "Player 2 (Human)",
            OpponentType::Randomizer => "Randomizer Bot",
            OpponentType::Novice => "Novice Bot",
            OpponentType::Casual => "Casual Bot",
            OpponentType::Shrewd => "Shrewd Bot",
            OpponentType::Master => "Master Bot",
            OpponentType::Elite => "Elite Bot",
        }
    }

    pub fn from_name(name: &str) -> Option<OpponentType> {
        let name = name.to_ascii_lowercase();
        OpponentType::ALL.into_iter().find(|o| {
            let debug = format!("{:?}", o).to_ascii_lowercase();
            debug == name || (name == "human" && *o == OpponentType::Player2)
        })
    }
}
