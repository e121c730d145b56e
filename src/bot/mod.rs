pub mod config;
pub mod engine;
pub mod memory;
pub mod weighted;

pub use config::{
    BotConfig,
    OpponentType,
};
pub use engine::{
    FirstAction,
    FirstChoice,
    OpponentEngine,
    SecondAction,
    SecondChoice,
};
pub use memory::BotMemory;
pub use weighted::select_weighted;
