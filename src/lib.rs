pub mod bot;
pub mod config;
pub mod core;
pub mod dictionary;
pub mod game;

pub use config::GameSettings;
pub use core::{
    FlipRejected,
    GameError,
};
pub use game::{
    SessionController,
    StartOptions,
};
