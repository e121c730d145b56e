pub mod errors;
pub mod http;
pub mod tasks;
pub mod utils;

pub use errors::{
    FlipRejected,
    GameError,
};
