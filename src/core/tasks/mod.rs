pub mod handle;
pub mod manager;
pub mod types;

pub use manager::Scheduler;
pub use types::{
    TaskHandle,
    TimerEvent,
    TimerKind,
    TimerSlot,
};
