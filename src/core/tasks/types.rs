pub use super::handle::TaskHandle;
use crate::game::TileIndex;

/// At most one timer is pending per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    Reveal,
    MismatchFlipBack,
    BotTrigger,
    BotThink,
}

/// A delayed continuation of the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Both cards have been visible long enough; evaluate the pair.
    Reveal,
    /// A mismatched pair has been shown long enough; flip it back.
    MismatchFlipBack,
    /// The bot may start its turn.
    BotTrigger,
    /// The bot has looked at its first card; pick the second.
    BotThink { first: TileIndex },
}

impl TimerKind {
    pub fn slot(&self) -> TimerSlot {
        match self {
            TimerKind::Reveal => TimerSlot::Reveal,
            TimerKind::MismatchFlipBack => TimerSlot::MismatchFlipBack,
            TimerKind::BotTrigger => TimerSlot::BotTrigger,
            TimerKind::BotThink { .. } => TimerSlot::BotThink,
        }
    }

    pub fn task_type(&self) -> &'static str {
        match self {
            TimerKind::Reveal => "reveal",
            TimerKind::MismatchFlipBack => "mismatch_flip_back",
            TimerKind::BotTrigger => "bot_trigger",
            TimerKind::BotThink { .. } => "bot_think",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    /// Scheduler epoch at the time the timer was armed.
    pub epoch: u64,
    /// Distinguishes successive timers armed in the same slot.
    pub serial: u64,
    pub kind: TimerKind,
}
