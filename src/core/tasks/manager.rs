use std::{
    collections::HashMap,
    sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::mpsc,
    time::sleep,
};

use super::types::{
    TaskHandle,
    TimerEvent,
    TimerKind,
    TimerSlot,
};

/// Arms delayed continuations and delivers them, one at a time, through a
/// channel. Must be used from within a tokio runtime.
///
/// Every armed timer belongs to the current epoch. `cancel_all` aborts the
/// pending tasks and moves to a new epoch, so an event that was already in
/// flight when a session was torn down is recognised as stale and dropped.
pub struct Scheduler {
    sender: mpsc::UnboundedSender<TimerEvent>,
    receiver: mpsc::UnboundedReceiver<TimerEvent>,
    pending: HashMap<TimerSlot, (u64, TaskHandle)>,
    epoch: u64,
    serial: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self { sender, receiver, pending: HashMap::new(), epoch: 0, serial: 0 }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        let slot = kind.slot();
        if let Some((_, previous)) = self.pending.remove(&slot) {
            previous.cancel();
        }
        self.serial += 1;

        let cancel_token = Arc::new(AtomicBool::new(false));
        let task_token = cancel_token.clone();
        let sender = self.sender.clone();
        let event = TimerEvent { epoch: self.epoch, serial: self.serial, kind };

        let join_handle = tokio::spawn(async move {
            sleep(delay).await;
            if !task_token.load(Ordering::Relaxed) {
                let _ = sender.send(event);
            }
        });

        log::debug!("Armed {} timer ({} ms, epoch {})", kind.task_type(), delay.as_millis(), self.epoch);
        self.pending.insert(slot, (self.serial, TaskHandle::new(cancel_token, join_handle)));
    }

    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.pending.get(&slot).map(|(_, h)| !h.is_cancelled()).unwrap_or(false)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn cancel(&mut self, slot: TimerSlot) {
        if let Some((_, handle)) = self.pending.remove(&slot) {
            handle.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, (_, handle)) in self.pending.drain() {
            handle.cancel();
        }
        self.epoch += 1;
    }

    /// Waits for the next live timer. Stale events are skipped.
    pub async fn next_event(&mut self) -> Option<TimerEvent> {
        loop {
            let event = self.receiver.recv().await?;
            if let Some(event) = self.accept(event) {
                return Some(event);
            }
        }
    }

    /// Drains every live timer that has already fired, without waiting.
    pub fn poll_events(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();

        while let Ok(event) = self.receiver.try_recv() {
            if let Some(event) = self.accept(event) {
                events.push(event);
            }
        }

        events
    }

    fn accept(&mut self, event: TimerEvent) -> Option<TimerEvent> {
        if event.epoch != self.epoch {
            log::debug!("Dropping stale {} timer from epoch {}", event.kind.task_type(), event.epoch);
            return None;
        }
        let slot = event.kind.slot();
        match self.pending.get(&slot) {
            Some((serial, _)) if *serial == event.serial => {
                self.pending.remove(&slot);
                Some(event)
            }
            _ => {
                log::debug!("Dropping superseded {} timer", event.kind.task_type());
                None
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
