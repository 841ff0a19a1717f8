//! `PathEvent` and the `EventBus` that carries them to the game handler.

use std::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEvent {
    CalcStarted,
    CalcFinishedNowExecuting,
    CalcFailed,
    NextSegmentCalcStarted,
    NextSegmentCalcFinished,
    NextCalcFailed,
    PathFinishedNextStillCalculating,
    AtGoal,
    Canceled,
    DiscardNext,
    ContinuingOntoPlannedNext,
    SplicingOntoNextEarly,
}

/// Unbounded, multi-producer/single-consumer queue of [`PathEvent`]s.
///
/// Producers get a cloned [`mpsc::Sender`] via [`EventBus::sender`] (the
/// search-completion worker thread, the core, and the arbiter all hold
/// one); the tick thread is the sole consumer and drains with
/// [`EventBus::drain`], which moves every currently enqueued event into a
/// local `Vec` in one non-blocking pass.
pub struct EventBus {
    sender: mpsc::Sender<PathEvent>,
    receiver: mpsc::Receiver<PathEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> mpsc::Sender<PathEvent> {
        self.sender.clone()
    }

    /// Non-blocking drain of everything enqueued so far.
    pub fn drain(&self) -> Vec<PathEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
